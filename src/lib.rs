pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod templates;
pub mod utils;

pub use error::{AppError, AppResult};
pub use middleware::CurrentUser;
pub use templates::TemplateStore;
