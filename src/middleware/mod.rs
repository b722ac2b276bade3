pub mod auth;
pub mod error_page;

pub use auth::CurrentUser;
pub use error_page::error_page_middleware;
