pub mod cookie;
pub mod last_modified;
pub mod markdown;
pub mod slug;

pub use last_modified::{check_last_modified, Freshness};
pub use markdown::render_markdown;
pub use slug::slugify;
