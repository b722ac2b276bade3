pub mod category;
pub mod forum;
pub mod message;
pub mod topic;
pub mod user;

use chrono::{SubsecRound, Utc};
use sea_orm::prelude::DateTime;

/// Current UTC time cut to whole seconds, the resolution of both feed
/// cursors and HTTP dates.
pub fn timestamp_now() -> DateTime {
    Utc::now().trunc_subsecs(0).naive_utc()
}
