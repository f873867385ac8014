//! Database access layer for tvr-ui

pub mod media;
pub mod profiles;
pub mod sessions;
pub mod users;
pub mod violations;
