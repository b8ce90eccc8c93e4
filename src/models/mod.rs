//! Typed API resources

mod beatmap;
mod user;

pub use beatmap::{Beatmap, Metadata, Stats};
pub use user::User;
