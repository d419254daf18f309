//! Forum post harvester library.
//!
//! Harvests a user's historical posts from a forum platform, optionally
//! restricted to named forums, and writes them to a JSON file. Also
//! harvests the forums a user follows.

pub mod config;
pub mod constants;
pub mod harvest;
pub mod localtime;
pub mod output;
pub mod pipeline;
pub mod platform;
