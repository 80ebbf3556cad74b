pub mod engine;
pub mod outcome;

pub use engine::{match_tags, MatchOptions};
pub use outcome::{Classification, MatchResult};
