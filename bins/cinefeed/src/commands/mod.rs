//! CLI command implementations

pub mod movies;
pub mod serve;
