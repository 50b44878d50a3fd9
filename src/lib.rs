pub mod assignments;
pub mod config;
pub mod output;
pub mod scale;
