pub mod changes;
pub mod clone;
pub mod compose;
pub mod config;
pub mod detect;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod runner;
pub mod smoke;
pub mod sprint;
pub mod types;
pub mod validate;

pub use error::{Result, StackError};
