//! CLI command implementations

pub mod config;
pub mod fetch;
pub mod paths;
mod target;

pub use config::execute as config;
pub use fetch::execute as fetch;
pub use paths::execute as paths;
