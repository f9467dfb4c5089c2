// Public exports for library usage
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod regno;
pub mod runner;
