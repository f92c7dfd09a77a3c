pub mod cache;
pub mod config;
pub mod error;
pub mod replace;
pub mod report;
pub mod sim;
pub mod trace;
