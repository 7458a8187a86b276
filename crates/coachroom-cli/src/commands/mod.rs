pub mod config;
pub mod pacing;
pub mod session;
