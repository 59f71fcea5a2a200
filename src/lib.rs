pub mod cli;
pub mod commands;
pub mod error;
pub mod models;
pub mod session;
pub mod templates;
pub mod types;
pub mod utils;
