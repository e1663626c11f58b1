pub mod identity;
pub mod expenses;
pub mod error;
pub mod config;
pub mod cli;
