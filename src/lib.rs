pub mod app;
pub mod config;
pub mod processor;
pub mod shared;
