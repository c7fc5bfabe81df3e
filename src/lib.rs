pub mod config;
pub mod error;
pub mod loading;
pub mod ui;
