pub mod app;
pub mod cli;
pub mod clip;
pub mod clipboard;
pub mod config;
pub mod service;
pub mod storage;
pub mod store;
pub mod ui;
pub mod utils;
pub mod watcher;
