pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod normalizer;
pub mod renderer;
pub mod service;
pub mod types;
