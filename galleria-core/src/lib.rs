pub mod config;
pub mod controller;
pub mod error;
pub mod loader;
pub mod models;
pub mod paths;
pub mod query;
pub mod scheduler;
pub mod selector;
pub mod slots;
pub mod sources;
