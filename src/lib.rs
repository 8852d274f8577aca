pub mod analytics;
pub mod auth;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;
pub mod state;
pub mod storage;
