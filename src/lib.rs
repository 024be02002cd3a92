pub mod app;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod router;
pub mod server;
pub mod services;

#[cfg(test)]
pub mod testing;
