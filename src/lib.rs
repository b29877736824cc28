// Meerkat CLI - Library root for testing

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod output;
pub mod store;
