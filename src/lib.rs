pub mod api;
pub mod bridge;
pub mod config;
pub mod data_models;
pub mod error;
pub mod scanner;
