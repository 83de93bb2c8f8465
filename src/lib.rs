//! AgriPulse - A farm-management dashboard library.
//!
//! This library provides the core functionality for the `ap` CLI tool and its
//! terminal dashboard, including field context switching, task and inventory
//! tracking, the marketplace, the yield scenario planner and the simulated
//! crop-doctor and chat flows.

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod flows;
pub mod models;
pub mod scenario;
pub mod state;
pub mod storage;
pub mod tui;
pub mod views;


/// Library-level error type for AgriPulse operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Please sign in to access the dashboard")]
    NotLoggedIn,

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Please upload a valid image file: {0}")]
    InvalidImage(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for AgriPulse operations.
pub type Result<T> = std::result::Result<T, Error>;
