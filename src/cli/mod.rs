//! CLI argument definitions for AgriPulse.

use crate::controller::Page;
use crate::models::Priority;
use crate::scenario::FertilizerTier;
use crate::views::MapLayer;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("AP_GIT_COMMIT"),
    ", built ",
    env!("AP_BUILD_TIMESTAMP"),
    ")"
);

/// AgriPulse - A farm-management dashboard for the terminal.
///
/// Sign in with `ap login`, then open a page with `ap open <page>`.
#[derive(Parser, Debug)]
#[command(name = "ap")]
#[command(author, version, long_version = LONG_VERSION, about = "A farm-management dashboard for fields, tasks, inventory and the marketplace", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding the persisted dashboard data.
    /// Defaults to ~/.local/share/agripulse.
    #[arg(long = "data-dir", global = true, env = "AGRIPULSE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Delay for every simulated flow, in milliseconds.
    /// Overrides `latency-ms` in config.kdl.
    #[arg(long = "latency-ms", global = true, env = "AGRIPULSE_LATENCY_MS")]
    pub latency_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in (any email and a password of 6+ characters)
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password, at least 6 characters
        #[arg(short, long)]
        password: String,

        /// Display name (defaults to "New User")
        #[arg(short, long, default_value = "")]
        name: String,
    },

    /// Sign out, keeping the name and email for next time
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Render a dashboard page
    Open {
        /// Page: dashboard, financials, marketplace, tasks, planning, diagnosis
        page: Page,

        /// Map overlay for the dashboard: default or moisture
        #[arg(long)]
        layer: Option<MapLayer>,
    },

    /// Field (operation) context commands
    Field {
        #[command(subcommand)]
        command: FieldCommands,
    },

    /// Task planner commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Show farm inventory
    Inventory {
        /// Show the full table instead of the critical-first overview
        #[arg(long)]
        all: bool,
    },

    /// Marketplace commands
    Market {
        #[command(subcommand)]
        command: MarketCommands,
    },

    /// Run the what-if yield planner
    Plan {
        /// Rainfall in mm (0-100)
        #[arg(long, default_value_t = 50.0)]
        rainfall: f64,

        /// Fertilizer tier: none, medium, high, premium
        #[arg(long, default_value = "medium")]
        fertilizer: FertilizerTier,

        /// Pest pressure (0-10)
        #[arg(long, default_value_t = 3.0)]
        pest: f64,
    },

    /// Diagnose a crop photo with the simulated crop doctor
    Diagnose {
        /// Path to the image (PNG, JPEG, GIF, WebP or BMP)
        image: PathBuf,

        /// Also share the report by email
        #[arg(long = "share-email", value_name = "ADDRESS")]
        share_email: Option<String>,

        /// Also share the report over WhatsApp
        #[arg(long = "share-whatsapp", value_name = "NUMBER")]
        share_whatsapp: Option<String>,
    },

    /// Ask the farm assistant a question
    Chat {
        /// The question
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Show or change the colour theme
    Theme {
        /// New theme: green, blue or earth (omit to show the current one)
        theme: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Restore every stored slot to the seed data
    Reset {
        /// Required to confirm the reset
        #[arg(long)]
        force: bool,
    },

    /// Open the interactive terminal dashboard
    #[cfg(feature = "tui")]
    Tui,
}

/// Field context subcommands
#[derive(Subcommand, Debug)]
pub enum FieldCommands {
    /// List the operations offered by the context selector
    List,

    /// Make another field the current context
    Switch {
        /// Field ID (e.g., maize-field-1)
        id: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks for the current field, open tasks first
    List,

    /// Add a task to the current field
    Add {
        /// Task title
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Priority: high, medium, low
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },

    /// Flip a task between done and open
    Toggle {
        /// Task ID
        id: u64,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: u64,
    },
}

/// Marketplace subcommands
#[derive(Subcommand, Debug)]
pub enum MarketCommands {
    /// Browse listings
    List {
        /// Category filter (e.g., fertilizer, seeds); "all" for everything
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive text search over title and description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Post a new listing as the signed-in user
    Post {
        /// Listing title
        title: String,

        /// Price in Ksh
        #[arg(long)]
        price: u64,

        /// Category (e.g., produce)
        #[arg(short, long)]
        category: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show the seller's contact details for a listing
    Contact {
        /// Listing ID (e.g., list-1)
        id: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Clear a configuration value back to its default
    Unset {
        /// Configuration key
        key: String,
    },

    /// List all configuration values with their sources
    List,
}
