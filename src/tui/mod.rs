//! Terminal dashboard for AgriPulse.
//!
//! A keyboard-driven view over the same [`crate::controller::PageController`]
//! the CLI uses: page tabs, field context switching, charts, the field map
//! and toast notices. Enabled with the `tui` feature.

#[cfg(feature = "tui")]
mod app;
#[cfg(feature = "tui")]
mod notifications;
#[cfg(feature = "tui")]
mod pages;

#[cfg(feature = "tui")]
pub use app::{TuiApp, run_tui};
#[cfg(feature = "tui")]
pub use notifications::{NotificationLevel, NotificationManager, Toast};
