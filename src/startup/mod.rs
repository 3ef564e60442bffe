//! Startup banner and configuration summary

mod logger;

pub use logger::{display_startup_banner, RunMode, StartupAdditionalInfo, StartupLogger};
