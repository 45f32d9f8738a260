//! CafeFinder Core - Shared building blocks
//!
//! Configuration, runtime mode, tracing setup and the geographic primitives
//! used by the search and web crates.

pub mod config;
pub mod geo;
pub mod mode;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::CafeFinderConfig;
pub use geo::{Bounds, Coordinates, haversine_distance};
pub use mode::RuntimeMode;

/// Core errors that can bubble up from any CafeFinder subsystem.
#[derive(Debug, thiserror::Error)]
pub enum CafeFinderError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Invalid coordinates: {reason}")]
    InvalidCoordinates { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CafeFinderError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            CafeFinderError::Configuration { .. } => "Configuration error occurred".to_string(),
            CafeFinderError::InvalidCoordinates { .. } => {
                "Latitude and longitude must be valid coordinates".to_string()
            }
            CafeFinderError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(self, CafeFinderError::InvalidCoordinates { .. })
    }
}

pub type Result<T> = std::result::Result<T, CafeFinderError>;
