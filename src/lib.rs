//! Wheel collection for Windows installer bundles.
//!
//! Resolves pinned Python requirements and local wheel files against a target
//! interpreter and Windows platform, then extracts them into a single package
//! directory ready to ship inside an installer.
//!
//! Entry point is [`WheelGetter`], configured through
//! [`settings::WheelSettingsBuilder`].

pub mod error;
pub mod settings;
pub mod utils;
pub mod wheels;

// Re-export commonly used types
pub use error::{Error, ErrorCategory, Result};
pub use settings::{WheelSettings, WheelSettingsBuilder};
pub use wheels::{CompatibilityScorer, WheelGetter};
