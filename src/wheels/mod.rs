//! Wheel resolution and extraction.
//!
//! A run goes through four stages:
//!
//! - [`tags`] ranks wheel filenames against the target interpreter and platform
//! - [`locator`] finds the best wheel for one `name==version` requirement,
//!   looking in extra source directories, then the download cache, then the index
//! - [`extract`] unpacks a wheel into the package directory, folding `.data`
//!   library directories back into the top level
//! - [`getter`] drives the above for every requirement and local wheel glob

pub mod exclude;
pub mod extract;
pub mod filename;
pub mod getter;
pub mod index;
pub mod locator;
pub mod requirement;
pub mod tags;

pub use exclude::ExcludeSet;
pub use extract::extract_wheel;
pub use filename::{WheelFilename, WheelTags, distribution_name};
pub use getter::WheelGetter;
pub use index::{IndexFile, IndexProject, PackageIndex, PyPiIndex};
pub use locator::{LocalRelease, PackageType, Release, WheelLocator, pick_best_wheel};
pub use requirement::Requirement;
pub use tags::{CompatibilityScorer, TagTriple, compatible_tags};
