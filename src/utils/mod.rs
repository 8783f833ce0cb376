//! Filesystem, HTTP and checksum helpers shared by the wheel pipeline.

pub mod checksum;
pub mod fs;
pub mod http;
