//! `shc-rs` reads, validates, extracts and rebuilds the binary image
//! resources of the Stronghold games: standalone `.tgx` images and `.gm1`
//! archives.
//!
//! The actual format support lives in [`shc_types`]; this crate re-exports
//! it and ships the command line tool.

pub use shc_types::*;
