//! # jarwalk
//!
//! Recursively walks Java archives and prints `javap` output for every class
//! found at any nesting depth.
//!
//! ## Architecture
//!
//! - **archive**: Memory-mapped zip reading and entry naming rules
//! - **walk**: Depth-first walk over nested jar/aar/apk/dex containers
//! - **filter**: Include/exclude globs on fully-qualified class names
//! - **javap**: External disassembler and dex2jar integration
//! - **cli**: Command-line surface
//! - **config**: Settings resolution and dex2jar discovery

pub mod archive;
pub mod cli;
pub mod config;
pub mod filter;
pub mod javap;
pub mod walk;
