//! Subcommand handlers for the markwav binary.

pub mod columns;
pub mod config;
pub mod convert;
pub mod inspect;
