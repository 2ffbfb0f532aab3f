//! CLI subcommand modules.
//!
//! This module contains the implementations for all navrank CLI subcommands.

pub(crate) mod scan;
pub(crate) mod screen;
pub(crate) mod weights;
