//! CLI subcommand modules.
//!
//! This module contains the implementations for all vantage CLI subcommands.

pub(crate) mod config;
pub(crate) mod metrics;
pub(crate) mod run;
pub(crate) mod show;
