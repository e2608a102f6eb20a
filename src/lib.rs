//! websearch library
//!
//! The search pipeline (client, parser, service) plus the configuration,
//! logging and CLI layers built around it.

pub mod cli;
pub mod config;
pub mod logging;
pub mod search;
