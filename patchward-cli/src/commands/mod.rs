//! Command handlers -- one module per subcommand

pub mod config;
pub mod diff;
pub mod digest;
pub mod malice;
