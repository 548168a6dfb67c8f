//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for ThaiDeid using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// ThaiDeid - Thai/English medical text de-identification
#[derive(Parser, Debug)]
#[command(name = "thaideid")]
#[command(version, about, long_about = None)]
#[command(author = "ThaiDeid Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "thaideid.toml", env = "THAIDEID_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "THAIDEID_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// De-identify text
    Process(commands::process::ProcessArgs),

    /// Resolve candidate entities without detection or anonymization
    Resolve(commands::resolve::ResolveArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
