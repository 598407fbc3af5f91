//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::{Backend, Config};

/// Serve command arguments.
#[derive(Debug, Default, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep records in memory instead of the database
    #[arg(long)]
    pub memory: bool,
}

impl ServeCommand {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.memory {
            config.storage.backend = Backend::Memory;
        }
    }
}

/// Phonebook maintenance commands.
#[derive(Debug, Subcommand)]
pub enum PhonebookCommand {
    /// Print every entry as `name number`
    List,

    /// Add an entry
    Add {
        /// Name; surrounding double quotes are removed
        name: String,

        /// Phone number
        number: String,
    },
}

/// Blog list commands.
#[derive(Debug, Subcommand)]
pub enum BlogsCommand {
    /// Show likes and author statistics
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Configuration management commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to configuration file (uses default if not specified)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Strip one pair of surrounding double quotes, if present.
#[must_use]
pub fn unquote(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(name)
}
