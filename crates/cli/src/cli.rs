// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::PathBuf;

use anyhow::{bail, Result};
use alloy::primitives::Address;
use arena_config::{load_config, validation::ValidUrl, ArenaConfig, CliOverrides};
use arena_data::SledDb;
use arena_logger::setup_tracing;
use clap::{command, ArgAction, Parser, Subcommand};
use tracing::{info, instrument, Level};

use crate::{count, decrypt, history, play, purge, submit};

#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(about = "Submit encrypted scores to a confidential ledger and decrypt your own history", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `arena -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// The node name (scopes the data dir and names the open telemetry service)
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    #[arg(long = "otel", global = true)]
    pub otel: Option<ValidUrl>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let in_mem = matches!(self.command, Commands::Play { .. }).then_some(true);
        let config = self.load_config(in_mem)?;

        setup_tracing(&config, self.log_level())?;
        info!("Config loaded from: {:?}", config.config_file());

        match self.command {
            Commands::Submit { score } => submit::execute(&config, score).await?,
            Commands::History { user } => history::execute(&config, user).await?,
            Commands::Count { user } => count::execute(&config, user).await?,
            Commands::Decrypt { yes } => decrypt::execute(&config, yes).await?,
            Commands::Play { scores } => play::execute(&config, scores).await?,
            Commands::Purge => purge::execute(&config).await?,
        }

        SledDb::close_all_connections();

        Ok(())
    }

    pub fn load_config(&self, in_mem: Option<bool>) -> Result<ArenaConfig> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            bail!("--name cannot be empty");
        }
        load_config(
            self.config.as_deref(),
            CliOverrides {
                name: self.name.clone(),
                otel: self.otel.clone().map(Into::into),
                in_mem,
                found_config_file: None,
            },
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt a score and submit it to the ledger
    Submit {
        /// The score to submit
        score: u32,
    },

    /// List the encrypted handles of a user's submissions in order
    History {
        /// Defaults to the configured wallet
        #[arg(long)]
        user: Option<Address>,
    },

    /// Print how many scores a user has submitted
    Count {
        /// Defaults to the configured wallet
        #[arg(long)]
        user: Option<Address>,
    },

    /// Decrypt your own score history
    Decrypt {
        /// Sign the decryption authorization without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Run a throwaway in-memory session: submit every score, then decrypt them
    Play {
        #[arg(required = true, num_args = 1..)]
        scores: Vec<u32>,
    },

    /// Delete all local ledger and coprocessor data for this node
    Purge,
}
