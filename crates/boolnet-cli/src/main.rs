//! Boolean network CLI - explore synchronous Boolean networks.
//!
//! Builds a network from a bundled scenario, a saved record or an observed
//! truth table, then prints its truth table, attractors, synthesized rules
//! or Graphviz diagrams.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;
mod config;
mod presets;
mod selection;

use commands::{attractors, config as config_cmd, dot, store, synth, table};
use config::Config;
use selection::NetworkArgs;

/// Boolean network CLI - truth tables, attractors and rule synthesis.
///
/// Run `bn` or `bn attractors` to analyze the default `poster` scenario.
#[derive(Parser, Debug)]
#[command(
    name = "bn",
    author,
    version,
    about = "Explore synchronous Boolean networks",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the bundled scenarios.
    Presets,

    /// Print the truth table: every state, its successor and the per-entity change.
    Table {
        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Detect attractors (default command).
    Attractors {
        #[command(flatten)]
        network: NetworkArgs,

        /// Scan start states on worker threads (attractors are then sorted).
        #[arg(long)]
        parallel: bool,

        /// Show the number of states flowing into each attractor.
        #[arg(long)]
        basins: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Synthesize one Sum-of-Products formula per entity.
    Synth {
        #[command(flatten)]
        network: NetworkArgs,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Export the state graph (or wiring diagram) as Graphviz DOT.
    Dot {
        #[command(flatten)]
        network: NetworkArgs,

        /// Export which entities regulate which, instead of the state graph.
        #[arg(long)]
        wiring: bool,

        /// Output file path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save the selected network under a name and version tag.
    Save {
        #[command(flatten)]
        network: NetworkArgs,

        /// Name to save under.
        #[arg(long)]
        name: String,

        /// Version tag (any string, e.g. `v1` or `mutated`).
        #[arg(long = "version", value_name = "TAG")]
        tag: String,
    },

    /// Flip one truth-table entry and save the result as a new version.
    Mutate {
        #[command(flatten)]
        network: NetworkArgs,

        /// Row to change, as a state string such as `0101`.
        #[arg(long)]
        state: String,

        /// Entity whose next value is flipped (index or name).
        #[arg(long)]
        entity: String,

        /// Name to save under.
        #[arg(long)]
        name: String,

        /// Version tag for the mutated network.
        #[arg(long = "version", value_name = "TAG")]
        tag: String,
    },

    /// List saved versions of a network.
    Versions {
        /// Saved network name.
        #[arg(long)]
        name: String,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Show path to config file.
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    let command = cli.command.unwrap_or(Commands::Attractors {
        network: NetworkArgs::default_selection(),
        parallel: false,
        basins: false,
        json: false,
    });

    match command {
        Commands::Presets => presets::list(),
        Commands::Table { network } => {
            table::print(&network.build(&config)?)?;
        }
        Commands::Attractors {
            network,
            parallel,
            basins,
            json,
        } => {
            attractors::run(&network.build(&config)?, parallel, basins, json)?;
        }
        Commands::Synth { network, json } => {
            synth::run(&network.build(&config)?, json)?;
        }
        Commands::Dot {
            network,
            wiring,
            output,
        } => {
            dot::run(&network.build(&config)?, wiring, output.as_deref())?;
        }
        Commands::Save { network, name, tag } => {
            store::save(&config, &network.build(&config)?, &name, &tag)?;
        }
        Commands::Mutate {
            network,
            state,
            entity,
            name,
            tag,
        } => {
            store::mutate(&config, &network.build(&config)?, &state, &entity, &name, &tag)?;
        }
        Commands::Versions { name } => {
            store::versions(&config, &name)?;
        }
        Commands::Config(ConfigCommands::Show) => {
            config_cmd::show(&config)?;
        }
        Commands::Config(ConfigCommands::Path) => {
            config_cmd::path()?;
        }
    }

    Ok(())
}
