use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::activity::Color;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

/// How a command addresses one activity: its 1-based position in the list
/// as printed, or its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Position(usize),
    Id(Uuid),
}

impl Target {
    /// Zero-based index for positional targets.
    pub fn index(&self) -> Option<usize> {
        match self {
            Target::Position(pos) => pos.checked_sub(1),
            Target::Id(_) => None,
        }
    }
}

impl FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(pos) = s.parse::<usize>() {
            if pos == 0 {
                return Err(anyhow!("positions start at 1"));
            }
            return Ok(Target::Position(pos));
        }
        Uuid::parse_str(s)
            .map(Target::Id)
            .map_err(|_| anyhow!("expected a position or an activity id, got: {s}"))
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "activities",
    version,
    about = "Keep a small list of to-do activities",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "activityrc")]
    pub activityrc: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List activities, optionally only those matching QUERY.
    List {
        query: Vec<String>,

        #[arg(long, value_parser = parse_color)]
        color: Option<Color>,
    },
    /// Create a new activity.
    Add(Fields),
    /// Show one activity in full.
    Show { target: Target },
    /// Change fields of an existing activity.
    Edit {
        target: Target,

        #[command(flatten)]
        fields: Fields,
    },
    /// Delete an activity.
    Delete { target: Target },
    /// Print the colors an activity may take.
    Colors,
}

impl Default for Command {
    fn default() -> Self {
        Command::List {
            query: vec![],
            color: None,
        }
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long, value_parser = parse_color)]
    pub color: Option<Color>,
}

fn parse_color(s: &str) -> Result<Color, String> {
    s.trim().to_ascii_lowercase().parse()
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
