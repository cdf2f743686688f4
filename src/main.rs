use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bayesnet::inference::{conditional_probability, joint_probability, marginal_probability};
use bayesnet::loader::{self, Format};
use bayesnet::session::Session;
use bayesnet::{console, Assignment, Network};

use std::io;
use std::path::{Path, PathBuf};


#[derive(Parser)]
#[command(name = "bayesnet")]
#[command(version, about = "Exact inference over small discrete Bayesian networks")]
struct Cli {
    /// Format of the network file
    #[arg(long, global = true, value_enum, default_value = "auto")]
    format: FormatArg,

    /// Log every enumeration to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// .json files are JSON, anything else is text
    Auto,
    Text,
    Json,
}

impl FormatArg {
    fn format(self) -> Option<Format> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Text => Some(Format::Text),
            FormatArg::Json => Some(Format::Json),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the variables and probability tables of a network
    Show {
        file: PathBuf,
    },

    /// Probability of a full assignment, e.g. Flu=yes,Fever=no
    Joint {
        file: PathBuf,
        assignment: String,
    },

    /// Probability of Var=Value given evidence, summed over the hidden variables
    Query {
        file: PathBuf,
        query: String,

        /// Observed values, e.g. A=x,B=y
        #[arg(short, long, default_value = "")]
        evidence: String,

        /// Divide by the probability of the evidence
        #[arg(short, long)]
        normalized: bool,
    },

    /// Interactive menu
    Repl {
        file: PathBuf,
    },
}


fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let format = cli.format.format();

    match cli.command {
        Commands::Show { file } => {
            let network = open(&file, format)?;
            print!("{}", network);
        }

        Commands::Joint { file, assignment } => {
            let network = open(&file, format)?;
            let assignment: Assignment = assignment.parse().context("Invalid assignment")?;
            let p = joint_probability(&network, &assignment)?;
            println!("P({}) = {}", assignment, p);
        }

        Commands::Query { file, query, evidence, normalized } => {
            let network = open(&file, format)?;
            let query: Assignment = query.parse().context("Invalid query")?;
            let evidence: Assignment = evidence.parse().context("Invalid evidence")?;

            let (var, value) = match (query.len(), query.iter().next()) {
                (1, Some(pair)) => pair,
                _ => bail!("Expected a single Var=Value query, found '{}'", query),
            };

            if normalized {
                let p = conditional_probability(&network, var, value, &evidence)?;
                println!("P({} | {}) = {}", query, evidence, p);
            } else {
                let p = marginal_probability(&network, var, value, &evidence)?;
                if evidence.is_empty() {
                    println!("P({}) = {}", query, p);
                } else {
                    println!("P({}, {}) = {}", query, evidence, p);
                }
            }
        }

        Commands::Repl { file } => {
            let mut session = Session::open(&file, format)
                .with_context(|| format!("Failed to open {}", file.display()))?;

            let stdin = io::stdin();
            console::run(&mut session, stdin.lock(), io::stdout())?;
        }
    }

    Ok(())
}


fn open(path: &Path, format: Option<Format>) -> Result<Network> {
    loader::load(path, format).with_context(|| format!("Failed to load network from {}", path.display()))
}
