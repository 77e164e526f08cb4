//! `nav-router` command line driver.
//!
//! Loads a router configuration and either resolves single locations or
//! replays a sequence of navigations against an in-process history,
//! printing every resulting route as JSON.
//!
//! ```text
//! nav-router --config routes.toml resolve /user/1?tab=posts
//! nav-router --config routes.toml replay push:/user/1 push:/user/2 back go:-1
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use serde_json::json;

use nav_router::config::{load_config, RouterConfig};
use nav_router::observability::logging::init_logging;
use nav_router::{Route, Router, RouterOptions};

#[derive(Parser)]
#[command(name = "nav-router")]
#[command(about = "Resolve and replay navigations against a route table", long_about = None)]
struct Cli {
    /// Router configuration (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured log level.
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve locations without navigating
    Resolve {
        #[arg(required = true)]
        locations: Vec<String>,
    },
    /// Run navigations in order and print each resulting route
    Replay {
        /// push:<loc>, replace:<loc>, reload:<loc>, back, forward, go:<delta>
        #[arg(required = true)]
        ops: Vec<ReplayOp>,
    },
    /// Validate the configuration and list the compiled routes
    Check,
}

/// One navigation of a replay script.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplayOp {
    Push(String),
    Replace(String),
    Reload(String),
    Back,
    Forward,
    Go(isize),
}

impl FromStr for ReplayOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, arg) = match s.split_once(':') {
            Some((op, arg)) => (op, Some(arg)),
            None => (s, None),
        };

        match (op, arg) {
            ("back", None) => Ok(ReplayOp::Back),
            ("forward", None) => Ok(ReplayOp::Forward),
            ("go", Some(delta)) => delta
                .parse()
                .map(ReplayOp::Go)
                .map_err(|e| format!("bad delta {:?}: {}", delta, e)),
            ("push", Some(loc)) if !loc.is_empty() => Ok(ReplayOp::Push(loc.to_string())),
            ("replace", Some(loc)) if !loc.is_empty() => Ok(ReplayOp::Replace(loc.to_string())),
            ("reload", Some(loc)) if !loc.is_empty() => Ok(ReplayOp::Reload(loc.to_string())),
            _ => Err(format!("unrecognised operation {:?}", s)),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    init_logging(&config.observability);

    let router = Router::new(RouterOptions::from_config(&config, None)?)?;

    match cli.command {
        Commands::Resolve { locations } => {
            for location in locations {
                print_route(Some(&router.resolve(location)?))?;
            }
        }
        Commands::Replay { ops } => {
            for op in ops {
                tracing::debug!(?op, "Replaying");
                let route = match op {
                    ReplayOp::Push(loc) => Some(router.push(loc).await?),
                    ReplayOp::Replace(loc) => Some(router.replace(loc).await?),
                    ReplayOp::Reload(loc) => Some(router.reload(loc).await?),
                    ReplayOp::Back => router.back().await?,
                    ReplayOp::Forward => router.forward().await?,
                    ReplayOp::Go(delta) => router.go(delta).await?,
                };
                print_route(route.as_ref())?;
            }
            println!("{}", serde_json::to_string(&router.history_snapshot())?);
        }
        Commands::Check => {
            for node in router.matcher().nodes() {
                let line = json!({
                    "path": node.absolute_path(),
                    "name": node.name(),
                    "params": node.param_names(),
                    "redirect": node.redirect(),
                });
                println!("{}", line);
            }
        }
    }

    router.destroy();
    Ok(())
}

fn print_route(route: Option<&Route>) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(&route)?);
    Ok(())
}
