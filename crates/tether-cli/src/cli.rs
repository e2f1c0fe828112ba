use clap::{Parser, Subcommand};

use crate::check::{CheckArgs, run_check};
use crate::error::Result;
use crate::logging::init_logging;
use crate::render::{RenderArgs, run_render};

#[derive(Debug, Parser)]
#[command(
    name = "tether",
    about = "Mount Tether templates, replay events, and inspect bindings",
    version
)]
pub struct Cli {
    /// Log filter (e.g. `debug`, `tether_runtime=trace`). Overrides RUST_LOG.
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mount a template, replay scripted events, print the rendered root.
    Render(RenderArgs),

    /// Mount a template and print its binding report.
    Check(CheckArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Check(args) => run_check(args),
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_render_steps() {
        let cli = Cli::try_parse_from([
            "tether",
            "render",
            "--template",
            "t.html",
            "--config",
            "c.json",
            "--click",
            "#a",
            "--click",
            "#b",
            "--input",
            "input=x",
            "--set",
            "n=1",
            "--json",
            "--log-level",
            "debug",
        ])
        .expect("parse");
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.clicks, ["#a", "#b"]);
        assert_eq!(args.inputs, ["input=x"]);
        assert_eq!(args.sets, ["n=1"]);
        assert!(args.json);
    }

    #[test]
    fn render_requires_config() {
        assert!(Cli::try_parse_from(["tether", "render", "--template", "t.html"]).is_err());
        assert!(Cli::try_parse_from(["tether", "check", "--template", "t.html"]).is_ok());
    }
}
