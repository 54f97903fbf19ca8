use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod catalog;
mod cmd;
mod config;
mod error;
mod mcp;

use catalog::ToolCatalog;
use cmd::dispatch::{self, InvocationResult};
use cmd::synth::{self, CommandTable};
use cmd::{coerce, render};
use config::Credentials;

/// mcp-surface - a CLI whose subcommands come from a remote MCP service.
///
/// The tool catalog is discovered fresh on every run: each remote tool
/// becomes a subcommand, each schema property one --kebab-case flag.
///
///   mcp-surface                          list the tools the service exposes
///   mcp-surface <tool> --help            show a tool's synthesized flags
///   mcp-surface <tool> [--flag value]…   invoke a tool
///
/// Authentication / endpoint:
///   MCP_SURFACE_API_KEY / MCP_SURFACE_TOKEN   bearer token (first set wins)
///   .mcp-surface/key, .mcp-surface-key        key files under the install root
///   MCP_SURFACE_URL                           service endpoint override
#[derive(Parser, Debug)]
#[command(
    name = "mcp-surface",
    version,
    about = "Dynamic CLI surface for a remote MCP tool service",
    disable_help_subcommand = true
)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Invocation>,
}

#[derive(Subcommand, Debug)]
enum Invocation {
    /// A remote tool, resolved against the discovered catalog
    #[command(external_subcommand)]
    Tool(Vec<String>),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            // Unclassified failures surface verbatim; wrapping them in a
            // friendlier message would hide the diagnostic detail.
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    // Fatal before any network activity if no token can be found.
    let credentials = config::resolve()?;

    let catalog = ToolCatalog::new();
    let state = catalog.load(&credentials)?;
    if let Some(reason) = state.degraded() {
        eprintln!("connection error: could not reach the tool service");
        eprintln!("{reason}");
    }
    let table = CommandTable::build(state.tools());

    match cli.command {
        None => {
            list_tools(&table);
            Ok(ExitCode::SUCCESS)
        }
        Some(Invocation::Tool(argv)) => {
            run_tool(&credentials, &table, state.degraded().is_some(), argv)
        }
    }
}

fn run_tool(
    credentials: &Credentials,
    table: &CommandTable,
    degraded: bool,
    argv: Vec<String>,
) -> Result<ExitCode> {
    // clap only routes here with at least the subcommand name present.
    let name = argv.first().cloned().unwrap_or_default();

    let Some(synthesized) = table.get(&name) else {
        if degraded {
            anyhow::bail!("cannot resolve '{name}': tool discovery failed");
        }
        eprintln!("error: no such command: '{name}'");
        eprintln!("Run `mcp-surface` without arguments to list available tools.");
        return Ok(ExitCode::from(2));
    };

    let matches = match synth::to_clap(synthesized).try_get_matches_from(&argv) {
        Ok(matches) => matches,
        // clap renders its own message (this also covers `<tool> --help`)
        // and picks the conventional exit status.
        Err(err) => err.exit(),
    };

    let arguments = coerce::collect_arguments(synthesized, &matches);
    match dispatch::invoke(credentials, &name, arguments)? {
        InvocationResult::Success { content } => {
            render::render_blocks(&content, &mut std::io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        InvocationResult::Failure { message } => {
            eprintln!("error (from tool service): {message}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn list_tools(table: &CommandTable) {
    println!("Tools ({})", table.len());
    if table.is_empty() {
        println!("  (none)");
        return;
    }
    let width = table.iter().map(|c| c.tool.len()).max().unwrap_or(0);
    for command in table.iter() {
        let summary = command.about.lines().next().unwrap_or("");
        println!("  {:width$}  {summary}", command.tool);
    }
    println!();
    println!("Use `mcp-surface <tool> --help` for the flags of a single tool.");
}

/// Default Info; -v Debug, -vv Trace, -q errors only. RUST_LOG overrides.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mcp_surface={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_invocation_is_captured_verbatim() {
        let cli = Cli::try_parse_from(["mcp-surface", "echo", "--message", "hello"]).unwrap();
        match cli.command {
            Some(Invocation::Tool(argv)) => {
                assert_eq!(argv, ["echo", "--message", "hello"]);
            }
            other => panic!("expected a tool invocation, got {other:?}"),
        }
    }

    #[test]
    fn bare_invocation_means_listing() {
        let cli = Cli::try_parse_from(["mcp-surface"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn verbosity_flags_accumulate() {
        let cli = Cli::try_parse_from(["mcp-surface", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn global_flags_precede_the_tool_name() {
        let cli = Cli::try_parse_from(["mcp-surface", "-q", "echo"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Invocation::Tool(_))));
    }
}
