//! jadx-mcp binary.
//!
//! Serves MCP over stdin/stdout by default; see `--help` for the one-shot
//! `--list-tools` and `--call` modes.

use clap::Parser;
use jadx_mcp::cli::{self, Cli};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    jadx_mcp::observability::init_logging();
    let code = cli::run(Cli::parse())?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
