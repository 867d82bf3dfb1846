//! Minimal `clap` CLI surface: a derive-based `Cli` struct parsed once
//! in `main` before the server starts. The only operator subcommand is
//! `--verify-chain`, which runs `ChainStore::verify` for one firm and
//! exits without starting axum.

use clap::Parser;

#[derive(Parser)]
#[command(name = "irongate-server", about = "Iron Gate prompt-interception proxy")]
pub struct Cli {
    /// Verify the audit chain for a firm and exit instead of serving.
    #[arg(long, value_name = "FIRM_ID")]
    pub verify_chain: Option<String>,

    /// Address to bind the HTTP server to.
    #[arg(long, env = "IRON_GATE_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,
}
