use std::os::fd::AsRawFd as _;

use anyhow::{Context, Result};
use bpfpeek_common::prog::prog_fd_by_id;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "prog-fd",
    about = "Resolve a BPF program ID to an open file descriptor"
)]
struct Cli {
    /// Numeric ID of a loaded BPF program
    prog_id: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = parse_cli();

    log::debug!("resolving a descriptor for BPF program {}", cli.prog_id);
    let fd = prog_fd_by_id(cli.prog_id)
        .with_context(|| format!("resolving BPF program {}", cli.prog_id))?;

    // Informational only; the descriptor drops, and the kernel reference is
    // released, as soon as main returns.
    println!(
        "File descriptor for BPF program {}: {}",
        cli.prog_id,
        fd.as_raw_fd()
    );
    Ok(())
}

/// Usage problems exit 1 before any syscall; --help/--version stay 0.
fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|err| {
        let code = if err.use_stderr() { 1 } else { 0 };
        let _ = err.print();
        std::process::exit(code);
    })
}
