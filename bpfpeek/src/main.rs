use std::str::FromStr as _;

use anyhow::{Context, Result};
use bpfpeek_common::iface::ifindex_from_ifname;
use bpfpeek_common::prog::prog_info_by_id;
use bpfpeek_common::query::{query_tcx, TcxHook};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "bpfpeek",
    about = "List BPF programs attached to a TCX ingress/egress hook"
)]
struct Cli {
    /// Network interface name, e.g. eth0
    ifname: String,

    /// Hook direction: `ingress` or `egress` (case-sensitive)
    #[arg(value_parser = TcxHook::from_str)]
    direction: TcxHook,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = parse_cli();

    let ifindex = ifindex_from_ifname(&cli.ifname)?;
    log::debug!("interface {} has index {ifindex}", cli.ifname);

    let attached = query_tcx(ifindex, cli.direction)
        .with_context(|| format!("querying {} programs on {}", cli.direction, cli.ifname))?;

    println!(
        "Interface: {}, Direction: {}, Revision: {}",
        cli.ifname, cli.direction, attached.revision
    );
    println!("{:<8}  {:>6}  {:<16}", "Position", "ID", "Name");
    println!("{:<8}  {:>6}  {:<16}", "--------", "------", "----------------");

    for (position, prog_id) in attached.prog_ids.iter().enumerate() {
        // A program whose info lookup fails (raced detach, lost privilege)
        // costs only its own name cell, not the rest of the listing.
        let name = match prog_info_by_id(*prog_id) {
            Ok(info) => info.name_as_str().unwrap_or("").to_string(),
            Err(err) => {
                log::warn!("no info for program {prog_id}: {:#}", anyhow::Error::new(err));
                String::from("<name unavailable>")
            }
        };
        println!("{position:>8}  {prog_id:>6}  {name:<16}");
    }

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
