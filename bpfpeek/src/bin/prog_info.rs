use anyhow::{Context, Result};
use bpfpeek_common::prog::prog_info_by_id;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "prog-info",
    about = "Show type, name, load time and run stats of a BPF program"
)]
struct Cli {
    /// Numeric ID of a loaded BPF program
    prog_id: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = parse_cli();

    let info = prog_info_by_id(cli.prog_id)
        .with_context(|| format!("inspecting BPF program {}", cli.prog_id))?;

    println!("Program ID:   {}", info.id());
    match info.type_name() {
        Some(name) => println!("Program type: {} ({name})", info.type_id()),
        None => println!("Program type: {}", info.type_id()),
    }
    let name = match info.name_as_str() {
        Some(name) if !name.is_empty() => name,
        _ => "<none>",
    };
    println!("Program name: {name}");
    print!("Loaded at:    {} ns since boot", info.load_time_ns());
    if let Some(elapsed) = info.loaded_at().and_then(|at| at.elapsed().ok()) {
        print!(" ({}s ago)", elapsed.as_secs());
    }
    println!();
    println!("Run count:    {}", info.run_count());
    println!("Run time:     {:?}", info.run_time());
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
