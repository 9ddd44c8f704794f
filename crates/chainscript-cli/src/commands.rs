use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chainscript_ledger::{validate_content, word_count, AuditReport, Ledger, SerializedLedger};
use chainscript_server::{ChainScriptServer, ServerConfig};
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Audit(args) => cmd_audit(args),
        Command::Story(args) => cmd_story(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(&args)?;
    println!(
        "{} ChainScript server on {} ({})",
        "▶".green().bold(),
        config.bind_addr.to_string().bold(),
        match &config.data_dir {
            Some(dir) => format!("data: {}", dir.display()),
            None => "in-memory".to_string(),
        }
    );

    let server = ChainScriptServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn serve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

fn load_ledger(path: &Path) -> anyhow::Result<Ledger> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let serialized = SerializedLedger::from_json(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        chain = serialized.chain.len(),
        pending = serialized.pending.len(),
        "loaded story document"
    );
    Ok(Ledger::from_serialized(serialized))
}

fn cmd_audit(args: LedgerFileArgs) -> anyhow::Result<()> {
    let report = load_ledger(&args.path)?.audit()?;
    print_report(&report);
    if !report.is_valid() {
        bail!("{} failed its integrity audit", args.path.display());
    }
    Ok(())
}

fn print_report(report: &AuditReport) {
    println!("Story: {}", report.title.bold());
    println!(
        "  Chain: {} entries, {} pending",
        report.chain_length.to_string().bold(),
        report.pending_count
    );
    if report.chain_problems.is_empty() {
        println!("  Hash chain: {}", "valid".green());
    } else {
        for problem in &report.chain_problems {
            println!("  {} {}", "✗".red().bold(), problem);
        }
    }
    for index in &report.corrupt_pending {
        println!("  {} pending #{index}: stored hash does not match", "✗".red().bold());
    }
    for index in &report.stale_pending {
        println!(
            "  {} pending #{index}: linked to an old tip, needs resubmit",
            "!".yellow().bold()
        );
    }
    if report.is_valid() {
        println!("{} Integrity verified", "✓".green().bold());
    }
}

fn cmd_story(args: LedgerFileArgs) -> anyhow::Result<()> {
    let ledger = load_ledger(&args.path)?;
    println!("{}\n", ledger.title().bold());
    println!("{}", ledger.full_text()?);
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let passage =
        fs::read_to_string(&args.path).with_context(|| format!("reading {}", args.path.display()))?;
    let words = word_count(&passage);
    match validate_content(&passage) {
        Ok(()) => {
            println!("{} Passage accepted ({} words)", "✓".green().bold(), words);
            Ok(())
        }
        Err(reason) => {
            println!("{} {}", "✗".red().bold(), reason);
            bail!("passage rejected")
        }
    }
}
