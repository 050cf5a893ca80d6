use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use specsense_cli::query::QueryArgs;
use specsense_cli::setup::App;
use specsense_cli::shell::{parse_line, ShellCommand, HELP};
use specsense_core::types::RenderedResult;

#[derive(Parser)]
#[command(name = "specsense")]
#[command(about = "Hybrid keyword + semantic product search", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, global = true, default_value = ".", env = "SPECSENSE_CONFIG_DIR")]
    config_dir: PathBuf,

    /// Catalog CSV, overriding catalog.path
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query and print the ranked products
    Search {
        /// Free-text query
        text: String,

        #[command(flatten)]
        args: QueryArgs,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive search loop
    Shell {
        #[command(flatten)]
        args: QueryArgs,
    },

    /// Catalog and index statistics
    Stats,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("SPECSENSE_LOG").unwrap_or_else(|_| EnvFilter::new("specsense=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let app = App::load(&cli.config_dir, cli.catalog.as_deref()).context("starting specsense")?;

    match cli.command {
        Commands::Search { text, args, json } => {
            let query = args.to_query(&text, app.settings.retrieval.alpha, app.settings.retrieval.top_k)?;
            let rendered = app.engine.search(&query)?.render();
            if json {
                println!("{}", serde_json::to_string_pretty(&rendered)?);
            } else {
                print_results(&text, &rendered);
            }
        }
        Commands::Shell { args } => shell(&app, &args)?,
        Commands::Stats => print_stats(&app),
    }
    Ok(())
}

fn shell(app: &App, args: &QueryArgs) -> Result<()> {
    let mut alpha = args.alpha.unwrap_or(app.settings.retrieval.alpha);
    let mut top_k = args.top_k.unwrap_or(app.settings.retrieval.top_k);
    // :alpha and :k own these from here on
    let args = QueryArgs { alpha: None, top_k: None, ..args.clone() };
    println!("🔍 specsense shell\n=================");
    println!("{HELP}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nspecsense [alpha={alpha} k={top_k}]> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let Some(command) = parse_line(&line?) else { continue };
        match command {
            ShellCommand::Search(text) => {
                let query = args.to_query(&text, alpha, top_k)?;
                match app.engine.search(&query) {
                    Ok(results) => print_results(&text, &results.render()),
                    Err(e) if e.is_retryable() => eprintln!("⚠️  {e} (try again)"),
                    Err(e) => eprintln!("❌ {e}"),
                }
            }
            ShellCommand::Reload => {
                if let Err(e) = app.reload() { eprintln!("❌ reload failed, still serving the previous index: {e:#}"); }
            }
            ShellCommand::Alpha(a) => alpha = a,
            ShellCommand::TopK(k) => top_k = k,
            ShellCommand::Stats => print_stats(app),
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
            ShellCommand::Invalid(msg) => eprintln!("❌ {msg}"),
        }
    }
    Ok(())
}

fn print_results(text: &str, results: &[RenderedResult]) {
    println!("\n🔍 Found {} results for: \"{}\"", results.len(), text);
    for (i, r) in results.iter().enumerate() {
        println!("\n  {}. {}  score={:.4}  price={}", i + 1, r.product_name, r.score, r.price);
        for line in r.explanation.lines() { println!("     {line}"); }
    }
}

fn print_stats(app: &App) {
    let snapshot = app.engine.snapshot();
    let lexical = snapshot.lexical().stats();
    println!("📊 Catalog: {}", app.catalog_path.display());
    println!("  products:     {}", snapshot.catalog().len());
    println!("  vocabulary:   {}", lexical.vocabulary);
    println!("  avg length:   {:.2} tokens", lexical.avg_doc_len);
    println!("  embedder:     {} (dim {})", snapshot.embedder().name(), snapshot.dense().dim());
    println!("  generation:   {}", snapshot.generation());
}
