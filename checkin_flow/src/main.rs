//! checkin_flow — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use checkin_core::{Autocomplete, CheckinConfig, EndpointField, EndpointSelection, Gazetteer};
use checkin_flow::app::{choose, default_selection, run, AppConfig};

/// Morning check-in driven by pointer gestures.
#[derive(Parser, Debug)]
#[command(name = "checkin_flow")]
struct Args {
    /// Skip the prompts and use the default endpoints
    #[arg(long)]
    quick: bool,

    /// TOML file overriding sampler, navigator and route settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the simulated route environment
    #[arg(long)]
    seed: Option<u64>,

    /// Start location query
    #[arg(long)]
    start: Option<String>,

    /// End location query
    #[arg(long)]
    end: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Check-in — a few questions for today            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut checkin = match &args.config {
        Some(path) => match CheckinConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => CheckinConfig::default(),
    };
    if args.seed.is_some() {
        checkin.route.seed = args.seed;
    }

    let places = Gazetteer::manhattan();
    let mut selection = default_selection(&places);
    for (field, query) in [(EndpointField::Start, &args.start), (EndpointField::End, &args.end)] {
        if let Some(q) = query {
            match choose(&mut selection, &places, field, q) {
                Some(label) => info!(%field, %label, "endpoint chosen"),
                None => {
                    warn!(%field, query = %q, "no place matches");
                    selection.clear(field);
                }
            }
        }
    }

    if args.quick {
        println!("  Quick-start: default endpoints\n");
    } else {
        println!("  Choose where today's walk goes.");
        for field in [EndpointField::Start, EndpointField::End] {
            pick_endpoint(&places, &mut selection, field);
        }
    }

    println!();
    println!("  Opening window…");
    println!();

    match run(AppConfig { checkin, selection }) {
        Ok(record) => match record.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Ask for a query, list suggestions, store the chosen one.  An empty answer
/// keeps the current choice.
fn pick_endpoint(places: &dyn Autocomplete, selection: &mut EndpointSelection, field: EndpointField) {
    let current = selection.get(field).map(|s| s.label.clone()).unwrap_or_else(|| "none".into());
    loop {
        let query = read_line(&format!("  {} (default {}): ", field, current));
        let query = query.trim();
        if query.is_empty() { return; }

        let suggestions = places.suggest(query);
        if suggestions.is_empty() {
            println!("    ⚠  nothing matches \"{}\".", query);
            continue;
        }
        for (i, s) in suggestions.iter().enumerate() {
            println!("    {}. {}", i + 1, s.label);
        }
        let n = read_line("    Choice (default 1): ").trim().parse::<usize>().unwrap_or(1);
        if let Some(s) = suggestions.get(n.saturating_sub(1)) {
            selection.select(field, s.clone());
            return;
        }
        println!("    ⚠  1–{} only.", suggestions.len());
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
