//! Roulette CLI — sample and inspect weighted loot tables.
//!
//! Commands:
//! - `sample`: build a pool from a TOML table, draw N items, report frequencies
//! - `chances`: print every entry's weight and selection probability
//! - `demo`: run the built-in six-entry table

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};

use roulette_core::{
    RandomSource, SeededRandom, TableConfig, ThreadRandom, Weight, WeightKind, WeightedPool,
};

#[derive(Parser)]
#[command(name = "roulette", about = "Roulette CLI: weighted random selection over loot tables")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw items from a TOML table and compare observed to expected frequencies.
    Sample {
        /// Path to the table file.
        #[arg(long)]
        table: PathBuf,

        /// Number of draws.
        #[arg(long, default_value_t = 1_000_000)]
        draws: usize,

        /// Seed for reproducible draws. Defaults to the thread RNG.
        #[arg(long)]
        seed: Option<u64>,

        /// Emit the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print each entry's weight and proc chance.
    Chances {
        /// Path to the table file.
        #[arg(long)]
        table: PathBuf,

        /// Emit the table as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Sample the built-in table: weights 1200, 550, 50, 550, 50, 550.
    Demo {
        #[arg(long, default_value_t = 1_000_000)]
        draws: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sample {
            table,
            draws,
            seed,
            json,
        } => {
            let table = load_table(&table)?;
            let report = sample_table(&table, draws, seed)?;
            print_report(&report, json)
        }
        Commands::Chances { table, json } => {
            let table = load_table(&table)?;
            let rows = table_chances(&table)?;
            print_chances(&rows, json)
        }
        Commands::Demo { draws, seed, json } => {
            let report = sample_table(&demo_table()?, draws, seed)?;
            print_report(&report, json)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

// ─── Tables ──────────────────────────────────────────────────────────

fn load_table(path: &Path) -> Result<TableConfig> {
    let table = TableConfig::from_file(path)
        .with_context(|| format!("loading table {}", path.display()))?;
    info!(entries = table.entries.len(), weight_type = %table.weight_type, "table loaded");
    Ok(table)
}

fn demo_table() -> Result<TableConfig> {
    let toml = r#"
weight_type = "i32"
entries = [
    { item = "Sword", weight = 1200 },
    { item = "Shield", weight = 550 },
    { item = "Amulet", weight = 50 },
    { item = "Helmet", weight = 550 },
    { item = "Ring", weight = 50 },
    { item = "Boots", weight = 550 },
]
"#;
    Ok(TableConfig::from_toml(toml)?)
}

fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => {
            debug!(seed, "using seeded source");
            Box::new(SeededRandom::new(seed))
        }
        None => Box::new(ThreadRandom::new()),
    }
}

// ─── Sampling ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SampleRow {
    item: String,
    weight: f64,
    count: usize,
    expected: f64,
    observed: f64,
}

#[derive(Debug, Serialize)]
struct SampleReport {
    weight_type: String,
    draws: usize,
    total_weight: f64,
    rows: Vec<SampleRow>,
}

fn sample_table(table: &TableConfig, draws: usize, seed: Option<u64>) -> Result<SampleReport> {
    let source = random_source(seed);
    match table.weight_kind()? {
        WeightKind::I32 => sample_pool(table.build_pool::<i32, _>(source)?, draws),
        WeightKind::I64 => sample_pool(table.build_pool::<i64, _>(source)?, draws),
        WeightKind::F32 => sample_pool(table.build_pool::<f32, _>(source)?, draws),
        WeightKind::F64 => sample_pool(table.build_pool::<f64, _>(source)?, draws),
    }
}

fn sample_pool<W: Weight, R: RandomSource>(
    mut pool: WeightedPool<String, W, R>,
    draws: usize,
) -> Result<SampleReport> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..draws {
        let item = pool.get_random_item()?;
        *counts.entry(item.clone()).or_insert(0) += 1;
    }

    let total = pool.total_weight().to_f64();
    let rows = distinct_weights(&pool)
        .into_iter()
        .map(|(item, weight)| {
            let count = counts.get(&item).copied().unwrap_or(0);
            SampleRow {
                expected: weight / total,
                observed: if draws > 0 {
                    count as f64 / draws as f64
                } else {
                    0.0
                },
                item,
                weight,
                count,
            }
        })
        .collect();

    Ok(SampleReport {
        weight_type: W::KIND.to_string(),
        draws,
        total_weight: total,
        rows,
    })
}

/// Weights summed per distinct item, in first-insertion order.
fn distinct_weights<W: Weight, R: RandomSource>(
    pool: &WeightedPool<String, W, R>,
) -> Vec<(String, f64)> {
    let mut rows: Vec<(String, f64)> = Vec::new();
    for (item, weight) in pool.iter() {
        match rows.iter_mut().find(|(seen, _)| seen == item) {
            Some((_, sum)) => *sum += weight.to_f64(),
            None => rows.push((item.clone(), weight.to_f64())),
        }
    }
    rows
}

fn print_report(report: &SampleReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} draws, {} weights, total weight {}",
        report.draws, report.weight_type, report.total_weight
    );
    println!(
        "{:<20} {:>12} {:>10} {:>10} {:>10}",
        "item", "weight", "count", "expected", "observed"
    );
    for row in &report.rows {
        println!(
            "{:<20} {:>12} {:>10} {:>9.4}% {:>9.4}%",
            row.item,
            row.weight,
            row.count,
            row.expected * 100.0,
            row.observed * 100.0
        );
    }
    Ok(())
}

// ─── Chances ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChanceRow {
    item: String,
    weight: f64,
    proc_chance: f64,
}

fn table_chances(table: &TableConfig) -> Result<Vec<ChanceRow>> {
    let source = ThreadRandom::new();
    match table.weight_kind()? {
        WeightKind::I32 => Ok(pool_chances(&table.build_pool::<i32, _>(source)?)),
        WeightKind::I64 => Ok(pool_chances(&table.build_pool::<i64, _>(source)?)),
        WeightKind::F32 => Ok(pool_chances(&table.build_pool::<f32, _>(source)?)),
        WeightKind::F64 => Ok(pool_chances(&table.build_pool::<f64, _>(source)?)),
    }
}

fn pool_chances<W: Weight, R: RandomSource>(pool: &WeightedPool<String, W, R>) -> Vec<ChanceRow> {
    pool.iter()
        .zip(pool.proc_chances())
        .map(|((item, weight), (_, proc_chance))| ChanceRow {
            item: item.clone(),
            weight: weight.to_f64(),
            proc_chance,
        })
        .collect()
}

fn print_chances(rows: &[ChanceRow], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }
    println!("{:<20} {:>12} {:>10}", "item", "weight", "chance");
    for row in rows {
        println!(
            "{:<20} {:>12} {:>9.4}%",
            row.item,
            row.weight,
            row.proc_chance * 100.0
        );
    }
    Ok(())
}
