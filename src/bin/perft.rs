//! Perft runner.
//!
//! Counts leaf nodes of the legal move tree from a position and prints
//! per-root-move subtree sizes, either as plain text or as JSON in the
//! shape the perft test fixtures use.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use shogiban_core::{init_all_tables_once, perft, Position, STARTPOS};

#[derive(Parser)]
#[command(about = "Count leaf nodes of the legal move tree (perft)")]
struct Cli {
    /// Search depth in plies
    #[arg(long, default_value_t = 1)]
    depth: u32,

    /// Start position as a SFEN string
    #[arg(long, default_value = STARTPOS)]
    sfen: String,

    /// Emit JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonOutput {
    startpos: String,
    depth: u32,
    nodes: u64,
    moves: BTreeMap<String, u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut pos = Position::from_sfen(&cli.sfen)
        .with_context(|| format!("invalid SFEN: {}", cli.sfen))?;

    init_all_tables_once();
    log::info!("perft depth {} from {}", cli.depth, cli.sfen);
    let result = perft(&mut pos, cli.depth);

    let moves: BTreeMap<String, u64> =
        result.moves.iter().map(|(m, &n)| (m.to_string(), n)).collect();

    if cli.json {
        let out = JsonOutput {
            startpos: cli.sfen,
            depth: cli.depth,
            nodes: result.nodes_count,
            moves,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (mv, nodes) in &moves {
            println!("{mv}: {nodes}");
        }
        println!();
        println!("Moves         : {}", result.moves_count);
        println!("Nodes searched: {}", result.nodes_count);
        println!("Duration      : {:?}", result.duration);
    }
    Ok(())
}
