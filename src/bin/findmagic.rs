//! Offline magic-constant finder.
//!
//! Searches a magic multiplier for every square of one sliding family and
//! prints the 81-entry table as Rust source, ready to paste into
//! `movegen/magic_numbers.rs`. Not part of the engine's hot path.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use shogiban_core::movegen::{find_magic, MagicFamily};
use shogiban_core::Square;

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    Blacklance,
    Whitelance,
    Bishop,
    Rookh,
    Rookv,
}

impl Family {
    fn to_magic_family(self) -> MagicFamily {
        match self {
            Family::Blacklance => MagicFamily::BlackLance,
            Family::Whitelance => MagicFamily::WhiteLance,
            Family::Bishop => MagicFamily::Bishop,
            Family::Rookh => MagicFamily::RookHorizontal,
            Family::Rookv => MagicFamily::RookVertical,
        }
    }

    fn const_name(self) -> &'static str {
        match self {
            Family::Blacklance => "BLACK_LANCE_MAGICS",
            Family::Whitelance => "WHITE_LANCE_MAGICS",
            Family::Bishop => "BISHOP_MAGICS",
            Family::Rookh => "ROOK_H_MAGICS",
            Family::Rookv => "ROOK_V_MAGICS",
        }
    }
}

#[derive(Parser)]
#[command(about = "Search magic constants for a sliding-piece family")]
struct Cli {
    /// Sliding family to search
    #[arg(value_enum)]
    family: Family,

    /// Candidate budget per square
    #[arg(long, default_value_t = 10_000_000)]
    attempts: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let family = cli.family.to_magic_family();

    println!("pub(crate) const {}: [u64; 81] = [", cli.family.const_name());
    for sq in Square::all() {
        let Some(magic) = find_magic(family, sq, cli.attempts) else {
            bail!("no magic found for square {sq} within {} attempts", cli.attempts);
        };
        log::debug!("square {sq}: 0x{magic:016x}");
        let sep = if sq.index() % 9 == 8 { ",\n" } else { ", " };
        let lead = if sq.index() % 9 == 0 { "    " } else { "" };
        print!("{lead}0x{magic:016x}{sep}");
    }
    println!("];");
    Ok(())
}
