//! 81bit盤面表現

mod core;

pub use self::core::{Bitboard, BitboardIter};
