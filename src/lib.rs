//! 将棋の指し手生成コア
//!
//! 81bitのBitboard盤面表現、走り駒のmagic bitboard、駒種ごとの
//! 成り・打ちフィルタ、可逆なdo/undoプロトコル、perftハーネスを提供する。
//! USIプロトコル本体と探索・評価はこのクレートの外の仕事。

pub mod bitboard;
pub mod engine;
pub mod init;
pub mod movegen;
pub mod perft;
pub mod position;
pub mod types;
pub mod usi;

pub use bitboard::Bitboard;
pub use init::init_all_tables_once;
pub use movegen::{attackers_of, checkers, generate_all_moves, MoveList};
pub use perft::{perft, PerftResult};
pub use position::{Position, SfenError, STARTPOS};
pub use types::{Color, Direction, Hand, Move, Piece, PieceType, Square};
