//! 思考部のプレースホルダ
//!
//! 本物の探索・評価は別レイヤの仕事。ここでは「合法手を1つ選ぶ」
//! だけの最小限の実装を提供する。

use rand::Rng;

use crate::movegen::{generate_all_moves, MoveList};
use crate::position::Position;
use crate::types::Move;

/// 合法手をランダムに1つ返す。合法手がなければNone（詰み）
///
/// 疑似合法手から無作為に選び、do/undoで王手放置を確かめる。
pub fn lucky_move(pos: &mut Position) -> Option<Move> {
    let mut list = MoveList::new();
    generate_all_moves(pos, &mut list);
    let mut candidates: Vec<Move> = list.iter().copied().collect();

    let mut rng = rand::thread_rng();
    while !candidates.is_empty() {
        let i = rng.gen_range(0..candidates.len());
        let m = candidates.swap_remove(i);
        let legal = pos.do_move(m);
        pos.undo_move(m);
        if legal {
            return Some(m);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::STARTPOS;

    #[test]
    fn test_lucky_move_startpos() {
        let mut pos = Position::startpos();
        let m = lucky_move(&mut pos).expect("startpos has legal moves");
        // 局面は変わっていない
        assert_eq!(pos.to_sfen(), STARTPOS);
        // 返る手は初期局面の合法手
        assert!(pos.do_move(m));
        pos.undo_move(m);
    }

    #[test]
    fn test_lucky_move_checkmate() {
        // 頭金の詰み。後手に合法手がない
        let mut pos = Position::from_sfen("4k4/4G4/4P4/9/9/9/9/9/4K4 w - 1").unwrap();
        assert_eq!(lucky_move(&mut pos), None);
    }
}
