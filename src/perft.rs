//! Perft（合法手の木の数え上げ）

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::movegen::{generate_all_moves, MoveList};
use crate::position::Position;
use crate::types::Move;

/// perftの結果
///
/// ルートの各合法手に対する部分木のノード数と、その合計を持つ。
pub struct PerftResult {
    /// ルートの合法手 → その部分木の末端ノード数
    pub moves: HashMap<Move, u64>,
    /// 計測時間
    pub duration: Duration,
    /// ルートの合法手の数
    pub moves_count: usize,
    /// 末端ノード数の合計
    pub nodes_count: u64,
}

impl PerftResult {
    /// USI表記でルートの手を探す
    pub fn find_move(&self, s: &str) -> Option<Move> {
        self.moves.keys().find(|m| m.to_string() == s).copied()
    }
}

/// 深さdepthのperftを実行する
///
/// 疑似合法手を適用し、王手放置だけを`do_move`の返り値で弾く。
/// ルートでは手ごとの部分木サイズを記録し、内部では合計だけを取る。
pub fn perft(pos: &mut Position, depth: u32) -> PerftResult {
    let depth = depth.max(1);

    let mut result = PerftResult {
        moves: HashMap::new(),
        duration: Duration::ZERO,
        moves_count: 0,
        nodes_count: 0,
    };

    let start = Instant::now();
    perft_root(pos, depth, &mut result);
    result.duration = start.elapsed();

    result.moves_count = result.moves.len();
    result.nodes_count = result.moves.values().sum();
    result
}

fn perft_root(pos: &mut Position, depth: u32, result: &mut PerftResult) {
    let mut list = MoveList::new();
    generate_all_moves(pos, &mut list);
    for i in 0..list.len() {
        let m = list[i];
        if pos.do_move(m) {
            let nodes = perft_leaf(pos, depth - 1);
            result.moves.insert(m, nodes);
        }
        pos.undo_move(m);
    }
}

fn perft_leaf(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    let mut list = MoveList::new();
    generate_all_moves(pos, &mut list);
    for i in 0..list.len() {
        let m = list[i];
        if pos.do_move(m) {
            nodes += perft_leaf(pos, depth - 1);
        }
        pos.undo_move(m);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::STARTPOS;

    #[test]
    fn test_perft_startpos_depth1() {
        let mut pos = Position::startpos();
        let result = perft(&mut pos, 1);
        assert_eq!(result.moves_count, 30);
        assert_eq!(result.nodes_count, 30);
        assert!(result.moves.values().all(|&n| n == 1));
        // perft後に局面は元に戻っている
        assert_eq!(pos.to_sfen(), STARTPOS);
        pos.assert_consistent();
    }

    #[test]
    fn test_perft_startpos_depth2() {
        let mut pos = Position::startpos();
        let result = perft(&mut pos, 2);
        assert_eq!(result.moves_count, 30);
        assert_eq!(result.nodes_count, 900);
        // 初期局面ではどの先手の手も後手の応手数を変えない
        assert!(result.moves.values().all(|&n| n == 30));
    }

    #[test]
    fn test_perft_find_move() {
        let mut pos = Position::startpos();
        let result = perft(&mut pos, 1);
        let m = result.find_move("7g7f").expect("7g7f should be a root move");
        assert_eq!(m.to_string(), "7g7f");
        assert_eq!(result.find_move("7g7e"), None);
    }

    #[test]
    fn test_perft_filters_illegal_moves() {
        // 先手玉が後手飛車に睨まれている。合駒か玉移動以外は弾かれる
        let mut pos = Position::from_sfen("4k4/9/9/9/4r4/9/9/4G4/4K4 b - 1").unwrap();
        let result = perft(&mut pos, 1);
        for m in result.moves.keys() {
            // 金を横にずらす手（王手放置）が含まれないこと
            assert_ne!(m.to_string(), "5h4h");
            assert_ne!(m.to_string(), "5h6h");
        }
    }
}
