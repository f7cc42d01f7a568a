//! 利きの問い合わせ（attackers / checkers）

use crate::position::Position;
use crate::types::{Color, Piece, PieceType, Square};

use super::generator::generate_all_moves;
use super::movelist::MoveList;

/// 指定升の駒に利きを付けている敵駒の位置を列挙する
///
/// 手番を一時的に「攻め側」へ差し替えて疑似合法手を生成し、移動先が
/// `sq` の手の移動元を集める。正しいが O(手数) かかる実装で、逆利きの
/// Bitboard直接計算への置き換えは将来の最適化。
pub fn attackers_of(pos: &mut Position, sq: Square) -> Vec<Square> {
    let target = pos.piece_on(sq);
    debug_assert!(target.is_some(), "attackers_of called on an empty square");

    let saved_side = pos.side();
    pos.set_side(target.color().opponent());

    let mut list = MoveList::new();
    generate_all_moves(pos, &mut list);

    let mut seen = [false; Square::NUM];
    let mut attackers = Vec::new();
    for m in list.iter() {
        if m.to() == sq && !seen[m.from().index()] {
            seen[m.from().index()] = true;
            attackers.push(m.from());
        }
    }

    pos.set_side(saved_side);
    attackers
}

/// 指定手番の玉に王手をかけている駒の位置を列挙する
///
/// 玉がいない局面（テスト用の部分局面）では空を返す。
pub fn checkers(pos: &mut Position, side: Color) -> Vec<Square> {
    let king_bb = pos.pieces(Piece::new(side, PieceType::King));
    match king_bb.lsb() {
        Some(king_sq) => attackers_of(pos, king_sq),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::STARTPOS;

    #[test]
    fn test_checkers_startpos() {
        let mut pos = Position::startpos();
        assert!(checkers(&mut pos, Color::Black).is_empty());
        assert!(checkers(&mut pos, Color::White).is_empty());
        // 手番は元に戻っている
        assert_eq!(pos.side(), Color::Black);
        assert_eq!(pos.to_sfen(), STARTPOS);
    }

    #[test]
    fn test_checkers_fixture() {
        // 8fの龍が後手玉に王手
        let mut pos = Position::from_sfen(
            "lns4+P1/2grgks+R1/ppp2pp1p/4p4/3p5/1BP1P4/PP1PSPP1P/1B1K5/LNSG1G1NL w NLP 28",
        )
        .unwrap();
        let side = pos.side();
        let checkers: Vec<String> =
            checkers(&mut pos, side).iter().map(|sq| sq.to_string()).collect();
        assert_eq!(checkers, vec!["8f"]);
    }

    #[test]
    fn test_checkers_no_king() {
        let mut pos = Position::from_sfen("9/9/9/9/4P4/9/9/9/9 b - 1").unwrap();
        assert!(checkers(&mut pos, Color::Black).is_empty());
    }

    #[test]
    fn test_attackers_of_multiple() {
        // 5eの後手歩に、歩(5f)と金(4f)と桂(4g... ではなく) が利く局面
        let mut pos = Position::from_sfen("4k4/9/9/9/4p4/4PG3/9/9/4K4 b - 1").unwrap();
        let sq = Square::from_usi("5e").unwrap();
        let mut attackers: Vec<String> =
            attackers_of(&mut pos, sq).iter().map(|s| s.to_string()).collect();
        attackers.sort();
        assert_eq!(attackers, vec!["4f", "5f"]);
    }
}
