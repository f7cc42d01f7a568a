//! 局面（Position）

use crate::bitboard::Bitboard;
use crate::movegen;
use crate::types::{Color, Hand, Move, Piece, Square};

const DROP: u32 = Move::FLAG_DROP;
const MOVE: u32 = Move::FLAG_MOVE;
const MOVE_PROMO: u32 = Move::FLAG_MOVE | Move::FLAG_PROMOTION;
const MOVE_CAPTURE: u32 = Move::FLAG_MOVE | Move::FLAG_CAPTURE;
const MOVE_CAPTURE_PROMO: u32 = Move::FLAG_MOVE | Move::FLAG_CAPTURE | Move::FLAG_PROMOTION;

/// 将棋の局面
///
/// mailbox（`board`）と冗長なBitboard群（`by_color` / `by_piece`)を併せ持つ。
/// 盤面への書き込みは `set_piece` / `clear_piece` だけが行い、
/// 「board\[sq\] == p ⇔ by_piece\[p\] のbit sqが立つ」という冗長性の不変条件を保つ。
#[derive(Clone)]
pub struct Position {
    /// 各升の駒
    pub(super) board: [Piece; Square::NUM],
    /// 手駒 [Color]
    pub(super) hands: [Hand; Color::NUM],
    /// 手番
    pub(super) side: Color,
    /// 手数（SFENに合わせて1始まり）
    pub(super) ply: i32,
    /// 先後別の占有Bitboard
    pub(super) by_color: [Bitboard; Color::NUM],
    /// 駒別Bitboard [Piece]
    pub(super) by_piece: [Bitboard; Piece::NUM],
}

impl Position {
    /// 空の局面を生成
    ///
    /// 通常は `from_sfen` か `startpos` を使う。
    pub fn new() -> Position {
        Position {
            board: [Piece::NONE; Square::NUM],
            hands: [Hand::EMPTY; Color::NUM],
            side: Color::Black,
            ply: 0,
            by_color: [Bitboard::EMPTY; Color::NUM],
            by_piece: [Bitboard::EMPTY; Piece::NUM],
        }
    }

    // ========== 盤面アクセス ==========

    /// 指定升の駒を取得
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    /// 手番を取得
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    /// 手数を取得
    #[inline]
    pub fn ply(&self) -> i32 {
        self.ply
    }

    /// 指定手番の手駒を取得
    #[inline]
    pub fn hand(&self, c: Color) -> Hand {
        self.hands[c.index()]
    }

    /// 指定手番の占有Bitboard
    #[inline]
    pub fn pieces_c(&self, c: Color) -> Bitboard {
        self.by_color[c.index()]
    }

    /// 指定駒のBitboard
    #[inline]
    pub fn pieces(&self, p: Piece) -> Bitboard {
        self.by_piece[p.index()]
    }

    /// 全駒の占有Bitboard
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.by_color[Color::Black.index()] | self.by_color[Color::White.index()]
    }

    /// 手番を差し替える（attackers_ofの一時反転用）
    #[inline]
    pub(crate) fn set_side(&mut self, c: Color) {
        self.side = c;
    }

    // ========== 盤面書き込み ==========

    /// 駒を置く。mailboxとBitboard両方を更新する唯一の書き込み口
    pub(super) fn set_piece(&mut self, piece: Piece, sq: Square) {
        self.board[sq.index()] = piece;
        self.set_bitboards(piece, sq);
    }

    pub(super) fn set_bitboards(&mut self, piece: Piece, sq: Square) {
        self.by_color[piece.color().index()].set(sq);
        self.by_piece[piece.index()].set(sq);
    }

    /// 駒を取り除く
    pub(super) fn clear_piece(&mut self, piece: Piece, sq: Square) {
        self.board[sq.index()] = Piece::NONE;
        self.clear_bitboards(piece, sq);
    }

    /// Bitboardだけを消す。mailboxを直後に上書きする捕獲時に使う
    pub(super) fn clear_bitboards(&mut self, piece: Piece, sq: Square) {
        self.by_color[piece.color().index()].clear(sq);
        self.by_piece[piece.index()].clear(sq);
    }

    // ========== 指し手の適用 ==========

    /// 指し手を適用する
    ///
    /// 合法手チェックは行わない。適用後に指した側の玉に王手がかかって
    /// いなければ `true` を返す。`false` でも局面は進んでいるので、
    /// 呼び出し側は `undo_move` で戻すこと。
    pub fn do_move(&mut self, m: Move) -> bool {
        let (flags, from, to, m_piece) = m.destructure();
        let side = self.side;
        match flags {
            DROP => {
                self.set_piece(m_piece, to);
                self.hands[side.index()] = self.hands[side.index()].sub(m_piece.piece_type());
            }
            MOVE => {
                let piece = self.board[from.index()];
                self.clear_piece(piece, from);
                self.set_piece(piece, to);
            }
            MOVE_PROMO => {
                let piece = self.board[from.index()];
                self.clear_piece(piece, from);
                self.set_piece(piece.promote(), to);
            }
            MOVE_CAPTURE => {
                let piece = self.board[from.index()];
                let captured = self.board[to.index()];
                self.clear_piece(piece, from);
                self.clear_bitboards(captured, to);
                self.set_piece(piece, to);
                self.hands[side.index()] =
                    self.hands[side.index()].add(captured.to_opponent_hand().piece_type());
            }
            MOVE_CAPTURE_PROMO => {
                let piece = self.board[from.index()];
                let captured = self.board[to.index()];
                self.clear_piece(piece, from);
                self.clear_bitboards(captured, to);
                self.set_piece(piece.promote(), to);
                self.hands[side.index()] =
                    self.hands[side.index()].add(captured.to_opponent_hand().piece_type());
            }
            _ => {} // null move
        }

        let checkers = movegen::checkers(self, side);
        self.ply += 1;
        self.side = side.opponent();
        checkers.is_empty()
    }

    /// `do_move` の逆操作
    ///
    /// 捕獲された駒の正体（成り状態を含む）は指し手自身が持っているため、
    /// 別のundoスタックなしに完全に復元できる。
    pub fn undo_move(&mut self, m: Move) {
        let (flags, from, to, m_piece) = m.destructure();
        let mover = self.side.opponent();
        match flags {
            DROP => {
                self.clear_piece(m_piece, to);
                self.hands[mover.index()] = self.hands[mover.index()].add(m_piece.piece_type());
            }
            MOVE => {
                let piece = self.board[to.index()];
                self.clear_piece(piece, to);
                self.set_piece(piece, from);
            }
            MOVE_PROMO => {
                let piece = self.board[to.index()];
                self.clear_piece(piece, to);
                self.set_piece(piece.unpromote(), from);
            }
            MOVE_CAPTURE => {
                let piece = self.board[to.index()];
                let captured = m_piece;
                self.set_piece(piece, from);
                self.clear_bitboards(piece, to);
                self.set_piece(captured, to);
                self.hands[mover.index()] =
                    self.hands[mover.index()].sub(captured.to_opponent_hand().piece_type());
            }
            MOVE_CAPTURE_PROMO => {
                let piece = self.board[to.index()];
                let captured = m_piece;
                self.set_piece(piece.unpromote(), from);
                self.clear_bitboards(piece, to);
                self.set_piece(captured, to);
                self.hands[mover.index()] =
                    self.hands[mover.index()].sub(captured.to_opponent_hand().piece_type());
            }
            _ => {} // null move
        }

        self.ply -= 1;
        self.side = mover;
    }

    // ========== 整合性チェック ==========

    /// mailboxとBitboardの冗長性不変条件を検査する。不一致ならpanic
    ///
    /// O(升数 × 駒種数) かかるのでテストとデバッグ専用。
    pub fn assert_consistent(&self) {
        for sq in Square::all() {
            let piece = self.board[sq.index()];
            for c in [Color::Black, Color::White] {
                let expected = piece.is_some() && piece.color() == c;
                assert_eq!(
                    self.by_color[c.index()].contains(sq),
                    expected,
                    "by_color[{c:?}] inconsistency at {sq}"
                );
            }
            for raw in 0..Piece::NUM {
                let expected = piece.is_some() && piece.index() == raw;
                assert_eq!(
                    self.by_piece[raw].contains(sq),
                    expected,
                    "by_piece[{raw}] inconsistency at {sq}"
                );
            }
        }
        for c in [Color::Black, Color::White] {
            let hand = self.hands[c.index()];
            assert_eq!(
                hand.total(),
                crate::types::PieceType::HAND_ORDER.iter().map(|&pt| hand.count(pt)).sum::<u32>(),
                "hand total inconsistency for {c:?}"
            );
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}
