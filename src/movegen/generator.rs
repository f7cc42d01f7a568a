//! 疑似合法手の生成
//!
//! 駒種ごとの生成規則は「利きの出どころ（テーブル or magic）」と
//! 「成り判定関数」の組で表す。生成される手は疑似合法で、自玉への
//! 王手放置は `Position::do_move` の返り値で呼び出し側が弾く。

use std::sync::OnceLock;

use crate::bitboard::Bitboard;
use crate::position::Position;
use crate::types::{Color, Move, Piece, PieceType, Square};

use super::magics::{
    bishop_table, black_lance_table, rook_h_table, rook_v_table, white_lance_table, MagicTable,
};
use super::movelist::MoveList;
use super::tables::{
    AttacksTable, BLACK_GOLD_DIRS, BLACK_KNIGHT_DIRS, BLACK_KNIGHT_DROP_ZONE, BLACK_PAWN_DIRS,
    BLACK_PAWN_LANCE_DROP_ZONE, BLACK_SILVER_DIRS, DRAGON_AUX_DIRS, FILE_MASKS, HORSE_AUX_DIRS,
    KING_DIRS, WHITE_GOLD_DIRS, WHITE_KNIGHT_DIRS, WHITE_KNIGHT_DROP_ZONE, WHITE_PAWN_DIRS,
    WHITE_PAWN_LANCE_DROP_ZONE, WHITE_SILVER_DIRS,
};

/// 成り判定。`(成れるか, 成らねばならないか)` を返す
type PromoteFn = fn(Square, Square) -> (bool, bool);

/// 非走り駒の生成規則
struct StepRules {
    attacks: AttacksTable,
    promote: PromoteFn,
}

impl StepRules {
    fn generate(&self, piece: Piece, pos: &Position, list: &mut MoveList) {
        let mut my_pieces = pos.pieces(piece);
        while !my_pieces.is_empty() {
            let from = my_pieces.pop();
            emit_moves(from, self.attacks.attacks(from), pos, self.promote, list);
        }
    }
}

/// 走り駒の生成規則
struct SlideRules {
    magics: &'static MagicTable,
    promote: PromoteFn,
}

impl SlideRules {
    fn generate(&self, piece: Piece, pos: &Position, list: &mut MoveList) {
        let occupied = pos.occupied();
        let mut my_pieces = pos.pieces(piece);
        while !my_pieces.is_empty() {
            let from = my_pieces.pop();
            emit_moves(from, self.magics.attacks(from, occupied), pos, self.promote, list);
        }
    }
}

/// 利きBitboardを指し手に展開する共通部
fn emit_moves(
    from: Square,
    mut attacks: Bitboard,
    pos: &Position,
    promote: PromoteFn,
    list: &mut MoveList,
) {
    let my_color = pos.side();
    let my_opponent = my_color.opponent();

    while !attacks.is_empty() {
        let to = attacks.pop();
        let (can_promote, must_promote) = promote(from, to);

        if pos.pieces_c(my_opponent).contains(to) {
            // 捕獲。取られる駒の正体をMoveに埋め込む
            let captured = pos.piece_on(to);
            if can_promote {
                list.push(Move::new(
                    Move::FLAG_MOVE | Move::FLAG_PROMOTION | Move::FLAG_CAPTURE,
                    from,
                    to,
                    captured,
                ));
            }
            if !must_promote {
                list.push(Move::new(Move::FLAG_MOVE | Move::FLAG_CAPTURE, from, to, captured));
            }
        } else if !pos.pieces_c(my_color).contains(to) {
            // 空き升への移動
            if can_promote {
                list.push(Move::new(
                    Move::FLAG_MOVE | Move::FLAG_PROMOTION,
                    from,
                    to,
                    Piece::NONE,
                ));
            }
            if !must_promote {
                list.push(Move::new(Move::FLAG_MOVE, from, to, Piece::NONE));
            }
        }
    }
}

// ========== 成り判定 ==========
// 成れる: 移動先（銀・角・飛は移動元も）が敵陣3段以内
// 成らねばならない: その先で動けなくなる駒（歩・香は最奥1段、桂は2段）

fn promote_black_pawn_lance(_from: Square, to: Square) -> (bool, bool) {
    match to.rank() {
        1 => (true, true),
        2 | 3 => (true, false),
        _ => (false, false),
    }
}

fn promote_white_pawn_lance(_from: Square, to: Square) -> (bool, bool) {
    match to.rank() {
        9 => (true, true),
        7 | 8 => (true, false),
        _ => (false, false),
    }
}

fn promote_black_knight(_from: Square, to: Square) -> (bool, bool) {
    match to.rank() {
        1 | 2 => (true, true),
        3 => (true, false),
        _ => (false, false),
    }
}

fn promote_white_knight(_from: Square, to: Square) -> (bool, bool) {
    match to.rank() {
        8 | 9 => (true, true),
        7 => (true, false),
        _ => (false, false),
    }
}

fn promote_black_zone(from: Square, to: Square) -> (bool, bool) {
    (from.rank() <= 3 || to.rank() <= 3, false)
}

fn promote_white_zone(from: Square, to: Square) -> (bool, bool) {
    (from.rank() >= 7 || to.rank() >= 7, false)
}

fn promote_never(_from: Square, _to: Square) -> (bool, bool) {
    (false, false)
}

// ========== 規則表 ==========

struct MovegenTables {
    black_pawn: StepRules,
    white_pawn: StepRules,
    black_knight: StepRules,
    white_knight: StepRules,
    black_silver: StepRules,
    white_silver: StepRules,
    black_gold: StepRules,
    white_gold: StepRules,
    king: StepRules,
    horse_aux: StepRules,
    dragon_aux: StepRules,
    black_lance: SlideRules,
    white_lance: SlideRules,
    black_bishop: SlideRules,
    white_bishop: SlideRules,
    black_rook_h: SlideRules,
    black_rook_v: SlideRules,
    white_rook_h: SlideRules,
    white_rook_v: SlideRules,
    // 成り駒は再度成れないので、走りは同じmagic表でも成り判定は常にfalse
    horse_slide: SlideRules,
    dragon_h: SlideRules,
    dragon_v: SlideRules,
}

static MOVEGEN_TABLES: OnceLock<MovegenTables> = OnceLock::new();

fn tables() -> &'static MovegenTables {
    MOVEGEN_TABLES.get_or_init(|| MovegenTables {
        black_pawn: StepRules {
            attacks: AttacksTable::build(&BLACK_PAWN_DIRS),
            promote: promote_black_pawn_lance,
        },
        white_pawn: StepRules {
            attacks: AttacksTable::build(&WHITE_PAWN_DIRS),
            promote: promote_white_pawn_lance,
        },
        black_knight: StepRules {
            attacks: AttacksTable::build(&BLACK_KNIGHT_DIRS),
            promote: promote_black_knight,
        },
        white_knight: StepRules {
            attacks: AttacksTable::build(&WHITE_KNIGHT_DIRS),
            promote: promote_white_knight,
        },
        black_silver: StepRules {
            attacks: AttacksTable::build(&BLACK_SILVER_DIRS),
            promote: promote_black_zone,
        },
        white_silver: StepRules {
            attacks: AttacksTable::build(&WHITE_SILVER_DIRS),
            promote: promote_white_zone,
        },
        black_gold: StepRules {
            attacks: AttacksTable::build(&BLACK_GOLD_DIRS),
            promote: promote_never,
        },
        white_gold: StepRules {
            attacks: AttacksTable::build(&WHITE_GOLD_DIRS),
            promote: promote_never,
        },
        king: StepRules { attacks: AttacksTable::build(&KING_DIRS), promote: promote_never },
        horse_aux: StepRules {
            attacks: AttacksTable::build(&HORSE_AUX_DIRS),
            promote: promote_never,
        },
        dragon_aux: StepRules {
            attacks: AttacksTable::build(&DRAGON_AUX_DIRS),
            promote: promote_never,
        },
        black_lance: SlideRules {
            magics: black_lance_table(),
            promote: promote_black_pawn_lance,
        },
        white_lance: SlideRules {
            magics: white_lance_table(),
            promote: promote_white_pawn_lance,
        },
        black_bishop: SlideRules { magics: bishop_table(), promote: promote_black_zone },
        white_bishop: SlideRules { magics: bishop_table(), promote: promote_white_zone },
        black_rook_h: SlideRules { magics: rook_h_table(), promote: promote_black_zone },
        black_rook_v: SlideRules { magics: rook_v_table(), promote: promote_black_zone },
        white_rook_h: SlideRules { magics: rook_h_table(), promote: promote_white_zone },
        white_rook_v: SlideRules { magics: rook_v_table(), promote: promote_white_zone },
        horse_slide: SlideRules { magics: bishop_table(), promote: promote_never },
        dragon_h: SlideRules { magics: rook_h_table(), promote: promote_never },
        dragon_v: SlideRules { magics: rook_v_table(), promote: promote_never },
    })
}

/// 手番側の疑似合法手をすべて生成してlistに追加する
pub fn generate_all_moves(pos: &Position, list: &mut MoveList) {
    let t = tables();
    match pos.side() {
        Color::Black => {
            t.black_pawn.generate(Piece::B_PAWN, pos, list);
            t.black_lance.generate(Piece::B_LANCE, pos, list);
            t.black_knight.generate(Piece::B_KNIGHT, pos, list);
            t.black_silver.generate(Piece::B_SILVER, pos, list);
            t.black_gold.generate(Piece::B_GOLD, pos, list);
            t.black_bishop.generate(Piece::B_BISHOP, pos, list);

            t.black_rook_h.generate(Piece::B_ROOK, pos, list);
            t.black_rook_v.generate(Piece::B_ROOK, pos, list);

            t.king.generate(Piece::B_KING, pos, list);

            t.black_gold.generate(Piece::B_PRO_PAWN, pos, list);
            t.black_gold.generate(Piece::B_PRO_LANCE, pos, list);
            t.black_gold.generate(Piece::B_PRO_KNIGHT, pos, list);
            t.black_gold.generate(Piece::B_PRO_SILVER, pos, list);

            t.horse_slide.generate(Piece::B_HORSE, pos, list);
            t.horse_aux.generate(Piece::B_HORSE, pos, list);

            t.dragon_h.generate(Piece::B_DRAGON, pos, list);
            t.dragon_v.generate(Piece::B_DRAGON, pos, list);
            t.dragon_aux.generate(Piece::B_DRAGON, pos, list);
        }
        Color::White => {
            t.white_pawn.generate(Piece::W_PAWN, pos, list);
            t.white_lance.generate(Piece::W_LANCE, pos, list);
            t.white_knight.generate(Piece::W_KNIGHT, pos, list);
            t.white_silver.generate(Piece::W_SILVER, pos, list);
            t.white_gold.generate(Piece::W_GOLD, pos, list);
            t.white_bishop.generate(Piece::W_BISHOP, pos, list);

            t.white_rook_h.generate(Piece::W_ROOK, pos, list);
            t.white_rook_v.generate(Piece::W_ROOK, pos, list);

            t.king.generate(Piece::W_KING, pos, list);

            t.white_gold.generate(Piece::W_PRO_PAWN, pos, list);
            t.white_gold.generate(Piece::W_PRO_LANCE, pos, list);
            t.white_gold.generate(Piece::W_PRO_KNIGHT, pos, list);
            t.white_gold.generate(Piece::W_PRO_SILVER, pos, list);

            t.horse_slide.generate(Piece::W_HORSE, pos, list);
            t.horse_aux.generate(Piece::W_HORSE, pos, list);

            t.dragon_h.generate(Piece::W_DRAGON, pos, list);
            t.dragon_v.generate(Piece::W_DRAGON, pos, list);
            t.dragon_aux.generate(Piece::W_DRAGON, pos, list);
        }
    }

    if pos.hand(pos.side()).total() > 0 {
        generate_drops(pos, list);
    }
}

/// 持ち駒を打つ手を生成する
///
/// 歩は二歩と最奥段、香・桂はそれぞれ行き所のない段を除く。
/// 打ち歩詰めはここでは禁止しない（既知のギャップ、呼び出し側で濾す）。
pub(crate) fn generate_drops(pos: &Position, list: &mut MoveList) {
    let my_color = pos.side();
    let my_hand = pos.hand(my_color);
    let empty = !(pos.pieces_c(Color::Black) | pos.pieces_c(Color::White));

    if my_hand.has(PieceType::Pawn) {
        let pawn = Piece::new(my_color, PieceType::Pawn);
        // 自分の生歩がいる筋を集めて除外する（二歩）
        let mut my_pawns = pos.pieces(pawn);
        let mut pawn_files = Bitboard::EMPTY;
        while !my_pawns.is_empty() {
            let sq = my_pawns.pop();
            pawn_files |= FILE_MASKS[(sq.file() - 1) as usize];
        }
        let zone = match my_color {
            Color::Black => BLACK_PAWN_LANCE_DROP_ZONE,
            Color::White => WHITE_PAWN_LANCE_DROP_ZONE,
        };
        add_drops(pawn, empty & zone & !pawn_files, list);
    }

    if my_hand.has(PieceType::Lance) {
        let zone = match my_color {
            Color::Black => BLACK_PAWN_LANCE_DROP_ZONE,
            Color::White => WHITE_PAWN_LANCE_DROP_ZONE,
        };
        add_drops(Piece::new(my_color, PieceType::Lance), empty & zone, list);
    }

    if my_hand.has(PieceType::Knight) {
        let zone = match my_color {
            Color::Black => BLACK_KNIGHT_DROP_ZONE,
            Color::White => WHITE_KNIGHT_DROP_ZONE,
        };
        add_drops(Piece::new(my_color, PieceType::Knight), empty & zone, list);
    }

    for pt in [PieceType::Silver, PieceType::Gold, PieceType::Bishop, PieceType::Rook] {
        if my_hand.has(pt) {
            add_drops(Piece::new(my_color, pt), empty, list);
        }
    }
}

fn add_drops(piece: Piece, mut targets: Bitboard, list: &mut MoveList) {
    while !targets.is_empty() {
        let to = targets.pop();
        list.push(Move::drop(piece, to));
    }
}
