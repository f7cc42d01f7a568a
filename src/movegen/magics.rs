//! 走り駒（香・角・飛）のmagic bitboard
//!
//! 飛車は横と縦の2ファミリに分割し、問い合わせ時にORで合成する。
//! 分割によりmaskのビット数が減り、利きテーブルが小さく収まる。

use std::sync::OnceLock;

use rand::Rng;

use crate::bitboard::Bitboard;
use crate::types::{Direction, Square};

use super::magic_numbers::{
    BISHOP_MAGICS, BLACK_LANCE_MAGICS, ROOK_H_MAGICS, ROOK_V_MAGICS, WHITE_LANCE_MAGICS,
};

/// 走り駒のファミリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicFamily {
    BlackLance,
    WhiteLance,
    Bishop,
    RookHorizontal,
    RookVertical,
}

impl MagicFamily {
    /// ファミリの走り方向
    pub(crate) fn directions(self) -> &'static [Direction] {
        match self {
            MagicFamily::BlackLance => &[Direction::N],
            MagicFamily::WhiteLance => &[Direction::S],
            MagicFamily::Bishop => {
                &[Direction::NE, Direction::NW, Direction::SE, Direction::SW]
            }
            MagicFamily::RookHorizontal => &[Direction::E, Direction::W],
            MagicFamily::RookVertical => &[Direction::N, Direction::S],
        }
    }

    fn baked_magics(self) -> &'static [u64; Square::NUM] {
        match self {
            MagicFamily::BlackLance => &BLACK_LANCE_MAGICS,
            MagicFamily::WhiteLance => &WHITE_LANCE_MAGICS,
            MagicFamily::Bishop => &BISHOP_MAGICS,
            MagicFamily::RookHorizontal => &ROOK_H_MAGICS,
            MagicFamily::RookVertical => &ROOK_V_MAGICS,
        }
    }
}

/// 1升分のmagic情報
pub(crate) struct MagicEntry {
    /// magic indexで引く利きテーブル（長さ 1 << mask.count()）
    attacks: Vec<Bitboard>,
    /// blockerが利きに影響し得る升。各方向の端の升は、そこにblockerが
    /// あっても到達範囲が変わらないため除いてある
    mask: Bitboard,
    /// magic乗数
    magic: u64,
    /// 64 - mask.count()。maskが空の升では64になる
    shift: u32,
}

/// 升で引くMagicEntryの表
pub(crate) struct MagicTable(Vec<MagicEntry>);

impl MagicTable {
    /// 焼き込み済みmagic定数からテーブルを構築
    fn build(family: MagicFamily) -> MagicTable {
        let magics = family.baked_magics();
        let directions = family.directions();
        let mut entries = Vec::with_capacity(Square::NUM);
        for sq in Square::all() {
            let mask = attacks_mask(sq, directions);
            let relevant_bits = mask.count();
            let variations = 1usize << relevant_bits;

            let mut entry = MagicEntry {
                attacks: vec![Bitboard::EMPTY; variations],
                mask,
                magic: magics[sq.index()],
                shift: 64 - relevant_bits,
            };

            for variation in 0..variations {
                let occupancy = occupancy_from_index(variation, mask);
                let index = magic_index(occupancy, entry.magic, entry.shift);
                entry.attacks[index as usize] =
                    attacks_with_blockers(sq, directions, occupancy);
            }
            entries.push(entry);
        }
        MagicTable(entries)
    }

    /// 盤上の駒配置に対する利きを引く
    #[inline]
    pub(crate) fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let entry = &self.0[sq.index()];
        let index = magic_index(occupied & entry.mask, entry.magic, entry.shift);
        entry.attacks[index as usize]
    }

    #[cfg(test)]
    fn entry(&self, sq: Square) -> &MagicEntry {
        &self.0[sq.index()]
    }
}

/// magic indexを計算する
///
/// `merge()` はmaskが両半分の同一ビット位置を同時に使わないことに依存する
/// （maskの構成がそれを保証する）。maskが空の升では shift == 64 となるが、
/// そのとき被乗数は常に0なのでindexも0で正しい。
#[inline]
fn magic_index(occupancy: Bitboard, magic: u64, shift: u32) -> u64 {
    occupancy.merge().wrapping_mul(magic).checked_shr(shift).unwrap_or(0)
}

/// blockerが関係する升のmask
///
/// 各方向に走り、その方向の最後の升（盤端）の手前までを立てる。
/// 盤端のblockerは到達範囲を変えないのでmaskから除ける。
pub(crate) fn attacks_mask(sq: Square, directions: &[Direction]) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for &d in directions {
        let mut cur = sq;
        while let Some(next) = d.apply(cur) {
            if d.apply(next).is_none() {
                break; // nextはこの方向の盤端
            }
            bb.set(next);
            cur = next;
        }
    }
    bb
}

/// blockerを考慮した利き。blockerの升自体は利きに含む（捕獲として表現）
pub(crate) fn attacks_with_blockers(
    sq: Square,
    directions: &[Direction],
    blockers: Bitboard,
) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for &d in directions {
        let mut cur = sq;
        while let Some(next) = d.apply(cur) {
            bb.set(next);
            if blockers.contains(next) {
                break;
            }
            cur = next;
        }
    }
    bb
}

/// maskの部分集合をインデックスから復元する
pub(crate) fn occupancy_from_index(index: usize, mask: Bitboard) -> Bitboard {
    let mut occupancy = Bitboard::EMPTY;
    let mut rest = mask;
    let mut i = 0;
    while !rest.is_empty() {
        let sq = rest.pop();
        if (index >> i) & 1 != 0 {
            occupancy.set(sq);
        }
        i += 1;
    }
    occupancy
}

/// 1升分のmagic乗数を探索する（オフライン用、ホットパスでは使わない）
///
/// 疎な乱数（3つの乱数のAND）を候補とし、全occupancyでindexの衝突が
/// 破壊的でないものを探す。見つからなければNone。
pub fn find_magic(family: MagicFamily, sq: Square, attempts: u32) -> Option<u64> {
    let directions = family.directions();
    let mask = attacks_mask(sq, directions);
    let relevant_bits = mask.count();
    let shift = 64 - relevant_bits;
    let variations = 1usize << relevant_bits;

    let mut occupancy = Vec::with_capacity(variations);
    let mut attacks = Vec::with_capacity(variations);
    for variation in 0..variations {
        let occ = occupancy_from_index(variation, mask);
        occupancy.push(occ);
        attacks.push(attacks_with_blockers(sq, directions, occ));
    }

    let mut rng = rand::thread_rng();
    // indexed_attacksの全消去を避けるため、試行番号のスタンプで世代管理する
    let mut indexed_attacks = vec![Bitboard::EMPTY; variations];
    let mut indexed_stamp = vec![0u32; variations];

    for attempt in 1..=attempts {
        let magic = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();

        let mut fail = false;
        for variation in 0..variations {
            let index = magic_index(occupancy[variation], magic, shift) as usize;
            if indexed_stamp[index] < attempt {
                indexed_stamp[index] = attempt;
                indexed_attacks[index] = attacks[variation];
            } else if indexed_attacks[index] != attacks[variation] {
                fail = true;
                break;
            }
        }
        if !fail {
            return Some(magic);
        }
    }
    None
}

static BLACK_LANCE_TABLE: OnceLock<MagicTable> = OnceLock::new();
static WHITE_LANCE_TABLE: OnceLock<MagicTable> = OnceLock::new();
static BISHOP_TABLE: OnceLock<MagicTable> = OnceLock::new();
static ROOK_H_TABLE: OnceLock<MagicTable> = OnceLock::new();
static ROOK_V_TABLE: OnceLock<MagicTable> = OnceLock::new();

pub(crate) fn black_lance_table() -> &'static MagicTable {
    BLACK_LANCE_TABLE.get_or_init(|| MagicTable::build(MagicFamily::BlackLance))
}

pub(crate) fn white_lance_table() -> &'static MagicTable {
    WHITE_LANCE_TABLE.get_or_init(|| MagicTable::build(MagicFamily::WhiteLance))
}

pub(crate) fn bishop_table() -> &'static MagicTable {
    BISHOP_TABLE.get_or_init(|| MagicTable::build(MagicFamily::Bishop))
}

pub(crate) fn rook_h_table() -> &'static MagicTable {
    ROOK_H_TABLE.get_or_init(|| MagicTable::build(MagicFamily::RookHorizontal))
}

pub(crate) fn rook_v_table() -> &'static MagicTable {
    ROOK_V_TABLE.get_or_init(|| MagicTable::build(MagicFamily::RookVertical))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_for(family: MagicFamily) -> &'static MagicTable {
        match family {
            MagicFamily::BlackLance => black_lance_table(),
            MagicFamily::WhiteLance => white_lance_table(),
            MagicFamily::Bishop => bishop_table(),
            MagicFamily::RookHorizontal => rook_h_table(),
            MagicFamily::RookVertical => rook_v_table(),
        }
    }

    /// 全ファミリ・全升・maskの全部分集合でmagic参照と逐次走査が一致する
    #[test]
    fn test_magic_lookup_matches_ray_walk() {
        for family in [
            MagicFamily::BlackLance,
            MagicFamily::WhiteLance,
            MagicFamily::Bishop,
            MagicFamily::RookHorizontal,
            MagicFamily::RookVertical,
        ] {
            let table = table_for(family);
            let directions = family.directions();
            for sq in Square::all() {
                let mask = attacks_mask(sq, directions);
                let variations = 1usize << mask.count();
                for variation in 0..variations {
                    let occ = occupancy_from_index(variation, mask);
                    assert_eq!(
                        table.attacks(sq, occ),
                        attacks_with_blockers(sq, directions, occ),
                        "{family:?} sq {sq} variation {variation}"
                    );
                }
            }
        }
    }

    /// maskは盤端を含まず、merge()の単射性の前提（low/highの重なりなし）を
    /// どのoccupancyでも満たす
    #[test]
    fn test_mask_properties() {
        for family in [
            MagicFamily::BlackLance,
            MagicFamily::WhiteLance,
            MagicFamily::Bishop,
            MagicFamily::RookHorizontal,
            MagicFamily::RookVertical,
        ] {
            let directions = family.directions();
            for sq in Square::all() {
                let mask = attacks_mask(sq, directions);
                // maskの全升は、その方向にまだ先がある（= 盤端でない）
                for m in mask.iter() {
                    assert!(
                        directions.iter().any(|d| d.apply(m).is_some()),
                        "{family:?}: mask square {m} is a board edge"
                    );
                }
                // merge単射性: lowとhighが同じビット位置を同時に使わない
                assert_eq!(mask.low() & mask.high(), 0, "{family:?} sq {sq}");
            }
        }
    }

    #[test]
    fn test_mask_sizes() {
        // 香は最大7bit、角は最大12bit、飛の分割ファミリは最大7bit
        let max_bits = |family: MagicFamily| {
            Square::all()
                .map(|sq| attacks_mask(sq, family.directions()).count())
                .max()
                .unwrap()
        };
        assert_eq!(max_bits(MagicFamily::BlackLance), 7);
        assert_eq!(max_bits(MagicFamily::WhiteLance), 7);
        assert_eq!(max_bits(MagicFamily::Bishop), 12);
        assert_eq!(max_bits(MagicFamily::RookHorizontal), 7);
        assert_eq!(max_bits(MagicFamily::RookVertical), 7);
    }

    #[test]
    fn test_empty_mask_entry() {
        // 先手の香が1段目にいるときmaskは空で、利きテーブルは1エントリ
        let table = black_lance_table();
        let entry = table.entry(Square::SQ_9A);
        assert!(entry.mask.is_empty());
        assert_eq!(entry.shift, 64);
        assert_eq!(entry.attacks.len(), 1);
        assert!(table.attacks(Square::SQ_9A, Bitboard::ALL).is_empty());
    }

    #[test]
    fn test_rook_split_union() {
        // 横と縦の合成が飛車の利きになる
        let sq = Square::SQ_5E;
        let occ = Bitboard::from_square(Square::from_usi("5c").unwrap())
            | Bitboard::from_square(Square::from_usi("2e").unwrap());
        let h = rook_h_table().attacks(sq, occ);
        let v = rook_v_table().attacks(sq, occ);
        let all = h | v;
        // 縦: 5d,5c(blocker)と5f..5i、横: 4e,3e,2e(blocker)と6e..9e
        assert!(all.contains(Square::from_usi("5c").unwrap()));
        assert!(!all.contains(Square::from_usi("5b").unwrap()));
        assert!(all.contains(Square::from_usi("2e").unwrap()));
        assert!(!all.contains(Square::from_usi("1e").unwrap()));
        assert!(all.contains(Square::from_usi("9e").unwrap()));
        assert!(all.contains(Square::from_usi("5i").unwrap()));
        assert_eq!(all.count(), 2 + 4 + 3 + 4);
    }

    #[test]
    fn test_find_magic_small_square() {
        // 探索がmask付き角の升でも妥当なmagicを返す
        let family = MagicFamily::RookVertical;
        let sq = Square::SQ_5E;
        let magic = find_magic(family, sq, 1_000_000).expect("magic should be found");
        let directions = family.directions();
        let mask = attacks_mask(sq, directions);
        let shift = 64 - mask.count();
        let variations = 1usize << mask.count();
        let mut seen = vec![None; variations];
        for variation in 0..variations {
            let occ = occupancy_from_index(variation, mask);
            let index = occ.merge().wrapping_mul(magic).checked_shr(shift).unwrap_or(0) as usize;
            let attacks = attacks_with_blockers(sq, directions, occ);
            match &seen[index] {
                None => seen[index] = Some(attacks),
                Some(prev) => assert_eq!(*prev, attacks),
            }
        }
    }
}
