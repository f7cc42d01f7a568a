//! 事前計算テーブルの一括初期化
//!
//! 各テーブルはOnceLockで初回参照時に構築されるが、探索やベンチの
//! 計測前にまとめて温めたいときはここを呼ぶ。初期化中はログを出さない。

use std::sync::Once;

use crate::movegen::{generate_all_moves, MoveList};
use crate::position::Position;

static INIT_ONCE: Once = Once::new();

/// 全ての静的テーブルを一度だけ初期化する
///
/// 複数スレッドから同時に呼んでも安全。利きテーブルとmagicテーブルは
/// 初期化後は読み取り専用で、参照共有できる。
pub fn init_all_tables_once() {
    INIT_ONCE.call_once(|| {
        // 初期局面で一度生成を走らせると、非走り駒の利きテーブルと
        // 全magicファミリのテーブルが依存順に構築される
        let pos = Position::startpos();
        let mut list = MoveList::new();
        generate_all_moves(&pos, &mut list);
    });
}

/// 初期化済みかどうか（デバッグ用）
#[cfg(debug_assertions)]
pub fn is_initialized() -> bool {
    INIT_ONCE.is_completed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::checkers;
    use crate::types::Color;

    #[test]
    fn test_init_populates_slider_tables() {
        init_all_tables_once();
        init_all_tables_once();

        #[cfg(debug_assertions)]
        assert!(is_initialized());

        // 初期化済みのmagicテーブルで香の利きが空の筋を貫いて引ける
        let mut pos = Position::from_sfen("4k4/9/9/9/9/9/9/9/4LK3 b - 1").unwrap();
        let checks: Vec<String> =
            checkers(&mut pos, Color::White).iter().map(|sq| sq.to_string()).collect();
        assert_eq!(checks, vec!["5i"]);
    }

    #[test]
    fn test_concurrent_first_use_of_tables() {
        use std::thread;

        // 初期化と最初のテーブル参照が複数スレッドから同時に起きても、
        // 全スレッドが完成済みのテーブルで同じ生成結果を得る
        let handles: Vec<_> = (0..8)
            .map(|_| {
                thread::spawn(|| {
                    init_all_tables_once();
                    let pos = Position::startpos();
                    let mut list = MoveList::new();
                    generate_all_moves(&pos, &mut list);
                    list.len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 30);
        }
    }
}
