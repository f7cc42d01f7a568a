//! 指し手生成バッファ

use std::ops::Deref;

use crate::types::Move;

/// 1局面から生成される指し手数の上限
///
/// 正しい将棋の局面の疑似合法手は600手に届かないので512で足りる。
pub const MAX_MOVES: usize = 512;

/// 生成した指し手を溜める固定長バッファ
///
/// 探索のホットパスでヒープ確保をしないため、配列と使用数だけを持つ。
/// 書き込み口は `push` だけで、読み出しは `[Move]` へのDerefに任せる
/// （len / iter / 添字アクセスなどはスライス経由）。
pub struct MoveList {
    buf: [Move; MAX_MOVES],
    used: usize,
}

impl MoveList {
    /// 空のバッファを作成
    #[inline]
    pub const fn new() -> Self {
        Self { buf: [Move::NONE; MAX_MOVES], used: 0 }
    }

    /// 指し手を追加。あふれたらpanic（上限超過は生成器のバグ）
    #[inline]
    pub fn push(&mut self, mv: Move) {
        assert!(self.used < MAX_MOVES, "MoveList overflow");
        self.buf[self.used] = mv;
        self.used += 1;
    }
}

impl Deref for MoveList {
    type Target = [Move];

    #[inline]
    fn deref(&self) -> &[Move] {
        &self.buf[..self.used]
    }
}
