//! 構築の進捗と構造を観測するためのフック

use std::ops::Range;

/// 構築中に割り当てられた1本の辺
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EdgeEvent {
    /// 親ノードのID
    pub parent: usize,

    /// 割り当てられた子スロットのID
    pub child: usize,

    /// 親ノードの深さ(ルートは0)
    pub depth: usize,

    /// 辺コード(終端は0)
    pub code: u8,

    /// 辺コードに対応する元のバイト(終端は`None`)
    pub byte: Option<u8>,

    /// この辺の下にあるキーの範囲
    pub keys: Range<usize>,
}

/// 構築処理の観測者
///
/// どのメソッドも既定では何もしません。構築結果には影響しません。
pub trait BuildObserver {
    /// 割り当て済みの識別子が全体の1割を超えるたびに呼ばれます。
    fn on_progress(&mut self, _assigned: usize, _total: usize) {}

    /// 辺が割り当てられるたびに呼ばれます。
    fn on_edge(&mut self, _event: &EdgeEvent) {}
}

/// 何もしない観測者
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}
