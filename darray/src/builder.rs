//! ダブル配列のビルダー
//!
//! このモジュールは、ソート済みで重複のないキー列から [`DoubleArray`] を構築します。
//! キーの範囲を共通接頭辞ごとに再帰的に分割し、各ノードの子をまとめて配置できる
//! オフセットを空きスロットのリストから探索します。

mod observer;
mod slots;

use crate::code::{CodeMapper, MAX_CODE, NULL_ID, ROOT_ID, TERMINATE_CODE};
use crate::double_array::DoubleArray;
use crate::errors::{DarrayError, Result};

use self::slots::SlotArrays;

pub use self::observer::{BuildObserver, EdgeEvent, NoopObserver};

/// 配列の初期長の既定値。
pub const DEFAULT_INITIAL_CAPACITY: usize = 4096;

/// 配列の初期長として受け付ける最小値。
///
/// 予約スロットとルートに加えて、空きスロットが最低1つ必要です。
pub const MIN_INITIAL_CAPACITY: usize = ROOT_ID + 2;

/// ソート済みのキー列から [`DoubleArray`] を構築するビルダー
///
/// # 例
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use darray::DoubleArrayBuilder;
///
/// let keys = ["ab", "ac", "b", "da"];
/// let da = DoubleArrayBuilder::new()
///     .code_offset(b'a' - 1)
///     .build(&keys)?;
///
/// for (id, key) in keys.iter().enumerate() {
///     assert_eq!(da.lookup_with_offset(key.as_bytes(), b'a' - 1)?, Some(id as u32));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DoubleArrayBuilder {
    code_offset: u8,
    initial_capacity: usize,
}

impl Default for DoubleArrayBuilder {
    fn default() -> Self {
        Self {
            code_offset: 0,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl DoubleArrayBuilder {
    /// 既定の設定でビルダーを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 各バイトから引くオフセットを設定します。
    ///
    /// キーに現れる最小のバイトが`1`になるように設定すると、オフセット探索の範囲が
    /// 狭くなります。検索時にも同じ値を [`DoubleArray::lookup_with_offset`] に
    /// 渡す必要があります。
    pub const fn code_offset(mut self, code_offset: u8) -> Self {
        self.code_offset = code_offset;
        self
    }

    /// 配列の初期長を設定します。足りなくなると自動的に拡張されます。
    pub const fn initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// ダブル配列を構築します。
    ///
    /// `keys[i]`には識別子`i`が割り当てられます。
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - キーが厳密な昇順でない場合([`DarrayError::OrderingViolation`])。
    /// - 辺コードに変換できないバイトを含む場合([`DarrayError::InvalidKeyByte`])。
    /// - 初期長が [`MIN_INITIAL_CAPACITY`] 未満の場合([`DarrayError::InvalidArgument`])。
    /// - 内部の不変条件が破れた場合([`DarrayError::InvalidState`])。
    pub fn build<K>(&self, keys: &[K]) -> Result<DoubleArray>
    where
        K: AsRef<[u8]>,
    {
        self.build_with_observer(keys, &mut NoopObserver)
    }

    /// 観測者を指定してダブル配列を構築します。
    ///
    /// 観測者は進捗と辺の割り当てを受け取るだけで、結果には影響しません。
    pub fn build_with_observer<K, O>(&self, keys: &[K], observer: &mut O) -> Result<DoubleArray>
    where
        K: AsRef<[u8]>,
        O: BuildObserver + ?Sized,
    {
        if self.initial_capacity < MIN_INITIAL_CAPACITY {
            return Err(DarrayError::invalid_argument(
                "initial_capacity",
                format!(
                    "must be at least {MIN_INITIAL_CAPACITY}, but {} was given",
                    self.initial_capacity
                ),
            ));
        }
        let mapper = CodeMapper::new(self.code_offset);
        check_premise(keys, mapper)?;
        i32::try_from(keys.len())?;

        let mut slots = SlotArrays::new(self.initial_capacity)?;
        slots.remove(ROOT_ID)?;
        slots.set_base(ROOT_ID, NULL_ID as i32);
        slots.set_check(ROOT_ID, NULL_ID as i32);

        let mut construction = Construction {
            keys,
            mapper,
            slots,
            observer,
            max_node_id: ROOT_ID,
            next_id: 0,
            reported_tenths: 0,
        };
        construction.make_nodes()?;
        construction.finish()
    }
}

/// キー列が厳密な昇順であり、すべてのバイトが辺コードに変換できることを確認します。
fn check_premise<K>(keys: &[K], mapper: CodeMapper) -> Result<()>
where
    K: AsRef<[u8]>,
{
    for (i, key) in keys.iter().enumerate() {
        let key = key.as_ref();
        if i != 0 {
            let prev = keys[i - 1].as_ref();
            if prev >= key {
                return Err(DarrayError::ordering_violation(i, prev, key));
            }
        }
        if let Some((position, &byte)) = key
            .iter()
            .enumerate()
            .find(|&(_, &byte)| mapper.code(byte).is_none())
        {
            return Err(DarrayError::invalid_key_byte(Some(i), position, byte));
        }
    }
    Ok(())
}

/// 同じ辺コードを持つキーの範囲
struct EdgeRange {
    code: u8,
    left: usize,
    right: usize,
    node_id: usize,
}

/// 1回の構築に閉じた作業状態
struct Construction<'a, K, O: ?Sized> {
    keys: &'a [K],
    mapper: CodeMapper,
    slots: SlotArrays,
    observer: &'a mut O,
    max_node_id: usize,
    next_id: usize,
    reported_tenths: usize,
}

impl<K, O> Construction<'_, K, O>
where
    K: AsRef<[u8]>,
    O: BuildObserver + ?Sized,
{
    /// ルートから深さ優先で各ノードの子を割り当てます。
    ///
    /// 兄弟をキーの順に処理するため、終端には昇順に識別子が割り当てられます。
    fn make_nodes(&mut self) -> Result<()> {
        let mut stack = vec![(ROOT_ID, 0, 0, self.keys.len())];
        while let Some((node_id, depth, left, right)) = stack.pop() {
            let mut edges = self.collect_edges(depth, left, right);
            if edges.is_empty() {
                continue;
            }
            self.assign_node(node_id, depth, &mut edges)?;
            stack.extend(
                edges
                    .iter()
                    .rev()
                    .filter(|e| e.code != TERMINATE_CODE)
                    .map(|e| (e.node_id, depth + 1, e.left, e.right)),
            );
        }
        Ok(())
    }

    #[inline(always)]
    fn edge_code(&self, index: usize, depth: usize) -> u8 {
        match self.keys[index].as_ref().get(depth) {
            // Bytes were validated by check_premise().
            Some(&byte) => byte - self.mapper.offset(),
            None => TERMINATE_CODE,
        }
    }

    /// `[left, right)`のキーを深さ`depth`の辺コードでまとめます。
    fn collect_edges(&self, depth: usize, left: usize, right: usize) -> Vec<EdgeRange> {
        let mut edges = vec![];
        let mut i = left;
        while i < right {
            if self.keys[i].as_ref().len() < depth {
                i += 1;
                continue;
            }
            let code = self.edge_code(i, depth);
            let edge_left = i;
            i += 1;
            while i < right && self.edge_code(i, depth) == code {
                i += 1;
            }
            edges.push(EdgeRange {
                code,
                left: edge_left,
                right: i,
                node_id: NULL_ID,
            });
        }
        edges
    }

    fn assign_node(&mut self, node_id: usize, depth: usize, edges: &mut [EdgeRange]) -> Result<()> {
        let offset = self.find_offset(edges)?;
        self.slots.set_base(node_id, i32::try_from(offset)?);

        for e in edges.iter_mut() {
            e.node_id = offset + usize::from(e.code);
            self.slots.remove(e.node_id)?;
            self.slots.set_check(e.node_id, i32::try_from(node_id)?);

            if e.code == TERMINATE_CODE {
                let id = i32::try_from(self.next_id)?;
                self.slots.set_base(e.node_id, -(id + 1));
                self.next_id += 1;
                self.report_progress();
            }
            self.max_node_id = self.max_node_id.max(e.node_id);

            tracing::trace!(
                parent = node_id,
                child = e.node_id,
                depth,
                code = e.code,
                left = e.left,
                right = e.right,
                "assigned edge"
            );
            self.observer.on_edge(&EdgeEvent {
                parent: node_id,
                child: e.node_id,
                depth,
                code: e.code,
                byte: self.mapper.byte(e.code),
                keys: e.left..e.right,
            });
        }
        Ok(())
    }

    /// すべての辺の子スロットが空いているオフセットを、空きリストの先頭から探します。
    fn find_offset(&mut self, edges: &[EdgeRange]) -> Result<usize> {
        let mut offset = self.slots.head();
        loop {
            // Keep every probe in bounds and at least one slot free after assignment.
            self.slots.grow(offset + usize::from(MAX_CODE) + 2)?;

            if edges
                .iter()
                .all(|e| self.slots.is_free(offset + usize::from(e.code)))
            {
                return Ok(offset);
            }

            let next = self.slots.next_free(offset);
            if next <= offset {
                return Err(DarrayError::invalid_state(
                    "the free list wrapped around during the offset search",
                    format!("offset {offset}, next {next}, {} slots", self.slots.len()),
                ));
            }
            offset = next;
        }
    }

    fn report_progress(&mut self) {
        let total = self.keys.len();
        let tenths = self.next_id * 10 / total;
        if tenths > self.reported_tenths {
            self.reported_tenths = tenths;
            self.observer.on_progress(self.next_id, total);
        }
    }

    fn finish(self) -> Result<DoubleArray> {
        if self.next_id != self.keys.len() {
            return Err(DarrayError::invalid_state(
                "the number of assigned identifiers differs from the number of keys",
                format!("{} identifiers for {} keys", self.next_id, self.keys.len()),
            ));
        }
        let num_nodes = self.max_node_id + 1;

        tracing::debug!(
            keys = self.keys.len(),
            nodes = num_nodes,
            allocated = self.slots.len(),
            "built double array"
        );

        let (base, check) = self.slots.into_parts(num_nodes);
        Ok(DoubleArray::from_parts(base, check))
    }
}
