//! ダブル配列
//!
//! このモジュールは、構築済みのダブル配列トライに対する読み取り専用のビューを提供します。
//! `base`と`check`の2本の整数配列だけで遷移を表現し、キー長に比例する時間で
//! 検索を行います。
//!
//! 親ノード`p`から辺コード`c`で到達する子ノードは`base[p] + c`であり、
//! `check[base[p] + c] == p`が成り立つ場合に限り遷移が存在します。
//! キーの終端は予約コード`0`による遷移で表され、到達したスロットの`base`に
//! 識別子が負の値`-(id + 1)`として格納されます。

mod archive;
mod format;

use rkyv::{Archive, Deserialize, Serialize};

use crate::code::{CodeMapper, NULL_ID, ROOT_ID, TERMINATE_CODE};
use crate::errors::{DarrayError, Result};

/// 構築済みのダブル配列トライ
///
/// 構築器([`DoubleArrayBuilder`](crate::DoubleArrayBuilder))または直列化データから
/// 一度だけ作られ、以後は変更されません。検索は状態を変更しないため、
/// 任意の数のスレッドから同時に呼び出せます。
#[derive(Clone, Debug, Eq, PartialEq, Archive, Serialize, Deserialize)]
pub struct DoubleArray {
    base: Vec<i32>,
    check: Vec<i32>,
}

/// スロットの内容を分類したビュー
///
/// ダブル配列は空きリスト・内部ノード・終端を同じ2本の配列に符号で重ねて
/// 格納しています。この型はその解釈を明示したものです。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    /// 予約スロット(ID 0)
    Null,

    /// ルートノード
    Root {
        /// 子ノードへのオフセット
        base: i32,
    },

    /// 内部ノード
    Node {
        /// 親ノードのID
        parent: usize,

        /// 子ノードへのオフセット
        base: i32,
    },

    /// キーの終端
    Terminal {
        /// 終端するノードのID
        parent: usize,

        /// キーの識別子
        id: u32,
    },

    /// 構築時の空きリストの名残
    Free {
        /// 次の空きスロット
        next: usize,

        /// 前の空きスロット
        prev: usize,
    },
}

impl DoubleArray {
    /// 2本の配列からダブル配列を作成します。
    pub(crate) fn from_parts(base: Vec<i32>, check: Vec<i32>) -> Self {
        debug_assert_eq!(base.len(), check.len());
        Self { base, check }
    }

    /// キーを検索し、その識別子を返します。
    ///
    /// キーの各バイトは辺コードとしてそのまま使われます。
    ///
    /// # 戻り値
    ///
    /// キーが登録されていれば`Ok(Some(id))`、登録されていなければ`Ok(None)`。
    ///
    /// # エラー
    ///
    /// キーにバイト`0`が含まれる場合、[`DarrayError::InvalidKeyByte`]を返します。
    ///
    /// # 例
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use darray::DoubleArrayBuilder;
    ///
    /// let da = DoubleArrayBuilder::new().build(&["ace", "ad", "ade", "cab"])?;
    /// assert_eq!(da.lookup(b"ade")?, Some(2));
    /// assert_eq!(da.lookup(b"ac")?, None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn lookup(&self, key: &[u8]) -> Result<Option<u32>> {
        lookup_in(&self.base, &self.check, key, CodeMapper::default())
    }

    /// 構築時と同じオフセットで各バイトを辺コードに変換してから検索します。
    ///
    /// # エラー
    ///
    /// `code_offset`以下のバイトが含まれる場合、[`DarrayError::InvalidKeyByte`]を返します。
    #[inline]
    pub fn lookup_with_offset(&self, key: &[u8], code_offset: u8) -> Result<Option<u32>> {
        lookup_in(&self.base, &self.check, key, CodeMapper::new(code_offset))
    }

    /// 変換済みの辺コード列で検索します。
    ///
    /// 辺コードの範囲は検証しません。終端コード`0`が含まれる場合は`None`になります。
    #[inline]
    pub fn lookup_codes<I>(&self, codes: I) -> Option<u32>
    where
        I: IntoIterator<Item = u8>,
    {
        traverse(&self.base, &self.check, codes)
    }

    /// キーが登録されているかどうかを返します。
    ///
    /// 辺コードとして無効なバイトを含むキーは登録され得ないため、`false`を返します。
    #[inline]
    pub fn contains(&self, key: &[u8]) -> bool {
        matches!(self.lookup(key), Ok(Some(_)))
    }

    /// ノード数(配列の長さ)を返します。
    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.base.len()
    }

    /// 2本の配列が占めるバイト数を返します。
    #[inline(always)]
    pub fn byte_size(&self) -> usize {
        self.num_nodes() * 2 * std::mem::size_of::<i32>()
    }

    /// 登録されているキーの数を返します。
    ///
    /// 終端スロットを数えるため、配列長に比例する時間がかかります。
    pub fn num_keys(&self) -> usize {
        self.slots()
            .filter(|(_, slot)| matches!(slot, Slot::Terminal { .. }))
            .count()
    }

    /// `base`配列を返します。
    #[inline(always)]
    pub fn base(&self) -> &[i32] {
        &self.base
    }

    /// `check`配列を返します。
    #[inline(always)]
    pub fn check(&self) -> &[i32] {
        &self.check
    }

    /// 指定したスロットの分類を返します。範囲外の場合は`None`を返します。
    pub fn slot(&self, index: usize) -> Option<Slot> {
        let base = *self.base.get(index)?;
        let check = *self.check.get(index)?;
        Some(classify(index, base, check))
    }

    /// すべてのスロットを先頭から順に列挙します。
    pub fn slots(&self) -> impl Iterator<Item = (usize, Slot)> + '_ {
        self.base
            .iter()
            .zip(&self.check)
            .enumerate()
            .map(|(index, (&base, &check))| (index, classify(index, base, check)))
    }
}

fn classify(index: usize, base: i32, check: i32) -> Slot {
    if index == NULL_ID {
        return Slot::Null;
    }
    if check < 0 {
        return Slot::Free {
            next: base.unsigned_abs() as usize,
            prev: check.unsigned_abs() as usize,
        };
    }
    if index == ROOT_ID {
        return Slot::Root { base };
    }
    // check >= 0 here, so the conversion is lossless.
    let parent = check as usize;
    if base < 0 {
        Slot::Terminal {
            parent,
            id: base.unsigned_abs() - 1,
        }
    } else {
        Slot::Node { parent, base }
    }
}

/// 配列の要素から`i32`を取り出すためのトレイト
///
/// 所有している配列とrkyvでアーカイブされた配列の双方で同じ走査処理を使うために
/// 用います。
pub(crate) trait Cell: Copy {
    fn get(self) -> i32;
}

impl Cell for i32 {
    #[inline(always)]
    fn get(self) -> i32 {
        self
    }
}

impl Cell for rkyv::rend::i32_le {
    #[inline(always)]
    fn get(self) -> i32 {
        self.to_native()
    }
}

/// キーを検証してから走査します。
pub(crate) fn lookup_in<T>(base: &[T], check: &[T], key: &[u8], mapper: CodeMapper) -> Result<Option<u32>>
where
    T: Cell,
{
    // Reject invalid keys before walking so the error does not depend on the stored set.
    if let Some((position, &byte)) = key
        .iter()
        .enumerate()
        .find(|&(_, &byte)| mapper.code(byte).is_none())
    {
        return Err(DarrayError::invalid_key_byte(None, position, byte));
    }
    Ok(traverse(
        base,
        check,
        key.iter().filter_map(|&byte| mapper.code(byte)),
    ))
}

pub(crate) fn traverse<T, I>(base: &[T], check: &[T], codes: I) -> Option<u32>
where
    T: Cell,
    I: IntoIterator<Item = u8>,
{
    let mut node_id = ROOT_ID;
    for code in codes {
        if code == TERMINATE_CODE {
            return None;
        }
        node_id = child(base, check, node_id, code)?;
    }
    let terminal_id = child(base, check, node_id, TERMINATE_CODE)?;
    let encoded = base.get(terminal_id)?.get();
    if encoded >= 0 {
        return None;
    }
    Some(encoded.unsigned_abs() - 1)
}

/// `node_id`から`code`で遷移した先のノードIDを返します。
///
/// 配列の範囲外や負のオフセットは遷移なしとして扱うため、壊れた配列でも
/// パニックしません。
#[inline(always)]
fn child<T>(base: &[T], check: &[T], node_id: usize, code: u8) -> Option<usize>
where
    T: Cell,
{
    let offset = base.get(node_id)?.get();
    let next = usize::try_from(offset.checked_add(i32::from(code))?).ok()?;
    let parent = usize::try_from(check.get(next)?.get()).ok()?;
    (parent == node_id).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    // {"a" => 0, "ab" => 1, "b" => 2} packed by hand with codes a = 1, b = 2.
    fn hand_packed() -> DoubleArray {
        let base = vec![0, 1, 4, 7, -1, -2, 5, -3];
        let check = vec![0, 0, 1, 1, 2, 6, 2, 3];
        DoubleArray::from_parts(base, check)
    }

    #[test]
    fn test_traverse_hand_packed() {
        let da = hand_packed();
        assert_eq!(Some(0), da.lookup_codes([1]));
        assert_eq!(Some(1), da.lookup_codes([1, 2]));
        assert_eq!(Some(2), da.lookup_codes([2]));
        assert_eq!(None, da.lookup_codes([]));
        assert_eq!(None, da.lookup_codes([1, 1]));
        assert_eq!(None, da.lookup_codes([2, 2]));
        assert_eq!(None, da.lookup_codes([1, 0]));
        assert_eq!(3, da.num_keys());
    }

    #[test]
    fn test_classify_hand_packed() {
        let da = hand_packed();
        assert_eq!(Some(Slot::Node { parent: 1, base: 4 }), da.slot(2));
        assert_eq!(Some(Slot::Terminal { parent: 2, id: 0 }), da.slot(4));
        assert_eq!(Some(Slot::Node { parent: 2, base: 5 }), da.slot(6));
        assert_eq!(Some(Slot::Terminal { parent: 3, id: 2 }), da.slot(7));
    }

    #[test]
    fn test_classify_reserved_slots() {
        let da = DoubleArray::from_parts(vec![0, 3, -1], vec![0, 0, -1]);
        assert_eq!(Some(Slot::Null), da.slot(0));
        assert_eq!(Some(Slot::Root { base: 3 }), da.slot(1));
        assert_eq!(Some(Slot::Free { next: 1, prev: 1 }), da.slot(2));
        assert_eq!(None, da.slot(3));
    }

    #[test]
    fn test_out_of_range_offsets_do_not_panic() {
        let da = hand_packed();
        for key in [&b"a"[..], b"ab", b"b", b"zzz", b"\xff\xff"] {
            assert_eq!(None, da.lookup(key).unwrap());
        }
        let da = DoubleArray::from_parts(vec![0, i32::MAX], vec![0, 0]);
        assert_eq!(None, da.lookup(b"\xff").unwrap());
        let da = DoubleArray::from_parts(vec![0, i32::MIN], vec![0, 0]);
        assert_eq!(None, da.lookup(b"").unwrap());
    }

    #[test]
    fn test_lookup_rejects_terminate_byte() {
        let da = hand_packed();
        assert!(matches!(da.lookup(b"a\0"), Err(DarrayError::InvalidKeyByte(_))));
        assert!(!da.contains(b"\0"));
    }

    #[test]
    fn test_byte_size() {
        let da = DoubleArray::from_parts(vec![0; 10], vec![0; 10]);
        assert_eq!(10, da.num_nodes());
        assert_eq!(80, da.byte_size());
    }
}
