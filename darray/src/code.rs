//! ノードIDと辺コードに関する共通定義
//!
//! 構築器とダブル配列の双方が参照する定数と、キーのバイトから辺コードへの
//! 変換を提供します。

use crate::errors::{DarrayError, Result};

/// 使用されない予約スロットのID。
pub const NULL_ID: usize = 0;

/// ルートノードのID。
pub const ROOT_ID: usize = 1;

/// キーの終端を表す予約辺コード。
///
/// 実際のキーの辺コードは必ず`1..=255`の範囲に収まるため、終端と衝突しません。
pub const TERMINATE_CODE: u8 = 0;

/// 辺コードの最大値。
pub const MAX_CODE: u8 = u8::MAX;

/// キーのバイトを辺コードに変換する写像
///
/// 各バイトから`offset`を引いた値を辺コードとして用います。先頭に現れる文字を
/// `1`に寄せることで、オフセット探索で使われる範囲を狭く保てます。
/// `offset`は構築時の設定値であり、直列化されたダブル配列には保存されません。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CodeMapper {
    offset: u8,
}

impl CodeMapper {
    /// 新しい写像を作成します。
    #[inline(always)]
    pub const fn new(offset: u8) -> Self {
        Self { offset }
    }

    /// 設定されているオフセットを返します。
    #[inline(always)]
    pub const fn offset(&self) -> u8 {
        self.offset
    }

    /// バイトを辺コードに変換します。
    ///
    /// 結果が`1..=255`に収まらない場合は`None`を返します。
    #[inline(always)]
    pub const fn code(&self, byte: u8) -> Option<u8> {
        match byte.checked_sub(self.offset) {
            Some(TERMINATE_CODE) | None => None,
            Some(code) => Some(code),
        }
    }

    /// キー全体を辺コード列に変換します。
    ///
    /// # エラー
    ///
    /// 変換できないバイトが含まれる場合、[`DarrayError::InvalidKeyByte`]を返します。
    /// エラーには`key_index`がそのまま記録されます。
    pub fn codes(&self, key: &[u8], key_index: Option<usize>) -> Result<Vec<u8>> {
        key.iter()
            .enumerate()
            .map(|(position, &byte)| {
                self.code(byte)
                    .ok_or_else(|| DarrayError::invalid_key_byte(key_index, position, byte))
            })
            .collect()
    }

    /// 辺コードを元のバイトに戻します。終端コードは`None`になります。
    #[inline(always)]
    pub const fn byte(&self, code: u8) -> Option<u8> {
        if code == TERMINATE_CODE {
            None
        } else {
            code.checked_add(self.offset)
        }
    }
}
