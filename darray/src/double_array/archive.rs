//! rkyvによるゼロコピーアクセス
//!
//! ビッグエンディアンの互換形式とは別に、rkyvのアーカイブ形式でダブル配列を保存し、
//! 復元せずにそのまま検索できるようにします。

use rkyv::rancor::Error;
use rkyv::util::AlignedVec;

use crate::code::CodeMapper;
use crate::double_array::{lookup_in, traverse, ArchivedDoubleArray, DoubleArray};
use crate::errors::Result;

impl DoubleArray {
    /// rkyv形式のバイト列にシリアライズします。
    pub fn to_archive(&self) -> Result<AlignedVec> {
        Ok(rkyv::to_bytes::<Error>(self)?)
    }

    /// rkyv形式のバイト列を検証し、アーカイブされたダブル配列への参照を返します。
    ///
    /// `bytes`はアーカイブの配置要件(16バイト境界)を満たしている必要があります。
    ///
    /// # エラー
    ///
    /// バイト列がアーカイブとして妥当でない場合にエラーを返します。
    pub fn access(bytes: &[u8]) -> Result<&ArchivedDoubleArray> {
        Ok(rkyv::access::<ArchivedDoubleArray, Error>(bytes)?)
    }
}

impl ArchivedDoubleArray {
    /// キーを検索し、その識別子を返します(アーカイブ版)。
    #[inline]
    pub fn lookup(&self, key: &[u8]) -> Result<Option<u32>> {
        lookup_in(&self.base, &self.check, key, CodeMapper::default())
    }

    /// 構築時と同じオフセットで変換してから検索します(アーカイブ版)。
    #[inline]
    pub fn lookup_with_offset(&self, key: &[u8], code_offset: u8) -> Result<Option<u32>> {
        lookup_in(&self.base, &self.check, key, CodeMapper::new(code_offset))
    }

    /// 変換済みの辺コード列で検索します(アーカイブ版)。
    #[inline]
    pub fn lookup_codes<I>(&self, codes: I) -> Option<u32>
    where
        I: IntoIterator<Item = u8>,
    {
        traverse(&self.base, &self.check, codes)
    }

    /// ノード数を返します。
    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.base.len()
    }

    /// 所有権を持つ[`DoubleArray`]に復元します。
    pub fn to_native(&self) -> Result<DoubleArray> {
        Ok(rkyv::deserialize::<DoubleArray, Error>(self)?)
    }
}
