//! ダブル配列のバイナリ形式
//!
//! 先頭にノード数、続いて各スロットの`base`と`check`をインデックス順に並べた
//! 固定長の形式です。整数はすべてビッグエンディアンの32ビット符号付き整数です。
//!
//! ```text
//! i32  node_count
//! node_count x (i32 base[i], i32 check[i])
//! ```
//!
//! マジックバイトやバージョン、チェックサムは含みません。

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::double_array::DoubleArray;
use crate::errors::{DarrayError, Result};

/// 1スロットあたりのバイト数。
const SLOT_BYTES: usize = 2 * std::mem::size_of::<i32>();

// Upper bound on the capacity reserved up front; a corrupted count must not allocate
// more than the stream can actually supply.
const MAX_PREALLOCATED_NODES: usize = 1 << 20;

impl DoubleArray {
    /// ダブル配列をライターに書き出します。
    ///
    /// 内部でバッファリングを行い、終了前にフラッシュします。
    ///
    /// # 例
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use darray::{DoubleArray, DoubleArrayBuilder};
    ///
    /// let da = DoubleArrayBuilder::new().build(&["ace", "cab"])?;
    ///
    /// let mut buf = vec![];
    /// da.write(&mut buf)?;
    ///
    /// let other = DoubleArray::read(buf.as_slice())?;
    /// assert_eq!(other.lookup(b"cab")?, Some(1));
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - 基礎となる`writer`への書き込みに失敗した場合(例: I/Oエラー)。
    /// - ノード数が`i32`で表現できない場合。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let mut wtr = BufWriter::new(wtr);
        let num_nodes = i32::try_from(self.num_nodes())?;
        wtr.write_all(&num_nodes.to_be_bytes())?;
        for (&base, &check) in self.base.iter().zip(&self.check) {
            wtr.write_all(&base.to_be_bytes())?;
            wtr.write_all(&check.to_be_bytes())?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// ダブル配列を直列化したバイト列を返します。
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(std::mem::size_of::<i32>() + self.num_nodes() * SLOT_BYTES);
        self.write(&mut bytes)?;
        Ok(bytes)
    }

    /// リーダーからダブル配列を読み込みます。
    ///
    /// 必要なバイト数だけを読み込み、後続のデータには触れません。内部ではバッファリングを
    /// 行わないため、ファイルから読み込む場合は`BufReader`で包んでください。
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - ノード数が負の場合([`DarrayError::InvalidFormat`])。
    /// - ストリームが途中で終わっている場合([`DarrayError::InvalidFormat`])。
    /// - その他のI/Oエラーが発生した場合。
    pub fn read<R: Read>(mut rdr: R) -> Result<Self> {
        let num_nodes = read_i32(&mut rdr, "node_count")?;
        let num_nodes = usize::try_from(num_nodes).map_err(|_| {
            DarrayError::invalid_format("node_count", format!("negative node count: {num_nodes}"))
        })?;

        let capacity = num_nodes.min(MAX_PREALLOCATED_NODES);
        let mut base = Vec::with_capacity(capacity);
        let mut check = Vec::with_capacity(capacity);
        for _ in 0..num_nodes {
            base.push(read_i32(&mut rdr, "base")?);
            check.push(read_i32(&mut rdr, "check")?);
        }
        Ok(Self::from_parts(base, check))
    }

    /// 直列化されたバイト列全体からダブル配列を復元します。
    ///
    /// # エラー
    ///
    /// [`DoubleArray::read`]のエラーに加え、末尾に余分なバイトがある場合に
    /// [`DarrayError::InvalidFormat`]を返します。
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        let da = Self::read(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(DarrayError::invalid_format(
                "bytes",
                format!("{} trailing bytes after the last slot", bytes.len()),
            ));
        }
        Ok(da)
    }

    /// ファイルをメモリマップしてダブル配列を復元します。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合、またはその内容が[`DoubleArray::from_bytes`]で
    /// 受け付けられない場合にエラーを返します。
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(DarrayError::invalid_format("path", "the file is empty"));
        }

        let mmap = unsafe { Mmap::map(&file)? };

        Self::from_bytes(&mmap)
    }
}

fn read_i32<R: Read>(rdr: &mut R, field: &'static str) -> Result<i32> {
    let mut buf = [0; 4];
    rdr.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            DarrayError::invalid_format(field, "the stream ended before the expected slot count")
        }
        _ => DarrayError::IoError(e),
    })?;
    Ok(i32::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DoubleArray {
        DoubleArray::from_parts(vec![0, 2, -1], vec![0, 0, 1])
    }

    #[test]
    fn test_layout_is_big_endian() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(
            vec![
                0, 0, 0, 3, // node_count
                0, 0, 0, 0, 0, 0, 0, 0, // slot 0
                0, 0, 0, 2, 0, 0, 0, 0, // slot 1
                0xff, 0xff, 0xff, 0xff, 0, 0, 0, 1, // slot 2
            ],
            bytes
        );
    }

    #[test]
    fn test_read_stops_after_last_slot() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.extend_from_slice(b"tail");
        let mut rdr = bytes.as_slice();
        assert_eq!(sample(), DoubleArray::read(&mut rdr).unwrap());
        assert_eq!(b"tail", rdr);
    }

    #[test]
    fn test_from_bytes_rejects_trailing_bytes() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(
            DoubleArray::from_bytes(&bytes),
            Err(DarrayError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_negative_count() {
        let bytes = (-1i32).to_be_bytes();
        assert!(matches!(
            DoubleArray::from_bytes(&bytes),
            Err(DarrayError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_truncated() {
        let bytes = sample().to_bytes().unwrap();
        for len in [0, 3, 4, 11, bytes.len() - 1] {
            assert!(
                matches!(
                    DoubleArray::from_bytes(&bytes[..len]),
                    Err(DarrayError::InvalidFormat(_))
                ),
                "len = {len}"
            );
        }
    }

    #[test]
    fn test_absurd_count_fails_without_allocating() {
        let mut bytes = i32::MAX.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[0; 16]);
        assert!(matches!(
            DoubleArray::from_bytes(&bytes),
            Err(DarrayError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_structure() {
        let da = DoubleArray::from_parts(vec![], vec![]);
        let bytes = da.to_bytes().unwrap();
        assert_eq!(vec![0, 0, 0, 0], bytes);
        let da = DoubleArray::from_bytes(&bytes).unwrap();
        assert_eq!(0, da.num_nodes());
        assert_eq!(None, da.lookup(b"a").unwrap());
    }
}
