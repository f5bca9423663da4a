//! # darray
//!
//! darrayは、ソート済みの文字列集合をその順位(識別子)に写像する、静的なダブル配列トライの実装です。
//!
//! ## 概要
//!
//! ダブル配列は、トライの遷移を`base`と`check`という2本の整数配列だけで表現します。
//! ポインタを持たないため省メモリで、ファイルへの保存と読み込みも配列をそのまま
//! 書き出すだけで済みます。形態素解析辞書のような、一度構築したら変更しない
//! 検索表に向いています。
//!
//! ## 主な機能
//!
//! - **構築**: ソート済みで重複のないキー列から [`DoubleArray`] を構築 ([`DoubleArrayBuilder`])
//! - **検索**: キー長に比例する時間での完全一致検索
//! - **直列化**: ビッグエンディアンの固定長形式での保存と読み込み、メモリマップによる読み込み
//! - **ゼロコピー**: rkyvアーカイブからの直接検索
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use darray::{DoubleArray, DoubleArrayBuilder};
//!
//! let keys = ["ace", "ad", "ade", "cab", "dab", "dad"];
//! let da = DoubleArrayBuilder::new().build(&keys)?;
//!
//! assert_eq!(da.lookup(b"ace")?, Some(0));
//! assert_eq!(da.lookup(b"cab")?, Some(3));
//! assert_eq!(da.lookup(b"da")?, None);
//!
//! let mut buf = vec![];
//! da.write(&mut buf)?;
//! let da = DoubleArray::read(buf.as_slice())?;
//! assert_eq!(da.lookup(b"dad")?, Some(5));
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// ダブル配列のビルダー
pub mod builder;

/// ノードIDと辺コードの共通定義
pub mod code;

/// 構築済みのダブル配列
pub mod double_array;

/// エラー型の定義
pub mod errors;


// Re-exports
pub use builder::{BuildObserver, DoubleArrayBuilder, EdgeEvent, NoopObserver};
pub use double_array::{ArchivedDoubleArray, DoubleArray, Slot};
pub use errors::DarrayError;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
