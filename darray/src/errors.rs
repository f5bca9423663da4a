//! エラー型の定義
//!
//! このモジュールは、darrayライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt::{self, Debug};

/// darray専用のResult型
///
/// エラー型としてデフォルトで[`DarrayError`]を使用します。
pub type Result<T, E = DarrayError> = std::result::Result<T, E>;

/// darrayのエラー型
///
/// 入力の誤り(順序違反、無効なバイト、壊れたファイル)と、
/// 構築アルゴリズム内部の不整合([`DarrayError::InvalidState`])を区別します。
#[derive(Debug, thiserror::Error)]
pub enum DarrayError {
    /// キーの順序違反エラー
    ///
    /// [`OrderingViolationError`]のエラーバリアント。
    /// キー列が厳密に昇順でない(未ソートまたは重複)場合に発生します。
    #[error(transparent)]
    OrderingViolation(OrderingViolationError),

    /// 無効なキーバイトエラー
    ///
    /// [`InvalidKeyByteError`]のエラーバリアント。
    #[error(transparent)]
    InvalidKeyByte(InvalidKeyByteError),

    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    /// 直列化されたストリームが途中で切れている、または壊れている場合に発生します。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    /// 構築アルゴリズムの内部不変条件が破れたことを示します。
    /// 入力を直しても解消しないため、再試行すべきではありません。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 整数変換エラー
    ///
    /// [`TryFromIntError`](std::num::TryFromIntError)のエラーバリアント。
    #[error(transparent)]
    TryFromInt(std::num::TryFromIntError),

    /// I/Oエラー
    ///
    /// [`std::io::Error`](std::io::Error)のエラーバリアント。
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// rkyvシリアライゼーションエラー
    ///
    /// [`rkyv::rancor::Error`](rkyv::rancor::Error)のエラーバリアント。
    #[error(transparent)]
    RkyvError(#[from] rkyv::rancor::Error),
}

impl DarrayError {
    /// 順序違反エラーを生成します
    ///
    /// # 引数
    ///
    /// * `index` - 違反したキーの位置
    /// * `prev` - 直前のキー
    /// * `key` - 違反したキー
    pub(crate) fn ordering_violation(index: usize, prev: &[u8], key: &[u8]) -> Self {
        Self::OrderingViolation(OrderingViolationError {
            index,
            prev: prev.to_vec(),
            key: key.to_vec(),
        })
    }

    /// 無効なキーバイトエラーを生成します
    ///
    /// # 引数
    ///
    /// * `key_index` - 構築時はキーの位置、検索時は`None`
    /// * `position` - キー内のバイト位置
    /// * `byte` - 問題のバイト値
    pub(crate) const fn invalid_key_byte(key_index: Option<usize>, position: usize, byte: u8) -> Self {
        Self::InvalidKeyByte(InvalidKeyByteError {
            key_index,
            position,
            byte,
        })
    }

    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }

    /// 内部不変条件の破れ(アルゴリズムのバグ)を表すエラーかどうかを返します。
    ///
    /// 入力の誤りによるエラーでは`false`を返します。
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

/// キーが厳密な昇順になっていない場合に使用されるエラー
#[derive(Debug)]
pub struct OrderingViolationError {
    /// 違反したキーの位置(0始まり)
    pub(crate) index: usize,

    /// 直前のキー
    pub(crate) prev: Vec<u8>,

    /// 違反したキー
    pub(crate) key: Vec<u8>,
}

impl OrderingViolationError {
    /// 違反したキーの位置を返します。
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for OrderingViolationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "OrderingViolationError: keys must be sorted without duplicates: {:?} >= {:?}, at index {}",
            String::from_utf8_lossy(&self.prev),
            String::from_utf8_lossy(&self.key),
            self.index,
        )
    }
}

impl Error for OrderingViolationError {}

/// 辺コードとして表現できないバイトが現れた場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidKeyByteError {
    /// キーの位置(検索時は`None`)
    pub(crate) key_index: Option<usize>,

    /// キー内のバイト位置
    pub(crate) position: usize,

    /// 問題のバイト値
    pub(crate) byte: u8,
}

impl InvalidKeyByteError {
    /// 問題のバイト値を返します。
    pub const fn byte(&self) -> u8 {
        self.byte
    }

    /// キー内のバイト位置を返します。
    pub const fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for InvalidKeyByteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.key_index {
            Some(index) => write!(
                f,
                "InvalidKeyByteError: byte {:#04x} at position {} of key {} is not a valid edge code",
                self.byte, self.position, index,
            ),
            None => write!(
                f,
                "InvalidKeyByteError: byte {:#04x} at position {} is not a valid edge code",
                self.byte, self.position,
            ),
        }
    }
}

impl Error for InvalidKeyByteError {}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

impl From<std::num::TryFromIntError> for DarrayError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}
