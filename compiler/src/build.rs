//! ダブル配列ファイルのビルドモジュール
//!
//! 1行1キーの単語リストを読み込み、整列・重複除去したうえでダブル配列を構築し、
//! ビッグエンディアン形式(任意でzstd圧縮)のファイルに書き出します。

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use darray::builder::DEFAULT_INITIAL_CAPACITY;
use darray::{BuildObserver, DarrayError, DoubleArrayBuilder};

use clap::Parser;
use tempfile::NamedTempFile;

/// ビルドコマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "build", about = "A program to build a double-array trie from a word list.")]
pub struct Args {
    /// Word list with one key per line. Reads stdin if omitted.
    #[clap(short = 'i', long)]
    input: Option<PathBuf>,

    /// File to which the double array is output.
    #[clap(short = 'o', long)]
    output: PathBuf,

    /// Value subtracted from every key byte to obtain its edge code.
    #[clap(long, default_value = "0")]
    code_offset: u8,

    /// Initial number of slots reserved before construction.
    #[clap(long, default_value_t = DEFAULT_INITIAL_CAPACITY)]
    initial_capacity: usize,

    /// Compresses the output with zstd.
    #[clap(long)]
    zstd: bool,

    /// Ignores empty lines instead of registering the empty key.
    #[clap(long)]
    skip_empty: bool,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 入力にキーが1つもない
    #[error("No keys were read from the input")]
    EmptyInput,

    /// 出力先のパスが不正
    #[error("Invalid output path: {0}")]
    InvalidOutput(PathBuf),

    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 一時ファイルの確定に失敗
    #[error("Failed to persist the output file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// ダブル配列の構築エラー
    #[error("Double-array building failed: {0}")]
    Darray(#[from] DarrayError),
}

/// 1割ごとに`10%..`を標準エラー出力に表示する観測者
struct Progress<W> {
    wtr: W,
}

impl<W: Write> BuildObserver for Progress<W> {
    fn on_progress(&mut self, assigned: usize, total: usize) {
        let percent = assigned * 100 / total.max(1);
        // Progress output is best-effort.
        let _ = write!(self.wtr, "{}%..", percent / 10 * 10);
        let _ = self.wtr.flush();
    }
}

/// ビルドコマンドを実行する
///
/// # エラー
///
/// 入力の読み込み、構築、出力の書き込みのいずれかに失敗した場合、`BuildError`を返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    let keys = match &args.input {
        Some(path) => read_keys(BufReader::new(File::open(path)?), args.skip_empty)?,
        None => read_keys(io::stdin().lock(), args.skip_empty)?,
    };
    if keys.is_empty() {
        return Err(BuildError::EmptyInput);
    }
    println!("Read {} unique keys", keys.len());

    let builder = DoubleArrayBuilder::new()
        .code_offset(args.code_offset)
        .initial_capacity(args.initial_capacity);

    eprint!("Building the double array...");
    let start = Instant::now();
    let mut progress = Progress { wtr: io::stderr() };
    let da = builder.build_with_observer(&keys, &mut progress)?;
    let elapsed = start.elapsed();
    eprintln!();

    println!("nodes: {}", da.num_nodes());
    println!("size: {:.3} MB", da.byte_size() as f64 / (1024.0 * 1024.0));
    println!("elapsed: {:.3} sec", elapsed.as_secs_f64());

    println!("Writing the double array...");
    let tmp = temp_file_beside(&args.output)?;
    if args.zstd {
        let mut encoder = zstd::Encoder::new(tmp.as_file(), 19)?;
        da.write(&mut encoder)?;
        encoder.finish()?;
    } else {
        da.write(tmp.as_file())?;
    }
    tmp.persist(&args.output)?;

    println!("Successfully built the double array to {}", args.output.display());
    Ok(())
}

/// 1行1キーで読み込み、整列・重複除去したキー列を返します。
///
/// 行末の`\n`と`\r\n`は取り除きます。
fn read_keys<R: Read>(rdr: R, skip_empty: bool) -> io::Result<Vec<Vec<u8>>> {
    let mut keys = BTreeSet::new();
    for line in BufReader::new(rdr).split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if skip_empty && line.is_empty() {
            continue;
        }
        keys.insert(line);
    }
    Ok(keys.into_iter().collect())
}

/// 出力先と同じディレクトリに一時ファイルを作ります。
///
/// `persist`がファイルシステムをまたがないようにするためです。
fn temp_file_beside(output: &Path) -> Result<NamedTempFile, BuildError> {
    if output.file_name().is_none() {
        return Err(BuildError::InvalidOutput(output.to_path_buf()));
    }
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}
