//! ダブル配列からキーを検索するユーティリティ
//!
//! 標準入力の各行をキーとして検索し、見つかれば識別子を、見つからなければ
//! `NOT_FOUND`を1行ずつ出力します。

use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use darray::DoubleArray;

use clap::Parser;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "lookup", about = "Looks up keys in a double-array trie")]
struct Args {
    /// Double-array file (`.zst` files are decompressed).
    #[clap(short = 'i', long)]
    input: PathBuf,

    /// Code offset the double array was built with.
    #[clap(long, default_value = "0")]
    code_offset: u8,
}

fn load(path: &Path) -> Result<DoubleArray, darray::DarrayError> {
    if path.extension().is_some_and(|ext| ext == "zst") {
        let decoder = zstd::Decoder::new(File::open(path)?)?;
        DoubleArray::read(BufReader::new(decoder))
    } else {
        DoubleArray::from_path(path)
    }
}

/// 1行分の検索結果を書き出します。
///
/// 検索できないバイトを含むキーは見つからないものとして扱います。
fn answer<W: Write>(out: &mut W, da: &DoubleArray, key: &[u8], code_offset: u8) -> std::io::Result<()> {
    match da.lookup_with_offset(key, code_offset) {
        Ok(Some(id)) => writeln!(out, "{id}"),
        Ok(None) => out.write_all(b"NOT_FOUND\n"),
        Err(e) => {
            tracing::debug!(error = %e, "unsearchable key");
            out.write_all(b"NOT_FOUND\n")
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    eprintln!("Loading the double array...");
    let da = load(&args.input)?;
    eprintln!("Ready to look up {} slots", da.num_nodes());

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    for line in std::io::stdin().lock().split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        answer(&mut out, &da, &line, args.code_offset)?;
    }
    out.flush()?;

    Ok(())
}
