//! ダブル配列ファイルのダンプモジュール
//!
//! 構築済みのファイルを読み込み、ノード数や使用率などの統計と、
//! 必要に応じてスロットごとの分類を表示します。

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use darray::{DarrayError, DoubleArray, Slot};

use clap::Parser;

/// ダンプコマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "dump", about = "A program to inspect a double-array trie file.")]
pub struct Args {
    /// Double-array file (`.zst` files are decompressed).
    #[clap(short = 'i', long)]
    input: PathBuf,

    /// Prints every slot with its role.
    #[clap(long)]
    slots: bool,
}

/// ダンプ処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// ダブル配列の読み込みエラー
    #[error("Failed to load the double array: {0}")]
    Darray(#[from] DarrayError),
}

/// スロットの種類ごとの個数
#[derive(Debug, Default, PartialEq, Eq)]
struct Stats {
    nodes: usize,
    terminals: usize,
    free: usize,
}

impl Stats {
    fn collect(da: &DoubleArray) -> Self {
        let mut stats = Self::default();
        for (_, slot) in da.slots() {
            match slot {
                Slot::Null => {}
                Slot::Root { .. } | Slot::Node { .. } => stats.nodes += 1,
                Slot::Terminal { .. } => stats.terminals += 1,
                Slot::Free { .. } => stats.free += 1,
            }
        }
        stats
    }
}

/// ダンプコマンドを実行する
pub fn run(args: Args) -> Result<(), DumpError> {
    let da = load(&args.input)?;
    let stats = Stats::collect(&da);

    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    writeln!(out, "slots: {}", da.num_nodes())?;
    writeln!(out, "keys: {}", stats.terminals)?;
    writeln!(out, "internal nodes: {}", stats.nodes)?;
    writeln!(out, "free slots: {}", stats.free)?;
    if da.num_nodes() > 0 {
        let used = da.num_nodes() - stats.free;
        writeln!(out, "fill rate: {:.2}%", used as f64 * 100.0 / da.num_nodes() as f64)?;
    }
    writeln!(out, "size: {:.3} MB", da.byte_size() as f64 / (1024.0 * 1024.0))?;

    if args.slots {
        for (index, slot) in da.slots() {
            write_slot(&mut out, index, slot)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// 拡張子が`.zst`ならzstdを展開し、それ以外はメモリマップで読み込みます。
pub fn load(path: &Path) -> Result<DoubleArray, DarrayError> {
    if path.extension().is_some_and(|ext| ext == "zst") {
        let decoder = zstd::Decoder::new(File::open(path)?)?;
        DoubleArray::read(BufReader::new(decoder))
    } else {
        DoubleArray::from_path(path)
    }
}

fn write_slot<W: Write>(out: &mut W, index: usize, slot: Slot) -> io::Result<()> {
    match slot {
        Slot::Null => writeln!(out, "{index}\tnull"),
        Slot::Root { base } => writeln!(out, "{index}\troot\tbase={base}"),
        Slot::Node { parent, base } => writeln!(out, "{index}\tnode\tparent={parent}\tbase={base}"),
        Slot::Terminal { parent, id } => writeln!(out, "{index}\tterminal\tparent={parent}\tid={id}"),
        Slot::Free { next, prev } => writeln!(out, "{index}\tfree\tnext={next}\tprev={prev}"),
    }
}
