//! ダブル配列コンパイラのメインエントリーポイント
//!
//! 単語リストからダブル配列ファイルを構築する`build`と、構築済みファイルの
//! 中身を確認する`dump`の2つのサブコマンドを提供します。
//!
//! 診断ログは`RUST_LOG`で制御します(例: `RUST_LOG=darray=trace`)。

mod build;
mod dump;

use clap::Parser;
use thiserror::Error;

use crate::{build::BuildError, dump::DumpError};

/// コマンドライン引数の構造体
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// 単語リストからダブル配列ファイルを構築します
    ///
    /// 入力の各行を1つのキーとして扱い、整列と重複除去を行ってから構築します。
    Build(build::Args),

    /// ダブル配列ファイルの統計情報とスロットの内容を表示します
    Dump(dump::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
#[derive(Debug, Error)]
pub enum CompileError {
    /// 構築中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
    /// ダンプ中のエラー
    #[error(transparent)]
    DumpError(#[from] DumpError),
}

fn main() -> Result<(), CompileError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Dump(args) => Ok(dump::run(args)?),
    }
}
