use crate::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bbox-annotate")]
#[command(about = "矩形アノテーションの読み込み・変換・集計ツール (CSV / COCO JSON)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// データセットのサブディレクトリから画像を読み込む
    Scan {
        /// データセットのベースパス
        #[arg(required = true)]
        base: PathBuf,

        /// 読み込むサブディレクトリ（ベースからの相対、複数指定可）
        #[arg(short, long = "subdir", required = true)]
        subdirs: Vec<String>,

        /// 画像一覧の出力先（省略時は出力しない）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (csv/coco)
        #[arg(short, long, default_value = "coco")]
        format: ExportFormat,
    },

    /// COCO JSONを読み込んで CSV / COCO へ書き出す
    Convert {
        /// 入力COCO JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 画像の探索基準ディレクトリ（省略時はJSONと同じ場所）
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// 出力形式 (csv/coco)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: PathBuf,

        /// file_name をファイル名だけにする（相対パスを使わない）
        #[arg(long)]
        flatten: bool,
    },

    /// 複数のCOCO JSONを1つにまとめる
    Merge {
        /// 入力COCO JSONファイル
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 画像の探索基準ディレクトリ（省略時は各JSONと同じ場所）
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// 出力COCO JSONファイル
        #[arg(short, long)]
        output: PathBuf,
    },

    /// COCO JSONの集計を表示
    Stats {
        /// 入力COCO JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 画像の探索基準ディレクトリ
        #[arg(short, long)]
        images: Option<PathBuf>,
    },

    /// 既定のラベル語彙を表示/編集
    Labels {
        /// ラベルを追加 (ID=NAME、複数指定可)
        #[arg(long)]
        add: Vec<String>,

        /// 対話的にラベルを追加
        #[arg(short, long)]
        interactive: bool,

        /// すべて削除
        #[arg(long)]
        clear: bool,

        /// ラベルを表示
        #[arg(long)]
        show: bool,
    },
}
