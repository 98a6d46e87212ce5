//! # 物理情報ニューラルネットワーク (PINN) サンプルプログラム
//!
//! `burn` フレームワークを使用して、物理情報ニューラルネットワーク（PINN）で
//! ベルヌーイ方程式とラプラス方程式を解き、古典的な数値解法と比較します。
//!
//! ## 使い方
//!
//! ### ベルヌーイ方程式
//! ```bash
//! cargo run --release -- bernoulli
//! ```
//!
//! ### ラプラス方程式
//! ```bash
//! cargo run --release -- laplace --grid 20 --frames frames
//! ```

use clap::Parser;
use pinn_de::cli::{Cli, Commands};
use pinn_de::commands::{run_bernoulli, run_laplace};

/// プログラムのエントリーポイント。
///
/// コマンドライン引数を解析し、`bernoulli`または`laplace`の処理に振り分けます。
fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Bernoulli(args) => run_bernoulli(args),
        Commands::Laplace(args) => run_laplace(args),
    };

    if let Err(e) = result {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}
