use crate::model::Activation;
use crate::training::TrainingConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// clapでコマンドラインの構造を定義します。
#[derive(Parser, Debug)]
#[command(author, version, about = "Physics-Informed Neural Networks for differential equations with Burn", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 解く方程式ごとのサブコマンド。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// ベルヌーイ方程式を PINN とオイラー法で解き、厳密解と比較します
    Bernoulli(BernoulliArgs),
    /// 単位正方形上のラプラス方程式を PINN とガウス・ザイデル法で解きます
    Laplace(LaplaceArgs),
}

/// 両方のサブコマンドに共通する学習の設定。
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// エポック数（省略時は方程式ごとの既定値）
    #[arg(long)]
    pub epochs: Option<usize>,
    /// コロケーション点の数（ODE）またはミニバッチの大きさ（PDE）
    #[arg(long)]
    pub batch_size: Option<usize>,
    #[arg(long)]
    pub learning_rate: Option<f64>,
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// 損失を表示する間隔（エポック）
    #[arg(long, default_value_t = 200)]
    pub log_every: usize,
    /// グラフの出力先ディレクトリ
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl TrainArgs {
    /// コマンドラインで指定された値でプリセットを上書きします。
    pub fn apply(&self, mut config: TrainingConfig) -> TrainingConfig {
        if let Some(epochs) = self.epochs {
            config.num_epochs = epochs;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        config.seed = self.seed;
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct BernoulliArgs {
    #[command(flatten)]
    pub train: TrainArgs,
    /// コロケーション点を等間隔ではなく一様乱数で生成します
    #[arg(long)]
    pub random_collocation: bool,
    /// 隠れ層の活性化関数を tanh ではなく Leaky ReLU にします
    #[arg(long)]
    pub leaky_relu: bool,
}

impl BernoulliArgs {
    /// ベルヌーイ方程式用のプリセットにコマンドラインの指定を反映します。
    pub fn config(&self) -> TrainingConfig {
        let mut config = self
            .train
            .apply(TrainingConfig::bernoulli())
            .with_random_collocation(self.random_collocation);
        if self.leaky_relu {
            config.model.activation = Activation::leaky_relu();
        }
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct LaplaceArgs {
    #[command(flatten)]
    pub train: TrainArgs,
    /// 1辺あたりの格子点数（コロケーション点と参照解で共通）
    #[arg(long, default_value_t = 20)]
    pub grid: usize,
    /// 指定すると、このディレクトリに学習途中のヒートマップを保存します
    #[arg(long)]
    pub frames: Option<PathBuf>,
    /// フレームを保存する間隔（エポック）
    #[arg(long, default_value_t = 10)]
    pub frame_every: usize,
}
