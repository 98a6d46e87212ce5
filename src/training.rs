use crate::ansatz::{BernoulliSolution, LaplaceSolution};
use crate::error::Error;
use crate::model::{Mlp, MlpConfig};
use crate::pinn::{bernoulli_loss, laplace_loss};
use crate::problem::{BernoulliProblem, LaplaceProblem};
use crate::sampler;
use burn::config::Config;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};

/// 学習のハイパーパラメータ。
#[derive(Config)]
pub struct TrainingConfig {
    pub model: MlpConfig,
    pub optimizer: AdamConfig,
    #[config(default = 4000)]
    pub num_epochs: usize,
    /// ODE では1エポックごとに生成する点の数、PDE ではミニバッチの大きさ
    #[config(default = 1000)]
    pub batch_size: usize,
    #[config(default = 1e-3)]
    pub learning_rate: f64,
    #[config(default = 42)]
    pub seed: u64,
    /// ODE のコロケーション点を等間隔ではなく一様乱数で生成する
    #[config(default = false)]
    pub random_collocation: bool,
}

impl TrainingConfig {
    /// ベルヌーイ方程式用: 4000エポック、1エポックあたり1000点。
    pub fn bernoulli() -> Self {
        Self::new(MlpConfig::bernoulli(), AdamConfig::new())
    }

    /// ラプラス方程式用: 150エポック、ミニバッチ100点。
    pub fn laplace() -> Self {
        Self::new(MlpConfig::laplace(), AdamConfig::new())
            .with_num_epochs(150)
            .with_batch_size(100)
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.model.validate()?;
        if self.num_epochs == 0 || self.batch_size == 0 {
            return Err(Error::size("epochs and batch size must be positive"));
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::domain(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    fn check_input(&self, dims: usize) -> crate::Result<()> {
        if self.model.input != dims {
            return Err(Error::size(format!(
                "model takes {} input coordinates, problem has {dims}",
                self.model.input
            )));
        }
        Ok(())
    }
}

/// 1エポック分の損失の記録。追記のみ可能です。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossHistory(Vec<f32>);

impl LossHistory {
    pub(crate) fn push(&mut self, loss: f32) {
        self.0.push(loss);
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<f32> {
        self.0.last().copied()
    }

    /// 先頭 `fraction` の割合（最低1件）の平均。
    pub fn leading_mean(&self, fraction: f64) -> Option<f32> {
        let count = self.window(fraction)?;
        Some(mean(&self.0[..count]))
    }

    /// 末尾 `fraction` の割合（最低1件）の平均。
    pub fn trailing_mean(&self, fraction: f64) -> Option<f32> {
        let count = self.window(fraction)?;
        Some(mean(&self.0[self.0.len() - count..]))
    }

    fn window(&self, fraction: f64) -> Option<usize> {
        if self.0.is_empty() {
            return None;
        }
        let count = (self.0.len() as f64 * fraction).ceil() as usize;
        Some(count.clamp(1, self.0.len()))
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// 各エポック終了時に観測者へ渡される情報。
pub struct Epoch<'a, S, B: Backend> {
    /// 1から始まるエポック番号
    pub index: usize,
    pub loss: f32,
    pub solution: &'a S,
    /// このエポックで使ったコロケーション点
    pub domain: &'a Tensor<B, 2>,
}

/// 学習ループから各エポックの後に呼び出されるフック。
///
/// 可視化や進捗表示はここに実装し、学習ロジックからは切り離します。
pub trait TrainingObserver<S, B: Backend> {
    fn observe(&mut self, epoch: &Epoch<'_, S, B>);
}

impl<S, B: Backend, F> TrainingObserver<S, B> for F
where
    F: FnMut(&Epoch<'_, S, B>),
{
    fn observe(&mut self, epoch: &Epoch<'_, S, B>) {
        self(epoch)
    }
}

/// 何もしない観測者。
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl<S, B: Backend> TrainingObserver<S, B> for Silent {
    fn observe(&mut self, _epoch: &Epoch<'_, S, B>) {}
}

/// `every` エポックごとに損失を表示する観測者。
#[derive(Debug, Clone, Copy)]
pub struct ProgressLogger {
    every: usize,
}

impl ProgressLogger {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl<S, B: Backend> TrainingObserver<S, B> for ProgressLogger {
    fn observe(&mut self, epoch: &Epoch<'_, S, B>) {
        if epoch.index % self.every == 0 {
            println!("[Epoch {}] Loss: {:.6}", epoch.index, epoch.loss);
        }
    }
}

/// ベルヌーイ方程式の PINN を学習します。
///
/// 各エポックで `[a, b]` 上に `batch_size` 点を生成し、1回だけ最適化ステップを行います。
pub fn train_bernoulli<B: AutodiffBackend>(
    problem: &BernoulliProblem,
    config: &TrainingConfig,
    device: &B::Device,
    observer: &mut impl TrainingObserver<BernoulliSolution<B>, B>,
) -> crate::Result<(BernoulliSolution<B>, LossHistory)> {
    problem.validate()?;
    config.validate()?;
    config.check_input(1)?;

    B::seed(config.seed);
    let mut rng = sampler::seeded_rng(config.seed);
    let mut solution =
        BernoulliSolution::new(config.model.init::<B>(device), problem.clone(), device.clone());
    let mut optim = config.optimizer.init::<B, Mlp<B>>();
    let mut history = LossHistory::default();

    for epoch in 1..=config.num_epochs {
        let x = if config.random_collocation {
            sampler::uniform(problem.a, problem.b, config.batch_size, &mut rng, device)?
        } else {
            sampler::linspace(problem.a, problem.b, config.batch_size, device)?
        };

        let loss = bernoulli_loss(&solution, x.clone());
        let loss_value = finite_loss(epoch, &loss)?;

        let grads = GradientsParams::from_grads(loss.backward(), solution.model());
        solution = solution.map_model(|model| optim.step(config.learning_rate, model, grads));
        history.push(loss_value);

        observer.observe(&Epoch {
            index: epoch,
            loss: loss_value,
            solution: &solution,
            domain: &x,
        });
    }

    Ok((solution, history))
}

/// ラプラス方程式の PINN を学習します。
///
/// `points` は固定のコロケーション点 `[m, 2]` です。各エポックで先頭から
/// `batch_size` 点ずつのミニバッチに分けて最適化し、ミニバッチ損失の平均を記録します。
pub fn train_laplace<B: AutodiffBackend>(
    problem: &LaplaceProblem,
    points: Tensor<B, 2>,
    config: &TrainingConfig,
    observer: &mut impl TrainingObserver<LaplaceSolution<B>, B>,
) -> crate::Result<(LaplaceSolution<B>, LossHistory)> {
    config.validate()?;
    config.check_input(2)?;
    let [count, dims] = points.dims();
    if dims != 2 || count == 0 {
        return Err(Error::size(format!(
            "expected a non-empty [m, 2] point set, got [{count}, {dims}]"
        )));
    }

    let device = points.device();
    B::seed(config.seed);
    let mut solution =
        LaplaceSolution::new(config.model.init::<B>(&device), problem.clone(), device.clone());
    let mut optim = config.optimizer.init::<B, Mlp<B>>();
    let mut history = LossHistory::default();

    for epoch in 1..=config.num_epochs {
        let mut total = 0.0;
        let mut batches = 0;

        for start in (0..count).step_by(config.batch_size) {
            let end = (start + config.batch_size).min(count);
            let batch = points.clone().slice([start..end, 0..2]);

            let loss = laplace_loss(&solution, batch);
            total += finite_loss(epoch, &loss)?;
            batches += 1;

            let grads = GradientsParams::from_grads(loss.backward(), solution.model());
            solution = solution.map_model(|model| optim.step(config.learning_rate, model, grads));
        }

        let loss_value = total / batches as f32;
        history.push(loss_value);

        observer.observe(&Epoch {
            index: epoch,
            loss: loss_value,
            solution: &solution,
            domain: &points,
        });
    }

    Ok((solution, history))
}

fn finite_loss<B: Backend>(epoch: usize, loss: &Tensor<B, 1>) -> crate::Result<f32> {
    let value: f32 = loss.clone().into_scalar().elem();
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::Diverged { epoch, loss: value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_follow_documented_schedules() {
        let ode = TrainingConfig::bernoulli();
        assert_eq!(ode.num_epochs, 4000);
        assert_eq!(ode.batch_size, 1000);
        assert_eq!(ode.learning_rate, 1e-3);
        let pde = TrainingConfig::laplace();
        assert_eq!(pde.num_epochs, 150);
        assert_eq!(pde.batch_size, 100);
        assert_eq!(pde.model.input, 2);
    }

    #[test]
    fn rejects_empty_schedules() {
        let config = TrainingConfig::laplace().with_batch_size(0);
        assert!(matches!(config.validate(), Err(Error::Size(_))));
        let config = TrainingConfig::laplace().with_learning_rate(0.0);
        assert!(matches!(config.validate(), Err(Error::Domain(_))));
    }

    #[test]
    fn rejects_network_without_hidden_layers() {
        let config = TrainingConfig::new(
            MlpConfig::bernoulli().with_hidden_layers(0),
            AdamConfig::new(),
        );
        assert!(matches!(config.validate(), Err(Error::Size(_))));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = TrainingConfig::laplace().with_seed(7);
        let loaded = TrainingConfig::load_binary(config.to_string().as_bytes()).unwrap();
        assert_eq!(loaded.seed, 7);
        assert_eq!(loaded.num_epochs, 150);
        assert_eq!(loaded.batch_size, 100);
        assert_eq!(loaded.model.activation, crate::model::Activation::Tanh);
    }

    #[test]
    fn history_windows() {
        let mut history = LossHistory::default();
        assert_eq!(history.leading_mean(0.1), None);
        for v in [4.0, 3.0, 2.0, 1.0] {
            history.push(v);
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.leading_mean(0.1), Some(4.0));
        assert_eq!(history.trailing_mean(0.5), Some(1.5));
        assert_eq!(history.last(), Some(1.0));
    }
}
