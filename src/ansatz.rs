//! 境界条件・初期条件を構成によって厳密に満たす試行解。

use crate::error::{Error, Result};
use crate::jet::{Jet, Order};
use crate::model::Mlp;
use crate::problem::{BernoulliProblem, LaplaceProblem};
use crate::sampler;
use burn::prelude::Backend;
use burn::tensor::{Tensor, TensorData};
use ndarray::Array2;

/// 学習済み（または学習中）の試行解。任意の点で評価でき、入力に関して微分可能です。
pub trait TrialSolution<B: Backend> {
    /// 入力座標の次元。
    fn dims(&self) -> usize;

    fn device(&self) -> &B::Device;

    /// 点のバッチ `[n, dims]` での値と導関数。
    fn forward_jet(&self, points: Tensor<B, 2>, order: Order) -> Jet<B>;

    /// 点のバッチ `[n, dims]` での値 `[n, 1]`。
    fn forward(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward_jet(points, Order::Value).value
    }

    /// 入力に関する勾配 `[n, dims]`（ベクトル場の可視化用）。
    fn gradient(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        Tensor::cat(self.forward_jet(points, Order::First).first, 1)
    }

    /// 点の列（各要素が1点の座標）での値。
    fn values(&self, points: &[Vec<f64>]) -> Result<Vec<f64>> {
        let dims = self.dims();
        if let Some(bad) = points.iter().find(|p| p.len() != dims) {
            return Err(Error::size(format!(
                "expected {dims}-dimensional points, got {}",
                bad.len()
            )));
        }
        let coords = points.iter().flatten().copied().collect::<Vec<f64>>();
        let batch = Tensor::<B, 2>::from_data(
            TensorData::new(coords, [points.len(), dims]),
            self.device(),
        );
        to_vec(self.forward(batch))
    }

    /// 1点での値。
    fn value_at(&self, point: &[f64]) -> Result<f64> {
        let values = self.values(&[point.to_vec()])?;
        Ok(values[0])
    }
}

/// テンソルの要素を `f64` の列として取り出します。
pub fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f64>> {
    tensor
        .into_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .map_err(|e| Error::Data(format!("{e:?}")))
}

/// ベルヌーイ方程式の試行解 `y(x) = (x - x0) N(z(x)) + y0`。
///
/// `z(x)` は区間 `[a, b]` を `[-1, 1]` に写す1次関数で、ネットワークへの入力を
/// 活性化関数が飽和しない範囲に収めます。
/// `x0` での値はネットワークの出力によらず `y0` になります。`b` 側の条件は課しません。
#[derive(Debug, Clone)]
pub struct BernoulliSolution<B: Backend> {
    model: Mlp<B>,
    problem: BernoulliProblem,
    device: B::Device,
}

impl<B: Backend> BernoulliSolution<B> {
    pub fn new(model: Mlp<B>, problem: BernoulliProblem, device: B::Device) -> Self {
        Self {
            model,
            problem,
            device,
        }
    }

    pub fn model(&self) -> &Mlp<B> {
        &self.model
    }

    pub fn problem(&self) -> &BernoulliProblem {
        &self.problem
    }

    pub(crate) fn map_model(self, f: impl FnOnce(Mlp<B>) -> Mlp<B>) -> Self {
        Self {
            model: f(self.model),
            ..self
        }
    }

    /// `[a, b]` → `[-1, 1]`
    fn scale_input(&self, x: Jet<B>) -> Jet<B> {
        let BernoulliProblem { a, b, .. } = self.problem;
        x.mul_scalar(2.0 / (b - a)).add_scalar(-(a + b) / (b - a))
    }
}

impl<B: Backend> TrialSolution<B> for BernoulliSolution<B> {
    fn dims(&self) -> usize {
        1
    }

    fn device(&self) -> &B::Device {
        &self.device
    }

    fn forward_jet(&self, points: Tensor<B, 2>, order: Order) -> Jet<B> {
        let x = Jet::seed(points, order);
        let net = self.model.forward_jet(self.scale_input(x.clone()));
        x.add_scalar(-self.problem.x0)
            .mul(net)
            .add_scalar(self.problem.y0)
    }
}

/// ラプラス方程式の試行解 `f(x, y) = H1(x, y) + N(x, y) H2(x, y)`。
///
/// `H2 = x(1-x)y(1-y)` は4辺すべてでゼロになるため、境界上の値は
/// ネットワークの出力によらず [`LaplaceProblem::blend`] と一致します。
#[derive(Debug, Clone)]
pub struct LaplaceSolution<B: Backend> {
    model: Mlp<B>,
    problem: LaplaceProblem,
    device: B::Device,
}

impl<B: Backend> LaplaceSolution<B> {
    pub fn new(model: Mlp<B>, problem: LaplaceProblem, device: B::Device) -> Self {
        Self {
            model,
            problem,
            device,
        }
    }

    pub fn model(&self) -> &Mlp<B> {
        &self.model
    }

    pub fn problem(&self) -> &LaplaceProblem {
        &self.problem
    }

    /// [`sampler::unit_square`] の格子点での値を `n×n` の配列として返します（行番号が x）。
    pub fn grid(&self, n: usize) -> Result<Array2<f64>> {
        let points = sampler::unit_square::<B>(n, &self.device)?;
        let values = to_vec(self.forward(points))?;
        Array2::from_shape_vec((n, n), values).map_err(|e| Error::Data(e.to_string()))
    }

    pub(crate) fn map_model(self, f: impl FnOnce(Mlp<B>) -> Mlp<B>) -> Self {
        Self {
            model: f(self.model),
            ..self
        }
    }
}

impl<B: Backend> TrialSolution<B> for LaplaceSolution<B> {
    fn dims(&self) -> usize {
        2
    }

    fn device(&self) -> &B::Device {
        &self.device
    }

    fn forward_jet(&self, points: Tensor<B, 2>, order: Order) -> Jet<B> {
        let input = Jet::seed(points, order);
        let x = input.column(0);
        let y = input.column(1);
        let one_minus = |t: &Jet<B>| t.clone().neg().add_scalar(1.0);
        let LaplaceProblem { u0, u1, v0, v1 } = &self.problem;

        let h1 = one_minus(&x)
            .mul(u0.eval_jet(&y))
            .add(x.clone().mul(u1.eval_jet(&y)))
            .add(one_minus(&y).mul(v0.eval_jet(&x)))
            .add(y.clone().mul(v1.eval_jet(&x)));
        let h2 = x
            .clone()
            .mul(one_minus(&x))
            .mul(y.clone())
            .mul(one_minus(&y));

        h1.add(self.model.forward_jet(input).mul(h2))
    }
}
