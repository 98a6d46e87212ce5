//! 学習結果の検証: 差分法による残差の再計算と誤差の指標。
//!
//! [`Jet`](crate::jet::Jet) で求めた残差と差分法で求めた残差が食い違う場合、
//! 導関数の計算がどこかで壊れています。

use crate::ansatz::{BernoulliSolution, LaplaceSolution, TrialSolution, to_vec};
use crate::error::Result;
use crate::numdiff;
use crate::pinn::{bernoulli_residual, laplace_residual};
use crate::sampler;
use burn::prelude::Backend;
use burn::tensor::{Tensor, TensorData};
use ndarray::Array2;

/// 差分法で計算したベルヌーイ方程式の残差。
pub fn bernoulli_residual_by_differences<B: Backend>(
    solution: &BernoulliSolution<B>,
    xs: &[f64],
    h: f64,
) -> Result<Vec<f64>> {
    let problem = solution.problem();
    let f = |p: &[f64]| solution.value_at(p);
    xs.iter()
        .map(|&x| {
            let y = f(&[x])?;
            let dy = numdiff::gradient(f, &[x], Some(h))?[0];
            Ok(dy + problem.p.eval(x) * y - problem.q.eval(x) * y.powf(problem.n))
        })
        .collect()
}

/// 差分法で計算したラプラシアン。
pub fn laplace_residual_by_differences<B: Backend>(
    solution: &LaplaceSolution<B>,
    points: &[[f64; 2]],
    h: f64,
) -> Result<Vec<f64>> {
    let f = |p: &[f64]| solution.value_at(p);
    points
        .iter()
        .map(|p| numdiff::laplacian(f, p, h))
        .collect()
}

/// 自動微分による残差と差分法による残差の最大の差（ベルヌーイ方程式）。
pub fn bernoulli_residual_gap<B: Backend>(
    solution: &BernoulliSolution<B>,
    xs: &[f64],
    h: f64,
) -> Result<f64> {
    let x = sampler::column::<B>(xs, solution.device());
    let exact = to_vec(bernoulli_residual(solution, x))?;
    let approx = bernoulli_residual_by_differences(solution, xs, h)?;
    Ok(max_abs_difference(&exact, &approx))
}

/// 自動微分による残差と差分法による残差の最大の差（ラプラス方程式）。
pub fn laplace_residual_gap<B: Backend>(
    solution: &LaplaceSolution<B>,
    points: &[[f64; 2]],
    h: f64,
) -> Result<f64> {
    let coords = points.iter().flatten().copied().collect::<Vec<f64>>();
    let batch = Tensor::<B, 2>::from_data(
        TensorData::new(coords, [points.len(), 2]),
        solution.device(),
    );
    let exact = to_vec(laplace_residual(solution, batch))?;
    let approx = laplace_residual_by_differences(solution, points, h)?;
    Ok(max_abs_difference(&exact, &approx))
}

/// 平均絶対誤差。
pub fn mean_absolute_error(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    a.iter().zip(b).map(|(a, b)| (a - b).abs()).sum::<f64>() / n as f64
}

/// 内部セル（境界を除く）の平均絶対誤差。
pub fn interior_mean_absolute_error(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    let (rows, cols) = a.dim();
    let mut total = 0.0;
    let mut count = 0;
    for i in 1..rows.saturating_sub(1) {
        for j in 1..cols.saturating_sub(1) {
            total += (a[[i, j]] - b[[i, j]]).abs();
            count += 1;
        }
    }
    if count == 0 { 0.0 } else { total / count as f64 }
}

/// 差の絶対値の最大。どちらかに NaN があれば NaN を返します。
pub fn max_abs_difference(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).fold(0.0, |m: f64, (a, b)| {
        let d = (a - b).abs();
        if d.is_nan() || m.is_nan() { f64::NAN } else { m.max(d) }
    })
}
