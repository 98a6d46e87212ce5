//! ガウス・ザイデル法によるラプラス方程式の参照解。

use crate::error::{Error, Result};
use crate::problem::LaplaceProblem;
use crate::sampler::linspace_values;
use ndarray::Array2;
use std::f64::consts::PI;

/// 単位正方形上の `n×n` 格子。行番号が x、列番号が y に対応します。
#[derive(Debug, Clone, PartialEq)]
pub struct LaplaceGrid {
    values: Array2<f64>,
}

impl LaplaceGrid {
    /// 4辺を境界関数で、内部をゼロで初期化します。
    ///
    /// 辺 `x = 0, 1` を先に、辺 `y = 0, 1` を後に書き込むため、角の値は `v0`, `v1` で決まります。
    pub fn new(n: usize, problem: &LaplaceProblem) -> Result<Self> {
        if n < 2 {
            return Err(Error::size(format!("grid needs at least 2 points per axis, got {n}")));
        }
        let axis = linspace_values(0.0, 1.0, n);
        let mut values = Array2::<f64>::zeros((n, n));
        for (k, &t) in axis.iter().enumerate() {
            values[[0, k]] = problem.u0.eval(t);
            values[[n - 1, k]] = problem.u1.eval(t);
        }
        for (k, &t) in axis.iter().enumerate() {
            values[[k, 0]] = problem.v0.eval(t);
            values[[k, n - 1]] = problem.v1.eval(t);
        }
        Ok(Self { values })
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// 内部の各セルを上下左右4点の平均で置き換えます（その場更新）。境界は変更しません。
    pub fn sweep(&mut self) {
        let n = self.size();
        for i in 1..n.saturating_sub(1) {
            for j in 1..n - 1 {
                self.values[[i, j]] = 0.25
                    * (self.values[[i - 1, j]]
                        + self.values[[i + 1, j]]
                        + self.values[[i, j - 1]]
                        + self.values[[i, j + 1]]);
            }
        }
    }
}

/// 反復回数 `ceil(-8 / (2 ln(1 - 2 sin²(π / 2n))))`。
///
/// 反復行列のスペクトル半径から誤差 10⁻⁸ に達する回数を事前に見積もったもので、
/// 実行時の収束判定は行いません。
pub fn iterations(n: usize) -> usize {
    let s = (PI / (2.0 * n as f64)).sin();
    let rate = (1.0 - 2.0 * s * s).ln();
    (-8.0 / (2.0 * rate)).ceil().max(0.0) as usize
}

/// ガウス・ザイデル法で `n×n` 格子上のラプラス方程式を解きます。
pub fn gauss_seidel(n: usize, problem: &LaplaceProblem) -> Result<LaplaceGrid> {
    let mut grid = LaplaceGrid::new(n, problem)?;
    for _ in 0..iterations(n) {
        grid.sweep();
    }
    Ok(grid)
}
