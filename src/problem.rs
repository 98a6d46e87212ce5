//! 解く微分方程式の定義。
//!
//! 係数関数・境界関数はどちらも [`Expr`] で与えるため、PINN と古典的ソルバーが
//! 同じ問題定義を共有できます。

use crate::error::{Error, Result};
use crate::expr::Expr;
use std::f64::consts::PI;

/// ベルヌーイ型の1階非線形常微分方程式 `y' + P(x) y = Q(x) y^n`。
///
/// PINN は区間 `[a, b]` で学習し、初期条件 `y(x0) = y0` を厳密に満たします。
#[derive(Debug, Clone)]
pub struct BernoulliProblem {
    pub a: f64,
    pub b: f64,
    pub x0: f64,
    pub y0: f64,
    pub p: Expr,
    pub q: Expr,
    pub n: f64,
}

impl BernoulliProblem {
    /// `y' + y/3 = e^x y^4` を `[-8, 0.3]` で、初期点 `x0 = -5` から解く問題。
    pub fn example() -> Self {
        let exact = Self::example_solution();
        let x0 = -5.0;
        Self {
            a: -8.0,
            b: 0.3,
            x0,
            y0: exact.eval(x0),
            p: Expr::constant(1.0 / 3.0),
            q: Expr::var().exp(),
            n: 4.0,
        }
    }

    /// [`BernoulliProblem::example`] の厳密解 `y(x) = (e^x (1 - 3x))^(-1/3)`。
    pub fn example_solution() -> Expr {
        let x = Expr::var();
        (x.clone().exp() * (1.0 - 3.0 * x)).powf(-1.0 / 3.0)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [self.a, self.b, self.x0, self.y0, self.n]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::domain("problem parameters must be finite"));
        }
        if !(self.a < self.b) {
            return Err(Error::domain(format!(
                "expected a < b, got [{}, {}]",
                self.a, self.b
            )));
        }
        Ok(())
    }
}

/// 単位正方形 `[0,1]×[0,1]` 上のラプラス方程式 `∇²f = 0`。
///
/// `u0`, `u1` は辺 `x = 0`, `x = 1` 上の値（`y` の関数）、
/// `v0`, `v1` は辺 `y = 0`, `y = 1` 上の値（`x` の関数）です。
#[derive(Debug, Clone)]
pub struct LaplaceProblem {
    pub u0: Expr,
    pub u1: Expr,
    pub v0: Expr,
    pub v1: Expr,
}

impl LaplaceProblem {
    /// `x` 方向の辺をゼロ、`y` 方向の辺を `cos(2πx)` とした問題。
    pub fn example() -> Self {
        let cos2pi = (2.0 * PI * Expr::var()).cos();
        Self {
            u0: Expr::constant(0.0),
            u1: Expr::constant(0.0),
            v0: cos2pi.clone(),
            v1: cos2pi,
        }
    }

    /// 境界を補間する解析項 `H1(x, y)`。
    ///
    /// 角では隣接する2辺の値が加算されます。試行解の境界値はこの式そのものです。
    pub fn blend(&self, x: f64, y: f64) -> f64 {
        (1.0 - x) * self.u0.eval(y)
            + x * self.u1.eval(y)
            + (1.0 - y) * self.v0.eval(x)
            + y * self.v1.eval(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn example_initial_value_lies_on_exact_solution() {
        let problem = BernoulliProblem::example();
        problem.validate().unwrap();
        let exact = BernoulliProblem::example_solution();
        assert_relative_eq!(problem.y0, exact.eval(-5.0));
    }

    #[test]
    fn rejects_reversed_interval() {
        let problem = BernoulliProblem {
            a: 1.0,
            b: 0.0,
            ..BernoulliProblem::example()
        };
        assert!(matches!(problem.validate(), Err(Error::Domain(_))));
    }

    #[test]
    fn blend_double_counts_corners() {
        let problem = LaplaceProblem::example();
        // x = 0 の辺: u0(y) = 0 に加えて (1-y) v0(0) + y v1(0) = 1
        assert_relative_eq!(problem.blend(0.0, 0.3), 1.0);
        assert_relative_eq!(problem.blend(0.0, 0.0), 1.0);
        assert_relative_eq!(problem.blend(0.1, 0.0), (2.0 * PI * 0.1).cos());
    }
}
