//! オイラー法によるベルヌーイ方程式の参照解。
//!
//! `y' = Q(x) y^n - P(x) y` を前進オイラー法で解きます。
//!
//! ```text
//! y_{k+1} = y_k - h (P(x_k) y_k - Q(x_k) y_k^n)
//! ```

use crate::error::{Error, Result};
use crate::expr::Expr;

/// 既定の刻み幅。
pub const STEP: f64 = 0.01;

/// 刻み幅 [`STEP`] で `x0` から `b` まで解き、`(x の列, y の列)` を返します。
pub fn euler(x0: f64, b: f64, y0: f64, p: &Expr, q: &Expr, n: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    euler_with_step(x0, b, y0, p, q, n, STEP)
}

/// 刻み幅 `h` を指定するオイラー法。
///
/// 格子点は `x0 + k h`（`k = 0..=steps`）で、誤差の蓄積によって1ステップ多くなることはありません。
pub fn euler_with_step(
    x0: f64,
    b: f64,
    y0: f64,
    p: &Expr,
    q: &Expr,
    n: f64,
    h: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if !(x0 < b) || !x0.is_finite() || !b.is_finite() {
        return Err(Error::domain(format!("expected finite x0 < b, got [{x0}, {b}]")));
    }
    if !(h > 0.0) || !h.is_finite() {
        return Err(Error::domain(format!("step size must be positive, got {h}")));
    }

    let steps = step_count(x0, b, h);
    let mut xs = Vec::with_capacity(steps + 1);
    let mut ys = Vec::with_capacity(steps + 1);
    let mut y = y0;
    xs.push(x0);
    ys.push(y);

    for k in 0..steps {
        let x = x0 + k as f64 * h;
        y -= h * (p.eval(x) * y - q.eval(x) * y.powf(n));
        xs.push(x0 + (k + 1) as f64 * h);
        ys.push(y);
    }

    Ok((xs, ys))
}

/// `ceil((b - x0) / h)`。商が整数に丸め誤差程度まで近い場合はその整数とします。
pub fn step_count(x0: f64, b: f64, h: f64) -> usize {
    let ratio = (b - x0) / h;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest as usize
    } else {
        ratio.ceil() as usize
    }
}
