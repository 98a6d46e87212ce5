//! 差分法による数値微分。

/// 既定の刻み幅 `ε^(1/3) max(|x|, 1)`。中心差分の丸め誤差と打ち切り誤差の釣り合う大きさです。
pub fn default_step(x: f64) -> f64 {
    f64::EPSILON.cbrt() * x.abs().max(1.0)
}

/// 中心差分による勾配 `∂f/∂x_i ≈ (f(x + h e_i) - f(x - h e_i)) / 2h`。
///
/// `f` の評価が失敗した場合は、そのエラーをそのまま返します。
pub fn gradient<E>(
    f: impl Fn(&[f64]) -> Result<f64, E>,
    x: &[f64],
    h: Option<f64>,
) -> Result<Vec<f64>, E> {
    (0..x.len())
        .map(|i| {
            let h = h.unwrap_or_else(|| default_step(x[i]));
            let (plus, minus) = shifted(x, i, h);
            Ok((f(&plus)? - f(&minus)?) / (2.0 * h))
        })
        .collect()
}

/// 中心差分による純2階偏微分の和（ラプラシアン）。
pub fn laplacian<E>(f: impl Fn(&[f64]) -> Result<f64, E>, x: &[f64], h: f64) -> Result<f64, E> {
    let center = f(x)?;
    let mut sum = 0.0;
    for i in 0..x.len() {
        let (plus, minus) = shifted(x, i, h);
        sum += (f(&plus)? - 2.0 * center + f(&minus)?) / (h * h);
    }
    Ok(sum)
}

fn shifted(x: &[f64], i: usize, h: f64) -> (Vec<f64>, Vec<f64>) {
    let mut plus = x.to_vec();
    let mut minus = x.to_vec();
    plus[i] += h;
    minus[i] -= h;
    (plus, minus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_3, FRAC_PI_4};

    #[test]
    fn cubic_derivative() {
        // f(x) = x^3, f'(6) = 108
        let f = |x: &[f64]| Ok::<_, ()>(x[0].powi(3));
        assert_abs_diff_eq!(gradient(f, &[6.0], None).unwrap()[0], 108.0, epsilon = 1e-6);

        // f(x) = x^3 + 4x^2 - 12, f'(2) = 28
        let f = |x: &[f64]| Ok::<_, ()>(x[0].powi(3) + 4.0 * x[0].powi(2) - 12.0);
        assert_abs_diff_eq!(gradient(f, &[2.0], Some(1e-5)).unwrap()[0], 28.0, epsilon = 1e-6);
    }

    #[test]
    fn partial_derivatives_of_two_variables() {
        // f(x, y) = sin(x) + cos(y) → [cos(x), -sin(y)]
        let f = |x: &[f64]| Ok::<_, ()>(x[0].sin() + x[1].cos());
        let grad = gradient(f, &[FRAC_PI_4, FRAC_PI_3], None).unwrap();
        assert_abs_diff_eq!(grad[0], 0.70710678, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[1], -0.86602540, epsilon = 1e-6);
    }

    #[test]
    fn default_step_is_nonzero_at_origin() {
        let f = |x: &[f64]| Ok::<_, ()>(x[0] + 2.0 * x[1]);
        let grad = gradient(f, &[0.0, 0.0], None).unwrap();
        assert_abs_diff_eq!(grad[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(grad[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn laplacian_of_quadratic() {
        // x^2 + 3y^2 → 2 + 6
        let f = |x: &[f64]| Ok::<_, ()>(x[0] * x[0] + 3.0 * x[1] * x[1]);
        assert_abs_diff_eq!(laplacian(f, &[0.3, -0.2], 1e-3).unwrap(), 8.0, epsilon = 1e-4);
    }

    #[test]
    fn evaluation_errors_are_returned() {
        // x < 0 では評価できない関数
        let f = |x: &[f64]| if x[0] < 0.0 { Err("negative") } else { Ok(x[0].sqrt()) };
        assert_eq!(gradient(f, &[0.0], Some(1e-3)), Err("negative"));
        assert_eq!(laplacian(f, &[1e-4, 0.5], 1e-3), Err("negative"));
        assert!(gradient(f, &[1.0], None).is_ok());
    }
}
