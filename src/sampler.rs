//! 残差を評価するコロケーション点の生成。

use crate::error::{Error, Result};
use burn::prelude::Backend;
use burn::tensor::{Tensor, TensorData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `[a, b]` を等間隔に `n` 点で区切った値（両端を含む）。
pub fn linspace_values(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => (0..n)
            .map(|i| a + (b - a) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// 1次元区間のコロケーション点 `[n, 1]`。勾配追跡付き。
pub fn linspace<B: Backend>(a: f64, b: f64, n: usize, device: &B::Device) -> Result<Tensor<B, 2>> {
    check_interval(a, b, n)?;
    Ok(column(&linspace_values(a, b, n), device).require_grad())
}

/// `[a, b]` 上の一様乱数によるコロケーション点 `[n, 1]`。勾配追跡付き。
pub fn uniform<B: Backend>(
    a: f64,
    b: f64,
    n: usize,
    rng: &mut StdRng,
    device: &B::Device,
) -> Result<Tensor<B, 2>> {
    check_interval(a, b, n)?;
    let xs = (0..n).map(|_| rng.random_range(a..=b)).collect::<Vec<_>>();
    Ok(column(&xs, device).require_grad())
}

/// 乱数によるサンプリング用の生成器。
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// 単位正方形 `[0,1]×[0,1]` の `n×n` 格子点を平坦化した `[n*n, 2]`。
///
/// `ij` 順（x が外側のループ）に並ぶため、`i * n + j` 番目の点は `(x_i, y_j)` です。
pub fn unit_square<B: Backend>(n: usize, device: &B::Device) -> Result<Tensor<B, 2>> {
    if n < 2 {
        return Err(Error::size(format!("grid needs at least 2 points per axis, got {n}")));
    }
    let axis = linspace_values(0.0, 1.0, n);
    let mut coords = Vec::with_capacity(n * n * 2);
    for x in &axis {
        for y in &axis {
            coords.push(*x);
            coords.push(*y);
        }
    }
    let points = Tensor::<B, 2>::from_data(TensorData::new(coords, [n * n, 2]), device);
    Ok(points.require_grad())
}

/// `f64` の値の列を `[n, 1]` テンソルに変換します。
pub fn column<B: Backend>(values: &[f64], device: &B::Device) -> Tensor<B, 2> {
    Tensor::<B, 2>::from_data(TensorData::new(values.to_vec(), [values.len(), 1]), device)
}

fn check_interval(a: f64, b: f64, n: usize) -> Result<()> {
    if !(a < b) || !a.is_finite() || !b.is_finite() {
        return Err(Error::domain(format!("expected finite a < b, got [{a}, {b}]")));
    }
    if n == 0 {
        return Err(Error::size("number of collocation points must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn linspace_includes_both_ends() {
        let xs = linspace_values(-8.0, 0.3, 5);
        assert_eq!(xs.len(), 5);
        assert_eq!(xs[0], -8.0);
        assert!((xs[4] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn unit_square_is_x_major_meshgrid() {
        let device = Default::default();
        let points = unit_square::<TestBackend>(3, &device).unwrap();
        assert_eq!(points.dims(), [9, 2]);
        assert!(points.is_require_grad());
        let data = points.into_data().to_vec::<f32>().unwrap();
        // (x_1, y_2)
        assert_eq!(&data[10..12], &[0.5, 1.0]);
        // (x_2, y_0)
        assert_eq!(&data[12..14], &[1.0, 0.0]);
    }

    #[test]
    fn uniform_points_stay_in_interval() {
        let device = Default::default();
        let mut rng = seeded_rng(7);
        let points = uniform::<TestBackend>(-1.0, 2.0, 100, &mut rng, &device).unwrap();
        let data = points.into_data().to_vec::<f32>().unwrap();
        assert!(data.iter().all(|&x| (-1.0..=2.0).contains(&x)));
    }

    #[test]
    fn rejects_degenerate_domains() {
        let device = Default::default();
        assert!(matches!(
            linspace::<TestBackend>(1.0, 1.0, 10, &device),
            Err(Error::Domain(_))
        ));
        assert!(matches!(
            linspace::<TestBackend>(0.0, 1.0, 0, &device),
            Err(Error::Size(_))
        ));
        assert!(unit_square::<TestBackend>(1, &device).is_err());
    }
}
