//! 入力座標に関する導関数を値と一緒に運ぶテンソル束（Jet）。
//!
//! `burn` の逆伝播は入力勾配をグラフから切り離した内部バックエンドのテンソルとして返すため、
//! 入力微分を損失に含めてパラメータへ逆伝播させることができません。
//! `Jet` は値・各座標方向の1階偏微分・各座標方向の純2階偏微分を通常のテンソル演算で
//! 前進伝播させるので、導関数もすべてパラメータの計算グラフに接続されたままになります。

use burn::nn::Linear;
use burn::prelude::Backend;
use burn::tensor::{Tensor, TensorData};

/// どの階数まで導関数を追跡するか。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Value,
    First,
    Second,
}

/// 値と、入力座標ごとの1階・純2階偏微分。
///
/// `first[k]` と `second[k]` は `value` と同じ形状を持ちます。
/// `Order::Value` では両方とも空、`Order::First` では `second` が空です。
#[derive(Debug, Clone)]
pub struct Jet<B: Backend> {
    pub value: Tensor<B, 2>,
    pub first: Vec<Tensor<B, 2>>,
    pub second: Vec<Tensor<B, 2>>,
}

impl<B: Backend> Jet<B> {
    /// 点のバッチ `[n, d]` を独立変数として種付けします。
    ///
    /// 座標 `k` 方向の接ベクトルは `k` 列目だけが1のワンホット行列です。
    pub fn seed(points: Tensor<B, 2>, order: Order) -> Self {
        let [n, dims] = points.dims();
        let device = points.device();
        let tangent = |k: usize| {
            let data = (0..n * dims)
                .map(|i| if i % dims == k { 1.0f32 } else { 0.0 })
                .collect::<Vec<f32>>();
            Tensor::<B, 2>::from_data(TensorData::new(data, [n, dims]), &device)
        };
        let first = match order {
            Order::Value => Vec::new(),
            Order::First | Order::Second => (0..dims).map(tangent).collect(),
        };
        let second = match order {
            Order::Second => (0..dims).map(|_| points.zeros_like()).collect(),
            Order::Value | Order::First => Vec::new(),
        };
        Self {
            value: points,
            first,
            second,
        }
    }

    /// `like` と同じ数の導関数（すべてゼロ）を持つ定数。
    pub fn constant(value: Tensor<B, 2>, like: &Self) -> Self {
        Self {
            first: like.first.iter().map(|_| value.zeros_like()).collect(),
            second: like.second.iter().map(|_| value.zeros_like()).collect(),
            value,
        }
    }

    pub fn order(&self) -> Order {
        if !self.second.is_empty() {
            Order::Second
        } else if !self.first.is_empty() {
            Order::First
        } else {
            Order::Value
        }
    }

    /// 列 `k` だけを取り出します（`[n, d]` → `[n, 1]`）。
    pub fn column(&self, k: usize) -> Self {
        let [n, _] = self.value.dims();
        let take = |t: &Tensor<B, 2>| t.clone().slice([0..n, k..k + 1]);
        Self {
            value: take(&self.value),
            first: self.first.iter().map(take).collect(),
            second: self.second.iter().map(take).collect(),
        }
    }

    /// 座標 `k` 方向の1階偏微分。
    pub fn partial(&self, k: usize) -> Tensor<B, 2> {
        self.first[k].clone()
    }

    /// 純2階偏微分の和（ラプラシアン）。
    pub fn laplacian(&self) -> Tensor<B, 2> {
        self.second
            .iter()
            .cloned()
            .reduce(|acc, d| acc + d)
            .unwrap_or_else(|| self.value.zeros_like())
    }

    pub fn add(self, other: Self) -> Self {
        Self {
            value: self.value + other.value,
            first: zip_with(self.first, other.first, |a, b| a + b),
            second: zip_with(self.second, other.second, |a, b| a + b),
        }
    }

    pub fn sub(self, other: Self) -> Self {
        self.add(other.neg())
    }

    /// 積の法則（2階まで）: `(uv)'' = u''v + 2u'v' + uv''`。
    pub fn mul(self, other: Self) -> Self {
        let (u, v) = (self.value, other.value);
        let second = self
            .second
            .into_iter()
            .zip(other.second)
            .zip(self.first.iter().zip(other.first.iter()))
            .map(|((du2, dv2), (du, dv))| {
                du2 * v.clone() + (du.clone() * dv.clone()).mul_scalar(2.0) + u.clone() * dv2
            })
            .collect();
        let first = zip_with(self.first, other.first, |du, dv| {
            du * v.clone() + u.clone() * dv
        });
        Self {
            value: u * v,
            first,
            second,
        }
    }

    pub fn add_scalar(self, c: f64) -> Self {
        Self {
            value: self.value.add_scalar(c),
            ..self
        }
    }

    pub fn mul_scalar(self, c: f64) -> Self {
        Self {
            value: self.value.mul_scalar(c),
            first: self.first.into_iter().map(|d| d.mul_scalar(c)).collect(),
            second: self.second.into_iter().map(|d| d.mul_scalar(c)).collect(),
        }
    }

    pub fn neg(self) -> Self {
        self.mul_scalar(-1.0)
    }

    /// 全結合層: 値は層の順伝播、導関数は重みとの積（バイアスは消える）。
    pub fn linear(self, layer: &Linear<B>) -> Self {
        let weight = layer.weight.val();
        Self {
            value: layer.forward(self.value),
            first: self
                .first
                .into_iter()
                .map(|d| d.matmul(weight.clone()))
                .collect(),
            second: self
                .second
                .into_iter()
                .map(|d| d.matmul(weight.clone()))
                .collect(),
        }
    }

    pub fn tanh(self) -> Self {
        let t = self.value.clone().tanh();
        let d1 = (t.clone() * t.clone()).neg().add_scalar(1.0);
        let d2 = self.wants_second().then(|| (t.clone() * d1.clone()).mul_scalar(-2.0));
        self.chain(t, d1, d2)
    }

    /// 2階微分はほとんど至る所でゼロです。
    pub fn leaky_relu(self, negative_slope: f64) -> Self {
        let non_positive = self.value.clone().lower_equal_elem(0.0);
        let d1 = self.value.ones_like().mask_fill(non_positive, negative_slope);
        let value = self.value.clone() * d1.clone();
        self.chain(value, d1, None)
    }

    pub fn sin(self) -> Self {
        let s = self.value.clone().sin();
        let d1 = self.value.clone().cos();
        let d2 = self.wants_second().then(|| s.clone().neg());
        self.chain(s, d1, d2)
    }

    pub fn cos(self) -> Self {
        let c = self.value.clone().cos();
        let d1 = self.value.clone().sin().neg();
        let d2 = self.wants_second().then(|| c.clone().neg());
        self.chain(c, d1, d2)
    }

    pub fn exp(self) -> Self {
        let e = self.value.clone().exp();
        let d2 = self.wants_second().then(|| e.clone());
        self.chain(e.clone(), e, d2)
    }

    pub fn ln(self) -> Self {
        let l = self.value.clone().log();
        let d1 = self.value.clone().powf_scalar(-1.0);
        let d2 = self
            .wants_second()
            .then(|| self.value.clone().powf_scalar(-2.0).neg());
        self.chain(l, d1, d2)
    }

    pub fn powf(self, p: f64) -> Self {
        let value = self.value.clone().powf_scalar(p);
        let d1 = self.value.clone().powf_scalar(p - 1.0).mul_scalar(p);
        let d2 = self.wants_second().then(|| {
            self.value
                .clone()
                .powf_scalar(p - 2.0)
                .mul_scalar(p * (p - 1.0))
        });
        self.chain(value, d1, d2)
    }

    fn wants_second(&self) -> bool {
        !self.second.is_empty()
    }

    /// 連鎖律: `(f∘g)' = f'(g)g'`, `(f∘g)'' = f''(g)g'^2 + f'(g)g''`。
    /// `d2` が `None` のときは `f'' = 0` として扱います。
    fn chain(self, value: Tensor<B, 2>, d1: Tensor<B, 2>, d2: Option<Tensor<B, 2>>) -> Self {
        let second = match d2 {
            Some(d2) => self
                .second
                .into_iter()
                .zip(self.first.iter())
                .map(|(g2, g1)| d2.clone() * g1.clone() * g1.clone() + d1.clone() * g2)
                .collect(),
            None => self
                .second
                .into_iter()
                .map(|g2| d1.clone() * g2)
                .collect(),
        };
        let first = self.first.into_iter().map(|g1| d1.clone() * g1).collect();
        Self {
            value,
            first,
            second,
        }
    }
}

fn zip_with<T>(a: Vec<T>, b: Vec<T>, f: impl Fn(T, T) -> T) -> Vec<T> {
    a.into_iter().zip(b).map(|(a, b)| f(a, b)).collect()
}
