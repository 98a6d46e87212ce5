use crate::error::Error;
use crate::jet::{Jet, Order};
use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// 隠れ層の活性化関数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    Tanh,
    LeakyRelu { negative_slope: f64 },
}

impl Activation {
    /// 傾き 0.01 の Leaky ReLU。
    pub fn leaky_relu() -> Self {
        Self::LeakyRelu {
            negative_slope: 0.01,
        }
    }

    fn forward<B: Backend>(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Self::Tanh => x.tanh(),
            Self::LeakyRelu { negative_slope } => {
                burn::tensor::activation::leaky_relu(x, *negative_slope)
            }
        }
    }

    fn forward_jet<B: Backend>(&self, x: Jet<B>) -> Jet<B> {
        match self {
            Self::Tanh => x.tanh(),
            Self::LeakyRelu { negative_slope } => x.leaky_relu(*negative_slope),
        }
    }
}

/// 多層パーセプトロンの構成。
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// 入力座標の次元（ODE は1、PDE は2）
    pub input: usize,
    #[config(default = 200)]
    pub width: usize,
    /// 隠れ層の数（1以上）
    #[config(default = 2)]
    pub hidden_layers: usize,
    #[config(default = "Activation::Tanh")]
    pub activation: Activation,
}

impl MlpConfig {
    /// ベルヌーイ方程式用: 1 → 200×3 (tanh) → 1
    ///
    /// 残差は `N + (x - x0) N'` を含むため、`N'` が区分的に定数になる
    /// Leaky ReLU では残差を十分に小さくできません。
    pub fn bernoulli() -> Self {
        Self::new(1).with_hidden_layers(3)
    }

    /// ラプラス方程式用: 2 → 200×2 (tanh) → 1
    pub fn laplace() -> Self {
        Self::new(2)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.input == 0 || self.width == 0 || self.hidden_layers == 0 {
            return Err(Error::size(format!(
                "network needs positive input, width and hidden layers, got {}/{}/{}",
                self.input, self.width, self.hidden_layers
            )));
        }
        Ok(())
    }

    /// 新しいモデルを初期化します。パラメータは `burn` の既定の初期化に従います。
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut linears = Vec::with_capacity(self.hidden_layers + 1);
        linears.push(LinearConfig::new(self.input, self.width).init(device));
        for _ in 1..self.hidden_layers {
            linears.push(LinearConfig::new(self.width, self.width).init(device));
        }
        linears.push(LinearConfig::new(self.width, 1).init(device));
        Mlp {
            linears,
            activation: Ignored(self.activation.clone()),
        }
    }
}

/// PINNの本体となるニューラルネットワーク。
///
/// 座標を入力とし、スカラーを1つ出力する多層パーセプトロン（MLP）です。
/// 外部からは微分可能な写像としてのみ扱います。
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    linears: Vec<Linear<B>>,
    activation: Ignored<Activation>,
}

impl<B: Backend> Mlp<B> {
    /// 順伝播: `[n, input]` → `[n, 1]`
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let (output, hidden) = self.split();
        let x = hidden.iter().fold(input, |x, linear| {
            self.activation.forward(linear.forward(x))
        });
        output.forward(x)
    }

    /// 入力に関する導関数を伴う順伝播。
    pub fn forward_jet(&self, input: Jet<B>) -> Jet<B> {
        let (output, hidden) = self.split();
        let x = hidden.iter().fold(input, |x, linear| {
            self.activation.forward_jet(x.linear(linear))
        });
        x.linear(output)
    }

    /// 点のバッチから直接 [`Jet`] を作って順伝播します。
    pub fn forward_with(&self, input: Tensor<B, 2>, order: Order) -> Jet<B> {
        self.forward_jet(Jet::seed(input, order))
    }

    /// 最初の全結合層の重み。勾配の接続を確かめるために使います。
    pub fn input_weight(&self) -> Tensor<B, 2> {
        self.linears[0].weight.val()
    }

    fn split(&self) -> (&Linear<B>, &[Linear<B>]) {
        // `init` は常に出力層を含むので空にはなりません。
        self.linears
            .split_last()
            .expect("the network always has an output layer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn presets_match_documented_topology() {
        let device = Default::default();
        let ode = MlpConfig::bernoulli().init::<TestBackend>(&device);
        assert_eq!(ode.linears.len(), 4);
        assert_eq!(ode.input_weight().dims(), [1, 200]);
        let pde = MlpConfig::laplace().init::<TestBackend>(&device);
        assert_eq!(pde.linears.len(), 3);
        assert_eq!(pde.input_weight().dims(), [2, 200]);
    }

    #[test]
    fn rejects_networks_without_hidden_layers() {
        assert!(MlpConfig::bernoulli().validate().is_ok());
        let config = MlpConfig::bernoulli().with_hidden_layers(0);
        assert!(matches!(config.validate(), Err(Error::Size(_))));
        assert!(MlpConfig::laplace().with_width(0).validate().is_err());
    }

    #[test]
    fn jet_value_matches_plain_forward() {
        let device = Default::default();
        let model = MlpConfig::new(2).with_width(16).init::<TestBackend>(&device);
        let input = Tensor::<TestBackend, 2>::from_floats([[0.1, 0.9], [0.4, 0.3]], &device);
        let plain = model.forward(input.clone()).into_data().to_vec::<f32>().unwrap();
        let jet = model.forward_with(input, Order::Second);
        assert_eq!(jet.value.dims(), [2, 1]);
        assert_eq!(jet.second.len(), 2);
        let value = jet.value.into_data().to_vec::<f32>().unwrap();
        for (a, b) in plain.iter().zip(value.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn jet_slope_matches_reverse_mode_input_gradient() {
        let device = Default::default();
        let model = MlpConfig::bernoulli()
            .with_width(8)
            .init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 2>::from_floats([[-0.7], [0.2], [1.3]], &device)
            .require_grad();
        let y = model.forward(x.clone());
        let grads = y.sum().backward();
        let reverse = x.grad(&grads).unwrap().into_data().to_vec::<f32>().unwrap();
        let jet = model.forward_with(x, Order::First);
        let forward = jet.partial(0).into_data().to_vec::<f32>().unwrap();
        for (a, b) in reverse.iter().zip(forward.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
    }
}
