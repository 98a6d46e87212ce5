//! # 物理情報ニューラルネットワーク (PINN) ライブラリ
//!
//! `burn` フレームワークを使用して、物理情報ニューラルネットワーク（PINN）で
//! 微分方程式を解くための主要なコンポーネントを提供します。
//!
//! - ベルヌーイ型の常微分方程式 `y' + P(x) y = Q(x) y^n`（初期条件つき）
//! - 単位正方形上のラプラス方程式 `∇²f = 0`（ディリクレ境界条件つき）
//!
//! 試行解は条件を構成によって満たし、ネットワークは方程式の残差だけを最小化します。
//! 比較用にオイラー法とガウス・ザイデル法の参照解も実装しています。

pub mod ansatz;
pub mod cli;
pub mod commands;
pub mod diagnostics;
pub mod error;
pub mod euler;
pub mod expr;
pub mod gauss_seidel;
pub mod jet;
pub mod model;
pub mod numdiff;
pub mod pinn;
pub mod plot;
pub mod problem;
pub mod sampler;
pub mod training;

pub use error::{Error, Result};
