//! 係数関数・境界関数を表す1変数の式。
//!
//! 同じ式を `f64`（古典的ソルバーや誤差評価）と [`Jet`]（PINNの学習）の両方で評価できます。
//!
//! ```
//! use pinn_de::expr::Expr;
//!
//! let x = Expr::var();
//! let q = (x.clone() * 2.0).exp() + 1.0;
//! assert_eq!(q.eval(0.0), 2.0);
//! ```

use crate::jet::Jet;
use burn::prelude::Backend;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Var,
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Pow(Box<Expr>, f64),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Exp(Box<Expr>),
    Ln(Box<Expr>),
}

impl Expr {
    pub fn var() -> Self {
        Self::Var
    }

    pub fn constant(value: f64) -> Self {
        Self::Const(value)
    }

    pub fn powf(self, p: f64) -> Self {
        Self::Pow(Box::new(self), p)
    }

    pub fn sin(self) -> Self {
        Self::Sin(Box::new(self))
    }

    pub fn cos(self) -> Self {
        Self::Cos(Box::new(self))
    }

    pub fn exp(self) -> Self {
        Self::Exp(Box::new(self))
    }

    pub fn ln(self) -> Self {
        Self::Ln(Box::new(self))
    }

    /// 点 `x` での値。
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Self::Const(c) => *c,
            Self::Var => x,
            Self::Add(a, b) => a.eval(x) + b.eval(x),
            Self::Mul(a, b) => a.eval(x) * b.eval(x),
            Self::Neg(a) => -a.eval(x),
            Self::Pow(a, p) => a.eval(x).powf(*p),
            Self::Sin(a) => a.eval(x).sin(),
            Self::Cos(a) => a.eval(x).cos(),
            Self::Exp(a) => a.eval(x).exp(),
            Self::Ln(a) => a.eval(x).ln(),
        }
    }

    /// 1列の [`Jet`] を変数として評価します。結果は `x` と同じ階数の導関数を持ちます。
    pub fn eval_jet<B: Backend>(&self, x: &Jet<B>) -> Jet<B> {
        match self {
            Self::Const(c) => Jet::constant(x.value.ones_like().mul_scalar(*c), x),
            Self::Var => x.clone(),
            Self::Add(a, b) => a.eval_jet(x).add(b.eval_jet(x)),
            Self::Mul(a, b) => a.eval_jet(x).mul(b.eval_jet(x)),
            Self::Neg(a) => a.eval_jet(x).neg(),
            Self::Pow(a, p) => a.eval_jet(x).powf(*p),
            Self::Sin(a) => a.eval_jet(x).sin(),
            Self::Cos(a) => a.eval_jet(x).cos(),
            Self::Exp(a) => a.eval_jet(x).exp(),
            Self::Ln(a) => a.eval_jet(x).ln(),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Const(value)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

macro_rules! impl_op {
    ($trait:ident, $method:ident, |$a:ident, $b:ident| $body:expr) => {
        impl $trait for Expr {
            type Output = Expr;

            fn $method(self, other: Expr) -> Expr {
                let ($a, $b) = (self, other);
                $body
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;

            fn $method(self, other: f64) -> Expr {
                let ($a, $b) = (self, Expr::Const(other));
                $body
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;

            fn $method(self, other: Expr) -> Expr {
                let ($a, $b) = (Expr::Const(self), other);
                $body
            }
        }
    };
}

impl_op!(Add, add, |a, b| Expr::Add(Box::new(a), Box::new(b)));
impl_op!(Mul, mul, |a, b| Expr::Mul(Box::new(a), Box::new(b)));
impl_op!(Sub, sub, |a, b| Expr::Add(Box::new(a), Box::new(-b)));
