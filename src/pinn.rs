use crate::ansatz::{BernoulliSolution, LaplaceSolution, TrialSolution};
use crate::jet::{Jet, Order};
use burn::nn::loss::{MseLoss, Reduction};
use burn::prelude::Backend;
use burn::tensor::Tensor;

/// ベルヌーイ方程式の残差 `y' + P(x) y - Q(x) y^n` を計算します。
///
/// `y'` は [`Jet`] によって求めるので、残差はネットワークのパラメータに関して微分可能です。
pub fn bernoulli_residual<B: Backend>(
    solution: &BernoulliSolution<B>,
    x: Tensor<B, 2>,
) -> Tensor<B, 2> {
    let problem = solution.problem();
    let y = solution.forward_jet(x.clone(), Order::First);
    let at_x = Jet::seed(x, Order::Value);
    let p = problem.p.eval_jet(&at_x).value;
    let q = problem.q.eval_jet(&at_x).value;
    y.partial(0) + p * y.value.clone() - q * y.value.powf_scalar(problem.n)
}

/// 物理損失（ベルヌーイ方程式）: 残差の二乗平均。
pub fn bernoulli_loss<B: Backend>(solution: &BernoulliSolution<B>, x: Tensor<B, 2>) -> Tensor<B, 1> {
    let residual = bernoulli_residual(solution, x);
    MseLoss::new().forward(residual.clone(), residual.zeros_like(), Reduction::Mean)
}

/// ラプラス方程式の残差 `∂²f/∂x² + ∂²f/∂y²` を計算します。
pub fn laplace_residual<B: Backend>(solution: &LaplaceSolution<B>, points: Tensor<B, 2>) -> Tensor<B, 2> {
    solution.forward_jet(points, Order::Second).laplacian()
}

/// 物理損失（ラプラス方程式）: ラプラシアンとゼロとの二乗平均誤差。
pub fn laplace_loss<B: Backend>(solution: &LaplaceSolution<B>, points: Tensor<B, 2>) -> Tensor<B, 1> {
    let residual = laplace_residual(solution, points);
    MseLoss::new().forward(residual.clone(), residual.zeros_like(), Reduction::Mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansatz::to_vec;
    use crate::expr::Expr;
    use crate::model::MlpConfig;
    use crate::problem::{BernoulliProblem, LaplaceProblem};
    use crate::sampler;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::ElementConversion;

    type TestBackend = Autodiff<NdArray<f32>>;

    fn bernoulli_solution() -> BernoulliSolution<TestBackend> {
        TestBackend::seed(11);
        let device = Default::default();
        let model = MlpConfig::bernoulli().with_width(16).init(&device);
        BernoulliSolution::new(model, BernoulliProblem::example(), device)
    }

    fn laplace_solution() -> LaplaceSolution<TestBackend> {
        TestBackend::seed(12);
        let device = Default::default();
        let model = MlpConfig::laplace().with_width(16).init(&device);
        LaplaceSolution::new(model, LaplaceProblem::example(), device)
    }

    fn max_abs<B: Backend>(t: Tensor<B, 2>) -> f64 {
        to_vec(t).unwrap().into_iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    #[test]
    fn losses_are_non_negative() {
        let device = Default::default();
        let x = sampler::linspace::<TestBackend>(-8.0, 0.3, 50, &device).unwrap();
        let loss: f32 = bernoulli_loss(&bernoulli_solution(), x).into_scalar().elem();
        assert!(loss >= 0.0);

        let points = sampler::unit_square::<TestBackend>(5, &device).unwrap();
        let loss: f32 = laplace_loss(&laplace_solution(), points).into_scalar().elem();
        assert!(loss >= 0.0);
    }

    #[test]
    fn residual_reduces_to_slope_without_coefficients() {
        let device = Default::default();
        let problem = BernoulliProblem {
            p: Expr::constant(0.0),
            q: Expr::constant(0.0),
            ..BernoulliProblem::example()
        };
        let model = MlpConfig::bernoulli().with_width(4).init::<TestBackend>(&device);
        let solution = BernoulliSolution::new(model, problem, device);
        let x = sampler::linspace::<TestBackend>(-8.0, 0.3, 20, &device).unwrap();
        let residual = bernoulli_residual(&solution, x.clone());
        let y = solution.forward_jet(x, Order::First);
        // P = Q = 0 なら残差は y' そのもの
        let diff = to_vec(residual - y.partial(0)).unwrap();
        assert!(diff.iter().all(|d| d.abs() < 1e-6));
    }

    #[test]
    fn network_slope_stays_attached_to_parameters() {
        let solution = bernoulli_solution();
        let device = Default::default();
        let x = sampler::linspace::<TestBackend>(-8.0, 0.3, 32, &device).unwrap();
        // N'(x) だけから作った損失でも第1層の重みまで勾配が届くこと
        let slope = solution.model().forward_with(x, Order::First).partial(0);
        let grads = (slope.clone() * slope).mean().backward();
        let weight_grad = solution.model().input_weight().grad(&grads).unwrap();
        assert!(max_abs(weight_grad) > 0.0);
    }

    #[test]
    fn network_laplacian_stays_attached_to_parameters() {
        let solution = laplace_solution();
        let device = Default::default();
        let points = sampler::unit_square::<TestBackend>(6, &device).unwrap();
        let laplacian = solution
            .model()
            .forward_with(points, Order::Second)
            .laplacian();
        let grads = (laplacian.clone() * laplacian).mean().backward();
        let weight_grad = solution.model().input_weight().grad(&grads).unwrap();
        assert!(max_abs(weight_grad) > 0.0);
    }

    #[test]
    fn laplace_loss_reaches_parameters() {
        let solution = laplace_solution();
        let device = Default::default();
        let points = sampler::unit_square::<TestBackend>(6, &device).unwrap();
        let grads = laplace_loss(&solution, points).backward();
        let weight_grad = solution.model().input_weight().grad(&grads).unwrap();
        assert!(max_abs(weight_grad) > 0.0);
    }
}
