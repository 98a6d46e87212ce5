use approx::assert_abs_diff_eq;
use pinn_de::diagnostics::mean_absolute_error;
use pinn_de::euler::{euler, euler_with_step};
use pinn_de::expr::Expr;
use pinn_de::gauss_seidel::{LaplaceGrid, gauss_seidel, iterations};
use pinn_de::problem::{BernoulliProblem, LaplaceProblem};
use pinn_de::sampler::linspace_values;

fn euler_error(h: f64) -> f64 {
    let problem = BernoulliProblem::example();
    let exact = BernoulliProblem::example_solution();
    let (xs, ys) = euler_with_step(
        problem.a,
        problem.b,
        exact.eval(problem.a),
        &problem.p,
        &problem.q,
        problem.n,
        h,
    )
    .unwrap();
    let reference = xs.iter().map(|&x| exact.eval(x)).collect::<Vec<_>>();
    mean_absolute_error(&ys, &reference)
}

#[test]
fn euler_error_shrinks_with_step_size() {
    let coarse = euler_error(0.02);
    let fine = euler_error(0.01);
    assert!(fine < coarse);
    // 1次精度: 刻み幅を半分にすると誤差もおよそ半分
    assert!(fine / coarse > 0.25 && fine / coarse < 0.75, "ratio {}", fine / coarse);
}

#[test]
fn euler_covers_example_interval() {
    let problem = BernoulliProblem::example();
    let (xs, ys) = euler(problem.a, problem.b, 0.5, &problem.p, &problem.q, problem.n).unwrap();
    assert_eq!(xs.len(), 831);
    assert_eq!(ys.len(), 831);
    assert!(*xs.last().unwrap() >= problem.b - 1e-12);
}

#[test]
fn gauss_seidel_reproduces_quadratic_harmonic_function() {
    // f(x, y) = x^2 - y^2 は5点差分でも厳密に調和的
    let t = Expr::var();
    let problem = LaplaceProblem {
        u0: -1.0 * t.clone() * t.clone(),
        u1: 1.0 - t.clone() * t.clone(),
        v0: t.clone() * t.clone(),
        v1: t.clone() * t - 1.0,
    };
    let n = 12;
    let grid = gauss_seidel(n, &problem).unwrap();
    let axis = linspace_values(0.0, 1.0, n);
    for (i, x) in axis.iter().enumerate() {
        for (j, y) in axis.iter().enumerate() {
            assert_abs_diff_eq!(grid.values()[[i, j]], x * x - y * y, epsilon = 1e-4);
        }
    }
}

#[test]
fn sweeps_reduce_interior_change() {
    let problem = LaplaceProblem::example();
    let mut grid = LaplaceGrid::new(10, &problem).unwrap();
    let mut previous = grid.clone();
    let mut changes = Vec::new();
    for _ in 0..iterations(10) {
        grid.sweep();
        let change = (grid.values() - previous.values())
            .iter()
            .fold(0.0_f64, |m, d| m.max(d.abs()));
        changes.push(change);
        previous = grid.clone();
    }
    assert!(changes[changes.len() - 1] < changes[0] * 1e-3);
}
