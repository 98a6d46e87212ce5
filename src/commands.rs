//! サブコマンドの実行。学習、参照解の計算、誤差の表示、グラフの保存を行います。

use crate::ansatz::{LaplaceSolution, TrialSolution, to_vec};
use crate::cli::{BernoulliArgs, LaplaceArgs};
use crate::diagnostics::{
    bernoulli_residual_gap, interior_mean_absolute_error, laplace_residual_gap,
    max_abs_difference, mean_absolute_error,
};
use crate::euler::euler;
use crate::gauss_seidel::gauss_seidel;
use crate::plot::{Series, plot_curves, plot_heatmap, plot_loss_history, plot_vector_field};
use crate::problem::{BernoulliProblem, LaplaceProblem};
use crate::sampler::{linspace_values, unit_square};
use crate::training::{
    Epoch, ProgressLogger, TrainingConfig, TrainingObserver, train_bernoulli, train_laplace,
};
use burn::backend::{Autodiff, NdArray};
use plotters::style::{BLUE, GREEN, RED};
use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Instant;

type MyBackend = Autodiff<NdArray<f32>>;

/// 差分法による残差の検証で使う刻み幅。
const ODE_CHECK_STEP: f64 = 1e-3;
const PDE_CHECK_STEP: f64 = 2e-2;

/// `bernoulli`サブコマンドを実行します。
pub fn run_bernoulli(args: &BernoulliArgs) -> Result<(), Box<dyn Error>> {
    let device = Default::default();
    let problem = BernoulliProblem::example();
    let exact = BernoulliProblem::example_solution();
    let config = args.config();
    let out_dir = &args.train.out_dir;
    fs::create_dir_all(out_dir)?;

    println!("学習を開始します (ベルヌーイ方程式) - バックエンド: NdArray (CPU)");
    println!(
        "=> 区間: [{}, {}], 初期条件: y({}) = {:.6}, エポック数: {}, 点数: {}",
        problem.a, problem.b, problem.x0, problem.y0, config.num_epochs, config.batch_size
    );
    let training_start = Instant::now();
    let mut logger = ProgressLogger::new(args.train.log_every);
    let (solution, history) = train_bernoulli::<MyBackend>(&problem, &config, &device, &mut logger)?;
    println!("学習が完了しました。");
    println!("=> 学習時間: {:.2?}", training_start.elapsed());

    let euler_start = Instant::now();
    let (xs, euler_ys) = euler(
        problem.a,
        problem.b,
        exact.eval(problem.a),
        &problem.p,
        &problem.q,
        problem.n,
    )?;
    println!(
        "=> オイラー法: {} ステップ, 計算時間: {:.2?}",
        xs.len() - 1,
        euler_start.elapsed()
    );

    let exact_ys = xs.iter().map(|&x| exact.eval(x)).collect::<Vec<f64>>();
    let points = xs.iter().map(|&x| vec![x]).collect::<Vec<_>>();
    let pinn_ys = solution.values(&points)?;
    println!(
        "=> 厳密解との平均絶対誤差: PINN {:.6e}, オイラー法 {:.6e}",
        mean_absolute_error(&pinn_ys, &exact_ys),
        mean_absolute_error(&euler_ys, &exact_ys)
    );

    let check_xs = linspace_values(problem.a, problem.b, 9);
    let gap = bernoulli_residual_gap(&solution, &check_xs, ODE_CHECK_STEP)?;
    println!("=> 残差の検証 (自動微分と差分法の最大差): {:.3e}", gap);

    save_plot(&out_dir.join("bernoulli_loss.png"), |path| {
        plot_loss_history(path, history.as_slice())
    });
    save_plot(&out_dir.join("bernoulli_solution.png"), |path| {
        plot_curves(
            path,
            "Bernoulli Equation",
            &[
                Series {
                    label: "Analytical",
                    points: xs.iter().copied().zip(exact_ys.iter().copied()).collect(),
                    color: BLUE,
                },
                Series {
                    label: "Euler",
                    points: xs.iter().copied().zip(euler_ys.iter().copied()).collect(),
                    color: GREEN,
                },
                Series {
                    label: "PINN",
                    points: xs.iter().copied().zip(pinn_ys.iter().copied()).collect(),
                    color: RED,
                },
            ],
        )
    });

    Ok(())
}

/// `laplace`サブコマンドを実行します。
pub fn run_laplace(args: &LaplaceArgs) -> Result<(), Box<dyn Error>> {
    let device = Default::default();
    let problem = LaplaceProblem::example();
    let config = args.train.apply(TrainingConfig::laplace());
    let n = args.grid;
    let out_dir = &args.train.out_dir;
    fs::create_dir_all(out_dir)?;
    if let Some(dir) = &args.frames {
        fs::create_dir_all(dir)?;
    }

    let points = unit_square::<MyBackend>(n, &device)?;
    println!("学習を開始します (ラプラス方程式) - バックエンド: NdArray (CPU)");
    println!(
        "=> 格子: {}x{}, エポック数: {}, ミニバッチ: {}",
        n, n, config.num_epochs, config.batch_size
    );

    let mut logger = ProgressLogger::new(args.train.log_every);
    let frame_every = args.frame_every.max(1);
    let mut observer = |epoch: &Epoch<'_, LaplaceSolution<MyBackend>, MyBackend>| {
        logger.observe(epoch);
        if let Some(dir) = &args.frames {
            if epoch.index % frame_every == 0 {
                let path = dir.join(format!("frame_{:05}.png", epoch.index));
                if let Err(e) = save_frame(&path, epoch.solution, n, epoch.index) {
                    eprintln!("フレームの保存に失敗しました: {}", e);
                }
            }
        }
    };

    let training_start = Instant::now();
    let (solution, history) = train_laplace(&problem, points, &config, &mut observer)?;
    println!("学習が完了しました。");
    println!("=> 学習時間: {:.2?}", training_start.elapsed());

    let relaxation_start = Instant::now();
    let reference = gauss_seidel(n, &problem)?;
    println!(
        "=> ガウス・ザイデル法: 計算時間: {:.2?}",
        relaxation_start.elapsed()
    );

    let pinn = solution.grid(n)?;
    let flat = |a: &ndarray::Array2<f64>| a.iter().copied().collect::<Vec<f64>>();
    println!(
        "=> 参照解との差 (内部の平均絶対誤差): {:.6e}, 最大差: {:.6e}",
        interior_mean_absolute_error(&pinn, reference.values()),
        max_abs_difference(&flat(&pinn), &flat(reference.values()))
    );

    let check_points = [[0.25, 0.25], [0.5, 0.5], [0.75, 0.3], [0.4, 0.8]];
    let gap = laplace_residual_gap(&solution, &check_points, PDE_CHECK_STEP)?;
    println!("=> 残差の検証 (自動微分と差分法の最大差): {:.3e}", gap);

    save_plot(&out_dir.join("laplace_loss.png"), |path| {
        plot_loss_history(path, history.as_slice())
    });
    save_plot(&out_dir.join("laplace_pinn.png"), |path| {
        plot_heatmap(path, "Laplace Equation (PINN)", &pinn)
    });
    save_plot(&out_dir.join("laplace_gauss_seidel.png"), |path| {
        plot_heatmap(path, "Laplace Equation (Gauss-Seidel)", reference.values())
    });
    save_plot(&out_dir.join("laplace_gradient.png"), |path| {
        plot_gradient(path, &solution)
    });

    Ok(())
}

/// グラフを保存し、結果を表示します。描画の失敗で実行は中断しません。
fn save_plot(path: &Path, draw: impl FnOnce(&Path) -> crate::Result<()>) {
    match draw(path) {
        Ok(()) => println!("=> グラフを '{}' に保存しました。", path.display()),
        Err(e) => eprintln!("グラフの描画に失敗しました: {}", e),
    }
}

fn save_frame(
    path: &Path,
    solution: &LaplaceSolution<MyBackend>,
    n: usize,
    epoch: usize,
) -> crate::Result<()> {
    let values = solution.grid(n)?;
    plot_heatmap(path, &format!("Epoch {}", epoch), &values)
}

fn plot_gradient(path: &Path, solution: &LaplaceSolution<MyBackend>) -> crate::Result<()> {
    let n = 15;
    let points = unit_square::<MyBackend>(n, solution.device())?;
    let coords = to_vec(points.clone())?;
    let grads = to_vec(solution.gradient(points))?;
    let pairs = |v: &[f64]| v.chunks(2).map(|c| (c[0], c[1])).collect::<Vec<_>>();
    plot_vector_field(path, "Gradient of PINN Solution", &pairs(&coords), &pairs(&grads))
}
