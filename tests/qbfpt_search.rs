//! End-to-end behavior of Tabu Search on QBF-PT instances.

use proptest::prelude::*;
use qbfpt_tabu::qbf::{InstanceParser, QbfModel};
use qbfpt_tabu::tabu::{Move, Objective, TabuConfig, TabuRunner, TabuSearch};
use qbfpt_tabu::{QbfError, QbfPt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_problem(size: usize, seed: u64) -> QbfPt {
    let mut rng = StdRng::seed_from_u64(seed);
    let upper: Vec<f64> = (0..size * (size + 1) / 2)
        .map(|_| rng.random_range(-10..=10) as f64)
        .collect();
    QbfPt::new(QbfModel::from_upper_triangle(size, &upper).unwrap())
}

/// Best feasible value by enumerating every subset.
fn brute_force(problem: &QbfPt, objective: Objective) -> f64 {
    let n = problem.model().size();
    let mut best: Option<f64> = None;
    for mask in 0u32..(1 << n) {
        let sol = problem
            .model()
            .solution((0..n).filter(|&i| mask & (1 << i) != 0));
        if !problem.triples().is_feasible(&sol) {
            continue;
        }
        if best.is_none_or(|b| objective.is_better(sol.cost(), b)) {
            best = Some(sol.cost());
        }
    }
    best.unwrap_or(0.0)
}

#[test]
fn test_identity_four_variables_hits_feasible_optimum() {
    let model = InstanceParser::parse("4\n1 0 0 0\n1 0 0\n1 0\n1").unwrap();
    let problem = QbfPt::new(model);
    assert_eq!(problem.triples().triples(), &[[0, 1, 3], [1, 2, 3], [1, 2, 3], [0, 1, 3]]);

    // the full set is cut off by the triples, so three is the ceiling
    assert_eq!(brute_force(&problem, Objective::Maximize), 3.0);

    for seed in 0..5 {
        let config = TabuConfig::default()
            .with_tenure(1)
            .with_max_iterations(100)
            .with_seed(seed);
        let result = problem.solve(&config).unwrap();
        assert_eq!(result.best_value, 3.0, "seed {seed}");
        assert_eq!(result.best.len(), 3);
        assert!(problem.triples().is_feasible(&result.best));
    }
}

#[test]
fn test_three_variables_never_select_all() {
    let model = QbfModel::from_upper_triangle(3, &[1.0; 6]).unwrap();
    let problem = QbfPt::new(model);
    assert_eq!(problem.triples().triples(), &[[0, 1, 2]; 3]);

    let config = TabuConfig::default()
        .with_tenure(1)
        .with_max_iterations(50)
        .with_power_moves(true)
        .with_max_age(2)
        .with_seed(11);
    let mut engine = TabuSearch::new(&problem, config).unwrap();
    for _ in 0..50 {
        engine.step();
        assert!(engine.current().len() < 3);
    }
    assert_eq!(engine.best().cost(), brute_force(&problem, Objective::Maximize));
    assert_eq!(engine.best().cost(), 3.0);
}

#[test]
fn test_recently_toggled_index_needs_aspiration() {
    let tenure = 3;
    let problem = random_problem(12, 4);
    let config = TabuConfig::default()
        .with_tenure(tenure)
        .with_max_iterations(300)
        .with_seed(8);
    let mut engine = TabuSearch::new(&problem, config).unwrap();
    let mut last_toggle: Vec<Option<usize>> = vec![None; 12];

    for _ in 0..300 {
        let report = engine.step();
        for executed in &report.moves {
            for index in executed.mv.indices() {
                if let Some(previous) = last_toggle[index] {
                    if report.iteration - previous <= tenure {
                        assert!(
                            executed.aspiration,
                            "index {index} toggled at {previous} and again at {} without aspiration",
                            report.iteration
                        );
                    }
                }
            }
        }
        for executed in &report.moves {
            for index in executed.mv.indices() {
                last_toggle[index] = Some(report.iteration);
            }
        }
    }
}

#[test]
fn test_power_moves_and_restart_together() {
    let problem = random_problem(20, 21);
    let config = TabuConfig::default()
        .with_tenure(2)
        .with_max_iterations(400)
        .with_power_moves(true)
        .with_restart(true)
        .with_max_age(3)
        .with_seed(5);
    let mut engine = TabuSearch::new(&problem, config).unwrap();

    let mut compound = 0;
    for _ in 0..400 {
        let report = engine.step();
        compound += report.moves.iter().filter(|m| m.mv.is_compound()).count();
        assert!(report.moves.len() <= 3);
        assert!(problem.triples().is_feasible(engine.current()));
        assert_eq!(engine.tabu_list().capacity(), 12);
    }
    assert!(engine.power_phases() > 0);
    assert!(engine.restarts() > 0);
    assert!(compound > 0);
}

#[test]
fn test_compound_moves_only_in_power_phases() {
    let problem = random_problem(15, 2);
    let config = TabuConfig::default()
        .with_tenure(2)
        .with_power_moves(true)
        .with_max_age(3)
        .with_seed(13);
    let mut engine = TabuSearch::new(&problem, config).unwrap();

    for _ in 0..200 {
        let report = engine.step();
        if !report.power_phase {
            assert!(report.moves.iter().all(|m| !m.mv.is_compound()));
        }
        for executed in report.moves.iter().skip(1) {
            assert!(matches!(executed.mv, Move::PairInsert(..) | Move::PairRemove(..)));
        }
    }
}

#[test]
fn test_load_instance_file() {
    let path = std::env::temp_dir().join(format!("qbfpt-{}.txt", std::process::id()));
    std::fs::write(&path, "3\n2 -1 0\n3 -4\n1\n").unwrap();

    let problem = QbfPt::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(problem.model().size(), 3);
    assert_eq!(problem.model().coefficient(0, 1), -1.0);
    assert_eq!(problem.model().coefficient(1, 0), 0.0);

    let result = problem
        .solve(&TabuConfig::default().with_tenure(1).with_max_iterations(30).with_seed(1))
        .unwrap();
    assert_eq!(result.best_value, brute_force(&problem, Objective::Maximize));
}

#[test]
fn test_missing_file_reports_path() {
    let err = QbfPt::load("/nonexistent/qbfpt/instance.txt").unwrap_err();
    assert!(matches!(err, QbfError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/qbfpt/instance.txt"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_runs_stay_feasible_and_consistent(
        size in 1usize..14,
        instance_seed in any::<u64>(),
        run_seed in any::<u64>(),
        tenure in 1usize..5,
        best_improving in any::<bool>(),
        power_moves in any::<bool>(),
        restart in any::<bool>(),
        minimize in any::<bool>(),
    ) {
        let problem = random_problem(size, instance_seed);
        let objective = if minimize { Objective::Minimize } else { Objective::Maximize };
        let config = TabuConfig::default()
            .with_tenure(tenure)
            .with_max_iterations(60)
            .with_best_improving(best_improving)
            .with_power_moves(power_moves)
            .with_restart(restart)
            .with_max_age(5)
            .with_objective(objective)
            .with_seed(run_seed);
        let mut engine = TabuSearch::new(&problem, config).unwrap();

        let mut previous_best = engine.best().cost();
        for _ in 0..60 {
            let report = engine.step();
            prop_assert!(problem.triples().is_feasible(engine.current()));
            prop_assert_eq!(report.value, problem.model().evaluate(engine.current()));
            prop_assert_eq!(engine.current().cost(), report.value);

            let best = engine.best().cost();
            prop_assert!(!objective.is_better(previous_best, best));
            prop_assert!(!objective.is_better(report.value, best));
            previous_best = best;
        }
        prop_assert!(problem.triples().is_feasible(engine.best()));
        prop_assert_eq!(engine.best().cost(), problem.model().evaluate(engine.best()));
    }

    #[test]
    fn prop_small_runs_never_beat_brute_force(
        size in 3usize..9,
        instance_seed in any::<u64>(),
        run_seed in any::<u64>(),
    ) {
        let problem = random_problem(size, instance_seed);
        let optimum = brute_force(&problem, Objective::Maximize);
        let result = TabuRunner::run(
            &problem,
            &TabuConfig::default().with_tenure(2).with_max_iterations(80).with_seed(run_seed),
        )
        .unwrap();
        prop_assert!(result.best_value <= optimum);
        prop_assert!(result.best_value >= 0.0);
    }
}
