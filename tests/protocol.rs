//! End-to-end tests of trials, reports and the full protocol.
use castbench::class::{balanced, deep, shallow, Unrelated};
use castbench::{
    run_trial, BenchConfig, CastKind, Harness, Hierarchy, Pass, Preset, Reporter, Sink, Skew,
    Strategy,
};
use log::info;

mod helper;

#[test]
fn casts_from_g() {
    helper::init_logger();
    let catalog = helper::catalog();
    let dataset = helper::dataset(&catalog, Hierarchy::Deep, Skew::single(6), 1_000);
    let mut sink = Sink::new();

    let result = run_trial(&dataset, &Strategy::baseline(), &mut sink);
    assert_eq!(result.successes, 1_000);
    assert_eq!(result.len, 1_000);
    assert_eq!(sink.value(), 0.0);

    for kind in CastKind::ALL {
        let to_g = kind.strategy_for::<deep::G>(&catalog).unwrap();
        let result = run_trial(&dataset, &to_g, &mut sink);
        assert_eq!(result.successes, 1_000, "{} to G", kind);

        let to_b = kind.strategy_for::<deep::B>(&catalog).unwrap();
        assert_eq!(run_trial(&dataset, &to_b, &mut sink).successes, 1_000);

        let to_h = kind.strategy_for::<deep::H>(&catalog).unwrap();
        assert_eq!(run_trial(&dataset, &to_h, &mut sink).successes, 0);

        let to_z = kind.strategy_for::<Unrelated>(&catalog).unwrap();
        let result = run_trial(&dataset, &to_z, &mut sink);
        assert_eq!(result.successes, 0, "{} to Z", kind);
        info!("{} to Z: {:.1} casts/s", kind, result.rate());
    }
    // Every failed cast is folded into the sink.
    assert_eq!(sink.value(), (CastKind::ALL.len() * 2_000) as f64);
}

#[test]
fn balanced_branches() {
    let catalog = helper::catalog();
    let dataset = helper::dataset(&catalog, Hierarchy::Balanced, Skew::new(0, 7), 8_000);
    let counts = dataset.class_counts();
    let count = |slot: usize| counts[&catalog.slot(Hierarchy::Balanced, slot).unwrap()] as u64;

    let mut sink = Sink::new();
    for kind in CastKind::ALL {
        // B has the children C and D.
        let to_b = kind.strategy_for::<balanced::B>(&catalog).unwrap();
        let expected = count(1) + count(2) + count(3);
        assert_eq!(run_trial(&dataset, &to_b, &mut sink).successes, expected);

        // E has the children F, G and H.
        let to_e = kind.strategy_for::<balanced::E>(&catalog).unwrap();
        let expected = count(4) + count(5) + count(6) + count(7);
        assert_eq!(run_trial(&dataset, &to_e, &mut sink).successes, expected);
    }
}

#[test]
fn baselines_per_pass() {
    let catalog = helper::catalog();
    let dataset = helper::dataset(&catalog, Hierarchy::Shallow, Skew::single(1), 100_000);
    let baseline = Strategy::baseline();
    let to_b = CastKind::Ancestry.strategy_for::<shallow::B>(&catalog).unwrap();
    let mut sink = Sink::new();
    let mut reporter = Reporter::new(Vec::new());

    for pass in Pass::ALL {
        reporter.begin_pass(pass.title()).unwrap();
        let first = run_trial(&dataset, &baseline, &mut sink);
        assert_eq!(reporter.trial("-", &first, false).unwrap(), 1.0);
        assert_eq!(reporter.baseline(), Some(first.rate()));

        let second = run_trial(&dataset, &to_b, &mut sink);
        let percent = reporter.trial("B", &second, true).unwrap();
        assert_eq!(percent, second.rate() / first.rate());
    }
}

#[test]
fn full_run() {
    helper::init_logger();
    let config = BenchConfig::default().with_len(500).with_seed(helper::SEED);
    let mut harness = Harness::new(config).unwrap();
    let presets: Vec<_> = harness.datasets().map(|(preset, _)| preset).collect();
    assert_eq!(presets.len(), 7);
    assert_eq!(presets[6], Preset::Mixed);

    let out = String::from_utf8(harness.run(Vec::new()).unwrap()).unwrap();
    assert!(out.contains("## Run 0 (discard)"));
    assert!(out.contains("## Run 1 (objects aligned)"));
    assert!(out.contains("## Run 2 (objects shuffled)"));
    assert!(out.contains("#### Cast type: Mostly failed (cast from class B)"));
    assert!(out.contains("### Class hierarchy: balanced"));
    // 3 passes, 7 datasets, 3 implementations.
    assert_eq!(out.matches("AVG: ").count(), 63);
    assert!(harness.sink().value() > 0.0);
    assert!(out.trim_end().ends_with(&format!("{:.6}", harness.sink().value())));
}
