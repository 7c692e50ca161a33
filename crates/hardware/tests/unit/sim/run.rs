//! # Run Tests
//!
//! Start conventions, bounds, results, and the tagged JSON export.

use matviz_core::sim::{Run, Trace};
use matviz_core::{Matrix, Model, SimError};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::fixtures::{example_a, example_b, example_product};

#[rstest]
#[case(Model::Sequential, None, 7)]
#[case(Model::Parallel, None, 2)]
#[case(Model::Systolic, Some(0), 5)]
fn bounds_per_model(#[case] model: Model, #[case] start: Option<usize>, #[case] last: usize) {
    let run = Run::generate(model, &example_a(), &example_b()).unwrap();
    assert_eq!(run.model(), model);
    assert_eq!(run.size(), 2);
    assert_eq!(run.start_index(), start);
    assert_eq!(run.last_index(), Some(last));
    assert_eq!(run.result(), example_product());
}

#[test]
fn total_cycles_exclude_initial_state() {
    let m = Matrix::ones(8);
    let cycles: Vec<usize> = Model::ALL
        .iter()
        .map(|&model| Run::generate(model, &m, &m).unwrap().total_cycles())
        .collect();
    assert_eq!(cycles, vec![512, 8, 23]);
}

#[test]
fn snapshot_past_the_end_is_none() {
    let run = Run::generate(Model::Parallel, &example_a(), &example_b()).unwrap();
    assert!(run.snapshot_at(2).is_some());
    assert!(run.snapshot_at(3).is_none());
}

#[test]
fn clones_share_steps() {
    let run = Run::generate(Model::Systolic, &example_a(), &example_b()).unwrap();
    let copy = run.clone();
    let (Run::Systolic(a), Run::Systolic(b)) = (&run, &copy) else {
        panic!("expected systolic runs");
    };
    assert!(std::ptr::eq(a.steps().as_ptr(), b.steps().as_ptr()));
}

#[test]
fn json_export_is_tagged_by_model() {
    let run = Run::generate(Model::Sequential, &example_a(), &example_b()).unwrap();
    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["model"], "Sequential");
    assert_eq!(json["n"], 2);
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 8);
    assert_eq!(steps[0]["delta"], 5);
    assert_eq!(steps[0]["after_matrix"], serde_json::json!([[5, 0], [0, 0]]));
}

#[test]
fn parallel_export_includes_partial_products() {
    let run = Run::generate(Model::Parallel, &example_a(), &example_b()).unwrap();
    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["partial_products"]["n"], 2);
    assert_eq!(json["steps"][0]["active_k"], serde_json::Value::Null);
    assert_eq!(json["steps"][1]["active_k"], 0);
}

#[test]
fn mismatched_operands_are_rejected() {
    for model in Model::ALL {
        let err = Run::generate(model, &Matrix::ones(3), &Matrix::ones(2)).unwrap_err();
        assert!(matches!(err, SimError::DimensionMismatch { left: 3, right: 2 }));
    }
}
