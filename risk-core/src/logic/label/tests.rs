use super::*;
use crate::logic::features::{demo_table, FeatureBuilder, FeatureTable, FeatureVector, LabeledRow};

fn safe() -> FeatureVector {
    FeatureVector::new(95.0, 85.0, 0.0, 50_000.0, 1.0)
}

#[test]
fn test_safe_record_is_zero() {
    assert_eq!(LabelThresholds::default().label(&safe()), 0);
}

#[test]
fn test_grade_floor_is_exclusive() {
    let rule = LabelThresholds::default();
    assert_eq!(rule.label(&FeatureVector { grade: 64.0, ..safe() }), 1);
    assert_eq!(rule.label(&FeatureVector { grade: 65.0, ..safe() }), 0);
}

#[test]
fn test_attendance_floor_is_exclusive() {
    let rule = LabelThresholds::default();
    assert_eq!(rule.label(&FeatureVector { attendance: 74.0, ..safe() }), 1);
    assert_eq!(rule.label(&FeatureVector { attendance: 75.0, ..safe() }), 0);
}

#[test]
fn test_violation_ceiling() {
    let rule = LabelThresholds::default();
    assert_eq!(rule.label(&FeatureVector { violations: 9.0, ..safe() }), 0);
    assert_eq!(rule.label(&FeatureVector { violations: 10.0, ..safe() }), 1);
}

#[test]
fn test_allowance_needs_sibling_condition() {
    let rule = LabelThresholds::default();
    let poor = FeatureVector { allowance: 9_999.0, sibling_count: 3.0, ..safe() };
    assert_eq!(rule.label(&poor), 1);
    assert_eq!(rule.label(&FeatureVector { allowance: 10_000.0, ..poor }), 0);
    assert_eq!(rule.label(&FeatureVector { sibling_count: 2.0, ..poor }), 0);
}

#[test]
fn test_custom_thresholds() {
    let strict = LabelThresholds {
        grade_floor: 70.0,
        violation_ceiling: 40.0,
        ..Default::default()
    };
    let f = FeatureVector { grade: 68.0, violations: 20.0, ..safe() };
    assert_eq!(strict.label(&f), 1);
    assert_eq!(LabelThresholds::default().label(&f), 1);

    let f = FeatureVector { grade: 80.0, violations: 20.0, ..safe() };
    assert_eq!(strict.label(&f), 0);
}

#[test]
fn test_override_wins_over_formula() {
    let rule = LabelThresholds::default();
    let risky = FeatureVector { grade: 10.0, ..safe() };

    assert_eq!(rule.resolve(&LabeledRow::with_override(risky, false)), 0);
    assert_eq!(rule.resolve(&LabeledRow::with_override(safe(), true)), 1);
    assert_eq!(rule.resolve(&LabeledRow::new(risky)), 1);
}

#[test]
fn test_label_is_pure() {
    let rule = LabelThresholds::default();
    let table = FeatureBuilder::new().build(vec![demo_table()]).unwrap();

    let first = label_table(&table, &rule);
    let second = label_table(&table, &rule);
    assert_eq!(first, second);
    assert!(first.iter().all(|&l| l <= 1));
}

#[test]
fn test_demo_table_balance() {
    let table = FeatureBuilder::new().build(vec![demo_table()]).unwrap();
    let labels = label_table(&table, &LabelThresholds::default());
    let balance = ClassBalance::from_labels(&labels);

    assert_eq!(balance, ClassBalance { safe: 7, at_risk: 3 });
    assert_eq!(balance.total(), 10);
}

#[test]
fn test_malformed_values_accepted() {
    let rule = LabelThresholds::default();
    let negative = FeatureVector::new(-5.0, 90.0, -1.0, -100.0, 0.0);
    assert_eq!(rule.label(&negative), 1);

    let table = FeatureTable::from_rows(vec![LabeledRow::new(negative)]);
    assert_eq!(label_table(&table, &rule), vec![1]);
}
