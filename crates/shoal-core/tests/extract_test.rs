use shoal_core::extract::{extract, extract_batch};
use shoal_core::geom::size;
use shoal_core::{CancelToken, CardElement, ExtractionMode, MemoryTable, NanPolicy, RecordId};

fn card(row: usize) -> CardElement {
    CardElement::single(RecordId(row), size(40.0, 60.0))
}

fn stack(rows: &[usize]) -> CardElement {
    CardElement::new(
        rows.iter().map(|&r| RecordId(r)).collect(),
        size(40.0, 60.0),
    )
}

#[test]
fn single_record_reads_the_raw_numeric_value() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![3.5, 2.0]);

    assert_eq!(extract(&table, col, &card(0), NanPolicy::DontConsider), 3.5);
    assert_eq!(extract(&table, col, &card(1), NanPolicy::DontConsider), 2.0);
}

#[test]
fn single_record_uses_the_category_index_as_ordinate() {
    let mut table = MemoryTable::new();
    let col = table.push_category(vec![2, 0, 1], 3);

    assert_eq!(extract(&table, col, &card(0), NanPolicy::DontConsider), 2.0);
    assert_eq!(extract(&table, col, &card(1), NanPolicy::DontConsider), 0.0);
}

#[test]
fn stack_aggregates_by_mean() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![1.0, 2.0, 6.0]);

    let value = extract(&table, col, &stack(&[0, 1, 2]), NanPolicy::DontConsider);
    assert_eq!(value, 3.0);
}

#[test]
fn dont_consider_excludes_missing_members() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![1.0, f64::NAN, 3.0]);

    let value = extract(&table, col, &stack(&[0, 1, 2]), NanPolicy::DontConsider);
    assert_eq!(value, 2.0);
}

#[test]
fn dont_consider_with_one_survivor_returns_it_exactly() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![f64::NAN, f64::NAN, 7.25]);

    let value = extract(&table, col, &stack(&[0, 1, 2]), NanPolicy::DontConsider);
    assert_eq!(value, 7.25);
}

#[test]
fn dont_consider_is_nan_only_when_every_member_is_missing() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![f64::NAN, f64::NAN]);

    assert!(extract(&table, col, &stack(&[0, 1]), NanPolicy::DontConsider).is_nan());
}

#[test]
fn zero_counts_missing_members_in_the_denominator() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![3.0, f64::NAN, f64::NAN]);

    let value = extract(&table, col, &stack(&[0, 1, 2]), NanPolicy::Zero);
    assert_eq!(value, 1.0);
}

#[test]
fn make_stack_nan_poisons_regardless_of_member_order() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![1.0, f64::NAN, 2.0]);

    assert!(extract(&table, col, &stack(&[0, 1, 2]), NanPolicy::MakeStackNan).is_nan());
    assert!(extract(&table, col, &stack(&[2, 1, 0]), NanPolicy::MakeStackNan).is_nan());
    assert!(extract(&table, col, &stack(&[1, 0, 2]), NanPolicy::MakeStackNan).is_nan());
}

#[test]
fn batch_order_ranks_are_a_permutation() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![10.0, -1.0, 5.0, 5.0]);
    let elements: Vec<_> = (0..4).map(card).collect();

    let ranks = extract_batch(
        &table,
        col,
        &elements,
        ExtractionMode::Order,
        NanPolicy::DontConsider,
        &CancelToken::new(),
    )
    .unwrap();

    // Ties (the two 5.0s) keep input order.
    assert_eq!(ranks, vec![3.0, 0.0, 1.0, 2.0]);

    let mut sorted = ranks.clone();
    sorted.sort_by(f64::total_cmp);
    assert_eq!(sorted, vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn batch_collapsed_ranks_share_a_rank_for_equal_values() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![3.0, 1.0, 1.0, 2.0]);
    let elements: Vec<_> = (0..4).map(card).collect();

    let ranks = extract_batch(
        &table,
        col,
        &elements,
        ExtractionMode::OrderCollapsed,
        NanPolicy::DontConsider,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(ranks, vec![2.0, 0.0, 0.0, 1.0]);
}

#[test]
fn batch_numerical_mode_returns_raw_values_index_aligned() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![4.0, 2.0, 8.0]);
    let elements: Vec<_> = (0..3).map(card).collect();

    let values = extract_batch(
        &table,
        col,
        &elements,
        ExtractionMode::Numerical,
        NanPolicy::DontConsider,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(values, vec![4.0, 2.0, 8.0]);
}

#[test]
fn batch_aborts_when_cancelled() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![1.0, 2.0]);
    let elements: Vec<_> = (0..2).map(card).collect();

    let cancel = CancelToken::new();
    cancel.cancel();

    let err = extract_batch(
        &table,
        col,
        &elements,
        ExtractionMode::Order,
        NanPolicy::DontConsider,
        &cancel,
    )
    .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn batch_on_empty_input_is_empty() {
    let mut table = MemoryTable::new();
    let col = table.push_numeric(vec![1.0]);

    let values = extract_batch(
        &table,
        col,
        &[],
        ExtractionMode::Order,
        NanPolicy::DontConsider,
        &CancelToken::new(),
    )
    .unwrap();
    assert!(values.is_empty());
}
