use shoal_core::geom::size;
use shoal_core::{CancelToken, CardElement, ColumnId, Error, MemoryTable, RecordId};
use shoal_layout::binned::BinnedStackPositioner;
use shoal_layout::cluster::{ClusterTarget, ClusteringOptions, Linkage};
use shoal_layout::curve::{CurveSamplingPositioner, CurveShape};
use shoal_layout::linear::{Axis, LinearAxisPositioner};
use shoal_layout::scatter::RankScatterPositioner;
use shoal_layout::spiral::SpiralSequencePositioner;
use shoal_layout::{Positioner, compute_layout};

fn cards(n: usize) -> Vec<CardElement> {
    (0..n)
        .map(|row| CardElement::single(RecordId(row), size(40.0, 60.0)))
        .collect()
}

fn table_with_two_columns(rows: usize) -> (MemoryTable, ColumnId, ColumnId) {
    let mut table = MemoryTable::new();
    let a = table.push_numeric((0..rows).map(|i| (i as f64) * 1.5).collect());
    let b = table.push_numeric((0..rows).map(|i| ((rows - i) as f64).sqrt()).collect());
    (table, a, b)
}

fn all_strategies(a: ColumnId, b: ColumnId) -> Vec<Positioner> {
    vec![
        Positioner::Linear(LinearAxisPositioner::new(a, Axis::X)),
        Positioner::Curve(CurveSamplingPositioner::new(a, CurveShape::GridLattice)),
        Positioner::Curve(CurveSamplingPositioner::new(a, CurveShape::Circle)),
        Positioner::Curve(CurveSamplingPositioner::new(a, CurveShape::Spiral)),
        Positioner::RankScatter(RankScatterPositioner::new(a, b)),
        Positioner::SpiralSequence(SpiralSequencePositioner::new(a)),
        Positioner::BinnedStack(BinnedStackPositioner::new(a, b)),
    ]
}

#[test]
fn every_strategy_honors_the_length_invariant() {
    for n in [0usize, 1, 2, 7, 23] {
        let (table, a, b) = table_with_two_columns(n.max(1));
        let elements = cards(n);
        let cancel = CancelToken::new();

        for mut positioner in all_strategies(a, b) {
            let outcome =
                compute_layout(&mut positioner, &elements, &table, &cancel, None).unwrap();
            assert_eq!(
                outcome.positions.len(),
                elements.len(),
                "{} with {} elements",
                positioner.name(),
                n
            );
            if let Some(clusters) = &outcome.clusters {
                assert_eq!(clusters.len(), elements.len());
            }
        }
    }
}

#[test]
fn every_strategy_reports_its_capabilities() {
    let (_, a, b) = table_with_two_columns(2);
    for positioner in all_strategies(a, b) {
        assert!(positioner.requires_data_accessor());
    }

    assert!(
        Positioner::Linear(LinearAxisPositioner::new(a, Axis::X))
            .supports_single_element_positioning()
    );
    assert!(
        !Positioner::SpiralSequence(SpiralSequencePositioner::new(a))
            .supports_single_element_positioning()
    );
    assert!(
        !Positioner::RankScatter(RankScatterPositioner::new(a, b))
            .supports_single_element_positioning()
    );
}

#[test]
fn text_columns_are_rejected_before_any_positioning() {
    let mut table = MemoryTable::new();
    let text = table.push_text(vec!["a".into(), "b".into()]);
    let elements = cards(2);
    let cancel = CancelToken::new();

    let mut positioner = Positioner::Linear(LinearAxisPositioner::new(text, Axis::X));
    let err = compute_layout(&mut positioner, &elements, &table, &cancel, None).unwrap_err();
    assert!(matches!(err, Error::UnsupportedColumnType { .. }));
    assert!(err.is_configuration());
}

#[test]
fn out_of_range_columns_are_rejected() {
    let mut table = MemoryTable::new();
    table.push_numeric(vec![1.0, 2.0]);
    let elements = cards(2);
    let cancel = CancelToken::new();

    let mut positioner = Positioner::Linear(LinearAxisPositioner::new(ColumnId(5), Axis::X));
    let err = compute_layout(&mut positioner, &elements, &table, &cancel, None).unwrap_err();
    assert!(matches!(err, Error::ColumnOutOfRange { .. }));
}

#[test]
fn requested_clustering_groups_by_proximity() {
    let (table, a, _) = table_with_two_columns(6);
    let elements = cards(6);
    let cancel = CancelToken::new();

    let mut positioner = Positioner::Linear(LinearAxisPositioner::new(a, Axis::X));
    let clustering = ClusteringOptions::new(Linkage::Single, ClusterTarget::Slider(1.0));
    let outcome =
        compute_layout(&mut positioner, &elements, &table, &cancel, Some(&clustering)).unwrap();

    let clusters = outcome.clusters.expect("clustering was requested");
    assert!(clusters.iter().all(|&id| id == clusters[0]));
}

#[test]
fn slider_zero_keeps_every_element_its_own_cluster() {
    let (table, a, _) = table_with_two_columns(5);
    let elements = cards(5);
    let cancel = CancelToken::new();

    let mut positioner = Positioner::Linear(LinearAxisPositioner::new(a, Axis::X));
    let clustering = ClusteringOptions::new(Linkage::Upgma, ClusterTarget::Slider(0.0));
    let outcome =
        compute_layout(&mut positioner, &elements, &table, &cancel, Some(&clustering)).unwrap();

    let mut ids = outcome.clusters.unwrap();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn invalid_cluster_target_fails_before_positioning() {
    let (table, a, _) = table_with_two_columns(3);
    let elements = cards(3);
    let cancel = CancelToken::new();

    let mut positioner = Positioner::Linear(LinearAxisPositioner::new(a, Axis::X));
    let clustering = ClusteringOptions::new(Linkage::Single, ClusterTarget::Count(9));
    let err = compute_layout(&mut positioner, &elements, &table, &cancel, Some(&clustering))
        .unwrap_err();
    assert!(matches!(err, Error::ClusterTargetOutOfRange { .. }));
}

#[test]
fn layouts_without_stacking_or_clustering_produce_no_grouping() {
    let (table, a, b) = table_with_two_columns(4);
    let elements = cards(4);
    let cancel = CancelToken::new();

    let mut positioner = Positioner::RankScatter(RankScatterPositioner::new(a, b));
    let outcome = compute_layout(&mut positioner, &elements, &table, &cancel, None).unwrap();
    assert!(outcome.clusters.is_none());
}

#[test]
fn cancellation_aborts_the_pipeline() {
    let (table, a, b) = table_with_two_columns(4);
    let elements = cards(4);
    let cancel = CancelToken::new();
    cancel.cancel();

    for mut positioner in all_strategies(a, b) {
        let err = compute_layout(&mut positioner, &elements, &table, &cancel, None).unwrap_err();
        assert!(err.is_cancelled(), "{}", positioner.name());
    }
}

#[test]
fn config_round_trips_for_every_strategy() {
    let (_, a, b) = table_with_two_columns(2);
    for positioner in all_strategies(a, b) {
        let snapshot = positioner.config();

        // Persisting and restoring through JSON reproduces the snapshot.
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: shoal_core::PropertyMap = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot, "{}", positioner.name());

        let mut fresh = positioner.clone();
        fresh.apply_config(&restored).unwrap();
        assert_eq!(fresh.config(), snapshot, "{}", positioner.name());
    }
}

#[test]
fn unknown_properties_are_rejected() {
    let (_, a, b) = table_with_two_columns(2);
    for mut positioner in all_strategies(a, b) {
        let mut props = shoal_core::PropertyMap::new();
        props.set("no-such-knob", 1.0);
        let err = positioner.apply_config(&props).unwrap_err();
        assert!(matches!(err, Error::UnknownProperty { .. }), "{}", positioner.name());
    }
}
