use racechart_core::{
    compute_all, rank_cmp, Entity, EntityStore, Filter, Interpolator, MissingSidePolicy,
    RaceError, RaceParams, RawTable,
};

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn two_team_table() -> RawTable {
    let mut t = RawTable::new(2021..=2023);
    t.push_series(Entity::new("A", "A"), &[3.0, 4.0, 5.0]);
    t.push_series(Entity::new("B", "B"), &[5.0, 2.0, 1.0]);
    t
}

fn ranking(store: &EntityStore, params: &RaceParams, unit: i32) -> Vec<(String, f64)> {
    compute_all(store, params)
        .get(unit)
        .expect("unit in range")
        .standings
        .iter()
        .map(|s| (s.id.to_string(), s.value))
        .collect()
}

/// it should rank the two-team scenario and resolve the 2022 tie by display name
#[test]
fn two_team_scenario() {
    let store = EntityStore::from_table(&two_team_table()).unwrap();
    assert_eq!(
        (2021..=2023)
            .map(|u| store.cumulative_value("A", u))
            .collect::<Vec<_>>(),
        vec![3.0, 7.0, 12.0]
    );
    assert_eq!(
        (2021..=2023)
            .map(|u| store.cumulative_value("B", u))
            .collect::<Vec<_>>(),
        vec![5.0, 7.0, 8.0]
    );

    let params = RaceParams::new(2021, 2023, 2);
    assert_eq!(
        ranking(&store, &params, 2021),
        vec![("B".into(), 5.0), ("A".into(), 3.0)]
    );
    assert_eq!(
        ranking(&store, &params, 2022),
        vec![("A".into(), 7.0), ("B".into(), 7.0)]
    );
    assert_eq!(
        ranking(&store, &params, 2023),
        vec![("A".into(), 12.0), ("B".into(), 8.0)]
    );
}

/// it should break ties on display name, not on id or catalog position
#[test]
fn tie_break_uses_display_name() {
    let mut t = RawTable::new([1]);
    t.push_series(Entity::new("id-1", "Zephyrs"), &[4.0]);
    t.push_series(Entity::new("id-2", "Aces"), &[4.0]);
    let store = EntityStore::from_table(&t).unwrap();
    let r = ranking(&store, &RaceParams::new(1, 1, 5), 1);
    assert_eq!(r[0].0, "id-2");
    assert_eq!(r[1].0, "id-1");
}

/// it should blend [10, 20] -> [14, 24] into [12, 22] at the midpoint
#[test]
fn midpoint_interpolation() {
    let mut t = RawTable::new([0, 1]);
    t.push_series(Entity::new("lo", "Low"), &[10.0, 4.0]);
    t.push_series(Entity::new("hi", "High"), &[20.0, 4.0]);
    let store = EntityStore::from_table(&t).unwrap();
    let mut interp = Interpolator::new(
        compute_all(&store, &RaceParams::new(0, 1, 2)),
        MissingSidePolicy::Zero,
        1e-6,
    );
    let frame = interp.at(0.5);
    let values: Vec<f64> = frame.entries.iter().map(|e| e.value).collect();
    assert_eq!(values.len(), 2);
    approx(values[0], 22.0, 1e-12);
    approx(values[1], 12.0, 1e-12);
}

/// it should return exactly the precomputed snapshot at every integer unit
#[test]
fn integer_times_match_snapshots() {
    let store = EntityStore::from_table(&two_team_table()).unwrap();
    let table = compute_all(&store, &RaceParams::new(2021, 2023, 2));
    let mut interp = Interpolator::new(table.clone(), MissingSidePolicy::Zero, 1e-6);
    for snap in table.iter() {
        let frame = interp.at(snap.unit as f64).clone();
        let got: Vec<(&str, f64)> = frame
            .entries
            .iter()
            .map(|e| (e.id.as_str(), e.value))
            .collect();
        let want: Vec<(&str, f64)> = snap
            .standings
            .iter()
            .map(|s| (s.id.as_str(), s.value))
            .collect();
        assert_eq!(got, want, "unit {}", snap.unit);
    }
}

/// it should never let an all-zero entity into a snapshot
#[test]
fn zero_entity_never_appears() {
    let mut t = two_team_table();
    t.push_series(Entity::new("Z", "Zeroes"), &[0.0, 0.0, 0.0]);
    let store = EntityStore::from_table(&t).unwrap();
    let table = compute_all(&store, &RaceParams::new(2021, 2023, 10));
    for snap in table.iter() {
        assert!(snap.standings.iter().all(|s| s.id.as_str() != "Z"));
    }
}

/// it should keep every snapshot within top_n and strictly ordered
#[test]
fn snapshots_are_bounded_and_strictly_ordered() {
    let mut t = RawTable::new(0..=4);
    for i in 0..8 {
        let name = format!("team{i}");
        let series: Vec<f64> = (0..5).map(|u| ((i * 7 + u * 3) % 5) as f64).collect();
        t.push_series(Entity::new(name.as_str(), name.as_str()), &series);
    }
    let store = EntityStore::from_table(&t).unwrap();
    for top_n in 1..=5 {
        let table = compute_all(&store, &RaceParams::new(0, 4, top_n));
        for snap in table.iter() {
            assert!(snap.len() <= top_n);
            for w in snap.standings.windows(2) {
                assert_eq!(rank_cmp(&w[0], &w[1]), std::cmp::Ordering::Less);
            }
        }
    }
}

/// it should report an empty mapping when the filter excludes every positive entity
#[test]
fn empty_filter_result_is_not_an_error() {
    let store = EntityStore::from_table(&two_team_table()).unwrap();
    let params = RaceParams::new(2021, 2023, 2).with_filter(Filter::Category("none".into()));
    assert!(compute_all(&store, &params).is_empty());
}

/// it should reject a table whose declared unit has no values at all
#[test]
fn missing_unit_is_a_data_error() {
    let raw = r#"{
        "units": [2021, 2022],
        "entities": [{ "id": "A", "display_name": "A" }],
        "values": { "A": { "2021": 1 } }
    }"#;
    let table = RawTable::from_json(raw).unwrap();
    let err = EntityStore::from_table(&table).unwrap_err();
    assert_eq!(err, RaceError::MissingTimeUnit { unit: 2022 });
    assert!(err.is_data_error());
}
