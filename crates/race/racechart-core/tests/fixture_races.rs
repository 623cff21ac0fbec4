use racechart_core::{
    compute_all, Config, Engine, EntityStore, Filter, ManualFrames, PlaybackState, RaceParams,
    RawTable, ValueMode,
};
use racechart_test_fixtures::datasets;

fn season_wins() -> RawTable {
    let raw = datasets::json("season-wins").expect("season-wins fixture");
    RawTable::from_json(&raw).expect("season-wins parses")
}

#[test]
fn fixtures_are_listed() {
    let keys = datasets::keys();
    assert!(keys.contains(&"season-wins".to_string()));
    assert!(keys.contains(&"two-team-tie".to_string()));
}

/// it should produce cumulative totals that never decrease across the season
#[test]
fn season_totals_are_monotonic() {
    let table = season_wins();
    let store = EntityStore::from_table(&table).unwrap();
    let (first, last) = store.unit_bounds();
    assert_eq!((first, last), (2015, 2024));
    for entity in store.entities() {
        let mut prev = 0.0;
        for unit in first..=last {
            let v = store.cumulative_value(entity.id.as_str(), unit);
            assert!(v >= prev, "{} dropped at {unit}", entity.id);
            prev = v;
        }
    }
    // KC: 11 + 12 + 10 + 12 + 12 + 14 + 12 + 14 + 11 + 15
    assert_eq!(store.cumulative_value("KC", 2024), 123.0);
}

/// it should only rank conference members under a category filter
#[test]
fn conference_filter_restricts_rankings() {
    let table = season_wins();
    let store = EntityStore::from_table(&table).unwrap();
    let params = RaceParams::new(2015, 2024, 3).with_filter(Filter::Category("AFC".into()));
    let snapshots = compute_all(&store, &params);
    for snap in snapshots.iter() {
        assert!(snap.len() <= 3);
        for s in &snap.standings {
            assert!(store.entity(s.id.as_str()).unwrap().has_tag("AFC"));
        }
    }
    assert_eq!(snapshots.get(2024).unwrap().standings[0].id.as_str(), "KC");
}

/// it should rank single-season wins in per-unit mode
#[test]
fn per_unit_mode_ranks_each_season() {
    let table = season_wins();
    let store = EntityStore::from_table(&table).unwrap();
    let params = RaceParams::new(2024, 2024, 2).with_value_mode(ValueMode::PerUnit);
    let snap = compute_all(&store, &params);
    let top: Vec<(&str, f64)> = snap
        .get(2024)
        .unwrap()
        .standings
        .iter()
        .map(|s| (s.id.as_str(), s.value))
        .collect();
    // Detroit and Kansas City both won 15; names break the tie
    assert_eq!(top, vec![("DET", 15.0), ("KC", 15.0)]);
}

/// it should race the whole fixture and land on the final standings
#[test]
fn full_season_playback() {
    let host = ManualFrames::new();
    let mut engine = Engine::with_scheduler(Config::default(), Box::new(host.clone()));
    engine.load_table(&season_wins()).unwrap();
    engine.configure(RaceParams::new(2015, 2024, 5)).unwrap();
    engine.player().unwrap().set_speed(3.0).unwrap();
    engine.player().unwrap().play().unwrap();

    let mut now = 0.0;
    let mut frames = 0;
    while let Some(token) = host.next() {
        if let Some(out) = engine.tick(token, now) {
            frames += 1;
            assert!(out.frame.entries.len() <= 5);
            for w in out.frame.entries.windows(2) {
                assert!(w[0].value >= w[1].value);
            }
        }
        now += 16.0;
        assert!(frames < 100_000, "playback never finished");
    }

    assert_eq!(engine.state(), Some(PlaybackState::Finished));
    let last = engine.current_frame().unwrap();
    let expected = &engine.snapshots().unwrap().get(2024).unwrap().standings;
    let got: Vec<&str> = last.frame.entries.iter().map(|e| e.id.as_str()).collect();
    let want: Vec<&str> = expected.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(got, want);
}

/// it should resolve the fixture's 2022 tie by display name
#[test]
fn two_team_tie_fixture() {
    let raw = datasets::json("two-team-tie").unwrap();
    let store = EntityStore::from_table(&RawTable::from_json(&raw).unwrap()).unwrap();
    let snap = compute_all(&store, &RaceParams::new(2021, 2023, 2));
    let ids: Vec<&str> = snap
        .get(2022)
        .unwrap()
        .standings
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["A", "B"]);
}
