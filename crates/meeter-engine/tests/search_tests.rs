//! Tests for the constrained best-window search.

use chrono::{NaiveDate, NaiveDateTime};
use meeter_engine::aggregate::{aggregate, CountGrid};
use meeter_engine::error::MeetError;
use meeter_engine::grid::{TimeGrid, DAYS, SLOTS_PER_DAY};
use meeter_engine::search::{
    best_candidates, best_windows, ScoredWindow, SearchConfig, SearchConstraints,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn origin() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn counts_of(grids: &[TimeGrid]) -> CountGrid {
    aggregate(grids).unwrap()
}

fn window(score: u64, day: usize, slot: usize) -> ScoredWindow {
    ScoredWindow { score, day, slot }
}

// ── Config ──────────────────────────────────────────────────────────────────

#[test]
fn default_config_matches_documented_defaults() {
    let config = SearchConfig::default();
    assert_eq!(config.cutoff, 3);
    assert_eq!(config.search_delay_minutes, 120);
    assert_eq!(config.default_length, 6);
}

#[test]
fn config_fields_default_when_missing_from_json() {
    let config: SearchConfig = serde_json::from_str(r#"{"cutoff": 5}"#).unwrap();
    assert_eq!(config.cutoff, 5);
    assert_eq!(config.search_delay_minutes, 120);
    assert_eq!(config.default_length, 6);
}

#[test]
fn negative_search_delay_is_rejected() {
    let config = SearchConfig {
        search_delay_minutes: -30,
        ..SearchConfig::default()
    };
    assert!(matches!(config.validate(), Err(MeetError::InvalidInput(_))));
    assert!(SearchConfig::default().validate().is_ok());
}

#[test]
fn earliest_start_is_none_when_not_representable() {
    let huge = SearchConfig {
        search_delay_minutes: i64::MAX,
        ..SearchConfig::default()
    };
    assert_eq!(huge.earliest_start(at(16, 9, 0)), None);

    let far = SearchConfig {
        search_delay_minutes: 1_000_000_000_000,
        ..SearchConfig::default()
    };
    assert_eq!(far.earliest_start(at(16, 9, 0)), None);

    assert_eq!(
        SearchConfig::default().earliest_start(at(16, 9, 0)),
        Some(at(16, 11, 0))
    );
}

// ── Constraint resolution ───────────────────────────────────────────────────

#[test]
fn resolve_uses_earliest_instant_for_first_day_and_slot() {
    let c = SearchConstraints::resolve(origin(), at(18, 10, 45), 6, None, (0, SLOTS_PER_DAY));

    assert_eq!(c.min_day, 2);
    assert_eq!(c.first_day_slot, Some(21));
    assert_eq!(c.max_day, DAYS as i64 - 1);
    assert_eq!((c.min_slot, c.max_slot), (0, SLOTS_PER_DAY));
}

#[test]
fn resolve_before_origin_starts_at_day_zero_without_clamp() {
    let c = SearchConstraints::resolve(origin(), at(15, 22, 0), 6, None, (0, SLOTS_PER_DAY));

    assert_eq!(c.min_day, 0);
    assert_eq!(c.first_day_slot, None);
}

#[test]
fn resolve_caps_deadline_at_horizon() {
    let far = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
    let c = SearchConstraints::resolve(origin(), at(16, 9, 0), 6, Some(far), (0, SLOTS_PER_DAY));
    assert_eq!(c.max_day, DAYS as i64 - 1);

    let near = NaiveDate::from_ymd_opt(2026, 3, 23).unwrap();
    let c = SearchConstraints::resolve(origin(), at(16, 9, 0), 6, Some(near), (0, SLOTS_PER_DAY));
    assert_eq!(c.max_day, 7);
}

// ── Search ──────────────────────────────────────────────────────────────────

#[test]
fn empty_when_first_day_is_after_deadline() {
    let mut alice = TimeGrid::new("alice");
    alice.set_day(0, true).unwrap();
    let counts = counts_of(&[alice]);

    let deadline = origin();
    let c = SearchConstraints::resolve(origin(), at(17, 1, 0), 6, Some(deadline), (0, SLOTS_PER_DAY));
    assert!(c.min_day > c.max_day);
    assert!(best_windows(&counts, &c, 3).is_empty());
}

#[test]
fn empty_when_cutoff_is_zero() {
    let counts = counts_of(&[TimeGrid::new("alice")]);
    assert!(best_windows(&counts, &SearchConstraints::unbounded(6), 0).is_empty());
}

#[test]
fn empty_when_window_exceeds_daily_span() {
    let mut alice = TimeGrid::new("alice");
    alice.set_day(4, true).unwrap();
    let counts = counts_of(&[alice]);

    let mut c = SearchConstraints::unbounded(6);
    c.min_slot = 18;
    c.max_slot = 22;
    assert!(best_windows(&counts, &c, 3).is_empty());

    let c = SearchConstraints::unbounded(SLOTS_PER_DAY + 1);
    assert!(best_windows(&counts, &c, 3).is_empty());
}

#[test]
fn full_day_window_scores_whole_row() {
    let mut alice = TimeGrid::new("alice");
    alice.set_day(4, true).unwrap();
    let counts = counts_of(&[alice]);

    let best = best_windows(&counts, &SearchConstraints::unbounded(SLOTS_PER_DAY), 1);
    assert_eq!(best, vec![window(SLOTS_PER_DAY as u64, 4, 0)]);
}

#[test]
fn score_sums_counts_over_the_whole_window() {
    let mut alice = TimeGrid::new("alice");
    let mut bob = TimeGrid::new("bob");
    // Alice free 10:00-13:00, Bob free 11:00-12:00 on day 3.
    alice.set_range(3, 20, 26, true).unwrap();
    bob.set_range(3, 22, 24, true).unwrap();
    let counts = counts_of(&[alice, bob]);

    let best = best_windows(&counts, &SearchConstraints::unbounded(6), 1);
    assert_eq!(best, vec![window(8, 3, 20)]);
}

#[test]
fn returns_at_most_cutoff_sorted_by_score() {
    let mut alice = TimeGrid::new("alice");
    let mut bob = TimeGrid::new("bob");
    alice.set_day(1, true).unwrap();
    alice.set_day(2, true).unwrap();
    bob.set_range(2, 30, 40, true).unwrap();
    let counts = counts_of(&[alice, bob]);

    let best = best_windows(&counts, &SearchConstraints::unbounded(4), 5);

    assert_eq!(best.len(), 5);
    for pair in best.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    // Bob's block is 10 slots: starts 30..=36 hold 8 each.
    assert_eq!(best[0], window(8, 2, 30));
    assert!(best.iter().all(|w| w.day == 2 && w.score == 8));
}

#[test]
fn ties_resolve_to_earliest_day_then_slot() {
    let mut alice = TimeGrid::new("alice");
    alice.set_range(9, 20, 22, true).unwrap();
    alice.set_range(4, 30, 32, true).unwrap();
    alice.set_range(4, 10, 12, true).unwrap();
    let counts = counts_of(&[alice]);

    let best = best_windows(&counts, &SearchConstraints::unbounded(2), 3);
    assert_eq!(
        best,
        vec![window(2, 4, 10), window(2, 4, 30), window(2, 9, 20)]
    );
}

#[test]
fn first_day_clamp_skips_starts_before_earliest_slot() {
    let mut alice = TimeGrid::new("alice");
    alice.set_day(0, true).unwrap();
    alice.set_day(1, true).unwrap();
    let counts = counts_of(&[alice]);

    let mut c = SearchConstraints::unbounded(2);
    c.first_day_slot = Some(20);
    let best = best_windows(&counts, &c, 2);

    // Day 0 starts at slot 20; day 1 is unaffected but ranks after day 0.
    assert_eq!(best, vec![window(2, 0, 20), window(2, 0, 21)]);
}

#[test]
fn first_day_clamp_leaves_later_days_alone() {
    let mut alice = TimeGrid::new("alice");
    alice.set_range(0, 0, 10, true).unwrap();
    alice.set_range(1, 0, 10, true).unwrap();
    let counts = counts_of(&[alice]);

    let mut c = SearchConstraints::unbounded(2);
    c.first_day_slot = Some(20);
    let best = best_windows(&counts, &c, 1);

    assert_eq!(best, vec![window(2, 1, 0)]);
}

#[test]
fn daily_window_bounds_start_and_end() {
    let mut alice = TimeGrid::new("alice");
    alice.set_day(5, true).unwrap();
    let counts = counts_of(&[alice]);

    let mut c = SearchConstraints::unbounded(6);
    c.min_slot = 18;
    c.max_slot = 26;
    let best = best_windows(&counts, &c, 10);

    // Starts 18, 19, 20 fit [18, 26) on day 5; other days score 0.
    let day5: Vec<usize> = best.iter().filter(|w| w.day == 5).map(|w| w.slot).collect();
    assert_eq!(day5, vec![18, 19, 20]);
    assert!(best.iter().all(|w| (18..=20).contains(&w.slot)));
}

#[test]
fn candidates_carry_absolute_start_times() {
    let mut alice = TimeGrid::new("alice");
    alice.set_range(2, 29, 35, true).unwrap();
    let counts = counts_of(&[alice]);

    let best = best_candidates(&counts, &SearchConstraints::unbounded(6), 1, origin());

    assert_eq!(best.len(), 1);
    assert_eq!(best[0].start, at(18, 14, 30));
    assert_eq!(best[0].score, 6);
    assert_eq!((best[0].day, best[0].slot), (2, 29));
}

#[test]
fn fewer_results_when_search_space_is_small() {
    let counts = counts_of(&[TimeGrid::new("alice")]);

    let mut c = SearchConstraints::unbounded(6);
    c.min_day = 3;
    c.max_day = 3;
    c.min_slot = 10;
    c.max_slot = 17;

    // Starts 10 and 11 only.
    assert_eq!(best_windows(&counts, &c, 5).len(), 2);
}

#[test]
fn exhausted_constraints_yield_nothing() {
    let mut alice = TimeGrid::new("alice");
    alice.set_day(0, true).unwrap();
    let counts = counts_of(&[alice]);

    let c = SearchConstraints::exhausted(6);
    assert!(c.is_empty());
    assert!(best_windows(&counts, &c, 3).is_empty());
}

#[test]
fn huge_cutoff_returns_every_window() {
    let mut alice = TimeGrid::new("alice");
    alice.set_day(5, true).unwrap();
    let counts = counts_of(&[alice]);

    let best = best_windows(&counts, &SearchConstraints::unbounded(1), usize::MAX);

    assert_eq!(best.len(), DAYS * SLOTS_PER_DAY);
    assert_eq!(best[0], window(1, 5, 0));
    assert_eq!(best[SLOTS_PER_DAY], window(0, 0, 0));
    assert_eq!(best[best.len() - 1], window(0, DAYS - 1, SLOTS_PER_DAY - 1));
}
