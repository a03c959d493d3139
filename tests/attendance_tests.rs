use rfichaje::errors::AppError;
use rfichaje::models::action::Action;
use rfichaje::models::break_record::BreakKind;
use rfichaje::models::events::DomainEvent;
use rfichaje::models::geo::GeoCapture;
use rfichaje::models::shift::ShiftState;

mod common;
use common::{Harness, ts};

const MANDATORY: Action = Action::StartBreak(BreakKind::Mandatory);
const ADDITIONAL: Action = Action::StartBreak(BreakKind::Additional);

fn day_shift(h: &mut Harness) -> i64 {
    h.plan(
        7,
        "2025-03-10 09:00",
        "2025-03-10 17:00",
        Some(("2025-03-10 13:00", "2025-03-10 13:30")),
    )
}

#[test]
fn test_clock_in_inside_window_starts_shift() {
    let mut h = Harness::new("2025-03-10 08:35");
    let id = day_shift(&mut h);

    let out = h.act(Action::Start, id).expect("clock in");
    assert_eq!(out.shift.state, ShiftState::InProgress);

    let stored = h.shift(id);
    assert_eq!(stored.state, ShiftState::InProgress);
    assert_eq!(stored.clock_in_at, Some(ts("2025-03-10 08:35")));
    assert_eq!(stored.clock_in_geo.lat, Some(40.4168));
    assert_eq!(stored.clock_in_geo.ip.as_deref(), Some("10.0.0.7"));

    let events = h.events();
    assert!(matches!(
        events.as_slice(),
        [DomainEvent::ShiftStarted { shift_id, employee_id: 7, .. }] if *shift_id == id
    ));
}

#[test]
fn test_clock_in_too_early_leaves_shift_untouched() {
    let mut h = Harness::new("2025-03-10 08:00");
    let id = day_shift(&mut h);

    let err = h.act(Action::Start, id).unwrap_err();
    assert!(matches!(err, AppError::TooEarly { .. }), "got {err:?}");

    let stored = h.shift(id);
    assert_eq!(stored.state, ShiftState::NotStarted);
    assert!(stored.clock_in_at.is_none());
    assert!(h.events().is_empty());
}

#[test]
fn test_action_window_edges_are_inclusive() {
    let mut h = Harness::new("2025-03-10 08:30");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in exactly at window open");

    h.set_now("2025-03-10 17:30");
    h.act(Action::Finish, id).expect("clock out exactly at window close");
    assert_eq!(h.shift(id).state, ShiftState::Finished);
}

#[test]
fn test_action_after_window_is_too_late() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in");

    h.set_now("2025-03-10 17:31");
    let err = h.act(Action::Finish, id).unwrap_err();
    assert!(matches!(err, AppError::TooLate { .. }), "got {err:?}");
    assert_eq!(h.shift(id).state, ShiftState::InProgress);
}

#[test]
fn test_action_window_is_configurable() {
    let mut h = Harness::new("2025-03-10 08:20");
    h.action_window_minutes = 45;
    let id = day_shift(&mut h);

    h.act(Action::Start, id).expect("45 minute window accepts 08:20");
}

#[test]
fn test_clock_in_requires_position() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);

    let err = h.act_with(Action::Start, id, None).unwrap_err();
    assert!(matches!(err, AppError::MissingGeolocation(_)), "got {err:?}");

    let ip_only = GeoCapture::default().with_request(Some("10.0.0.7".into()), None);
    let err = h.act_with(Action::Start, id, Some(&ip_only)).unwrap_err();
    assert!(matches!(err, AppError::MissingGeolocation(_)), "got {err:?}");

    assert_eq!(h.shift(id).state, ShiftState::NotStarted);
}

#[test]
fn test_illegal_transitions_do_not_mutate() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);

    let err = h.act(Action::Finish, id).unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition { state: ShiftState::NotStarted, .. }
    ));

    let err = h.act(ADDITIONAL, id).unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    h.act(Action::Start, id).expect("clock in");
    let err = h.act(Action::Start, id).unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition { state: ShiftState::InProgress, .. }
    ));

    h.set_now("2025-03-10 17:00");
    h.act(Action::Finish, id).expect("clock out");
    for action in [Action::Start, Action::Finish, ADDITIONAL, Action::EndBreak] {
        assert!(h.act(action, id).is_err(), "{action} accepted on a finished shift");
    }

    let stored = h.shift(id);
    assert_eq!(stored.state, ShiftState::Finished);
    assert_eq!(stored.clock_out_at, Some(ts("2025-03-10 17:00")));
    assert!(h.breaks(id).is_empty());
}

#[test]
fn test_end_break_without_open_break() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in");

    let err = h.act(Action::EndBreak, id).unwrap_err();
    assert!(matches!(err, AppError::NoActiveBreak(sid) if sid == id), "got {err:?}");
    assert_eq!(h.shift(id).state, ShiftState::InProgress);
}

#[test]
fn test_mandatory_break_overflow_is_split() {
    let mut h = Harness::new("2025-03-10 08:35");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in");

    h.set_now("2025-03-10 13:00");
    let out = h.act(MANDATORY, id).expect("start mandatory break");
    assert_eq!(out.shift.state, ShiftState::OnBreak);

    h.set_now("2025-03-10 13:50");
    let out = h.act(Action::EndBreak, id).expect("end break");
    assert_eq!(out.shift.state, ShiftState::InProgress);

    let breaks = h.breaks(id);
    assert_eq!(breaks.len(), 2);

    let mandatory = &breaks[0];
    assert_eq!(mandatory.kind, BreakKind::Mandatory);
    assert_eq!(mandatory.start, ts("2025-03-10 13:00"));
    assert_eq!(mandatory.end, Some(ts("2025-03-10 13:30")));
    assert!(mandatory.observation.contains("13:30"));

    let extra = &breaks[1];
    assert_eq!(extra.kind, BreakKind::Additional);
    assert_eq!(extra.start, ts("2025-03-10 13:30"));
    assert_eq!(extra.end, Some(ts("2025-03-10 13:50")));
    assert_eq!(extra.owed_minutes, Some(20));
    assert!(extra.observation.contains(&format!("#{}", mandatory.id)));
    assert_eq!(extra.end_geo.lat, Some(40.4168));

    let ended = h
        .events()
        .into_iter()
        .find(|e| matches!(e, DomainEvent::BreakEnded { .. }))
        .expect("break_ended event");
    assert!(matches!(
        ended,
        DomainEvent::BreakEnded { overflow_break_id: Some(oid), .. } if oid == extra.id
    ));
}

#[test]
fn test_mandatory_break_at_allowance_has_no_overflow() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in");

    h.set_now("2025-03-10 13:05");
    h.act(MANDATORY, id).expect("start mandatory break");
    h.set_now("2025-03-10 13:35");
    h.act(Action::EndBreak, id).expect("end break");

    let breaks = h.breaks(id);
    assert_eq!(breaks.len(), 1);
    assert_eq!(breaks[0].end, Some(ts("2025-03-10 13:35")));
    assert!(breaks[0].owed_minutes.is_none());
}

#[test]
fn test_additional_breaks_are_never_split() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in");

    h.set_now("2025-03-10 10:00");
    h.act(ADDITIONAL, id).expect("start additional break");
    h.set_now("2025-03-10 11:30");
    h.act(Action::EndBreak, id).expect("end break");

    let breaks = h.breaks(id);
    assert_eq!(breaks.len(), 1);
    assert_eq!(breaks[0].kind, BreakKind::Additional);
    assert_eq!(breaks[0].end, Some(ts("2025-03-10 11:30")));
}

#[test]
fn test_second_mandatory_break_is_rejected() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in");

    h.set_now("2025-03-10 13:00");
    h.act(MANDATORY, id).expect("first mandatory break");
    h.set_now("2025-03-10 13:20");
    h.act(Action::EndBreak, id).expect("end break");

    h.set_now("2025-03-10 15:00");
    let err = h.act(MANDATORY, id).unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }), "got {err:?}");
    h.act(ADDITIONAL, id).expect("additional break still allowed");
}

#[test]
fn test_mandatory_break_needs_break_window() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = h.plan(7, "2025-03-10 09:00", "2025-03-10 13:00", None);
    h.act(Action::Start, id).expect("clock in");

    let err = h.act(MANDATORY, id).unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
    assert_eq!(h.shift(id).state, ShiftState::InProgress);
}

#[test]
fn test_finish_on_break_ends_break_first() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in");

    h.set_now("2025-03-10 13:00");
    h.act(MANDATORY, id).expect("start mandatory break");
    h.set_now("2025-03-10 14:00");
    let out = h.act(Action::Finish, id).expect("finish while on break");

    assert_eq!(out.shift.state, ShiftState::Finished);
    assert!(out.next_shift.is_none());

    let breaks = h.breaks(id);
    assert_eq!(breaks.len(), 2, "mandatory clipped plus overflow");
    assert!(breaks.iter().all(|b| !b.is_open()));
    assert_eq!(breaks[1].owed_minutes, Some(30));
}

#[test]
fn test_start_schedules_transition_only_with_successor() {
    let mut h = Harness::new("2025-03-10 09:00");
    let first = h.plan(7, "2025-03-10 09:00", "2025-03-10 13:00", None);
    let _second = h.plan(7, "2025-03-10 13:00", "2025-03-10 17:00", None);
    let lonely = h.plan(8, "2025-03-10 09:00", "2025-03-10 13:00", None);

    h.act(Action::Start, first).expect("clock in first");
    h.act(Action::Start, lonely).expect("clock in other employee");

    assert_eq!(h.count("transition_jobs"), 1);
    let run_at: String = h
        .pool
        .conn
        .query_row("SELECT run_at FROM transition_jobs", [], |r| r.get(0))
        .expect("job row");
    assert_eq!(run_at, "2025-03-10 13:00:00");
}

#[test]
fn test_finish_reports_consecutive_shift() {
    let mut h = Harness::new("2025-03-10 09:00");
    let first = h.plan(7, "2025-03-10 09:00", "2025-03-10 13:00", None);
    let second = h.plan(7, "2025-03-10 13:00", "2025-03-10 17:00", None);

    h.act(Action::Start, first).expect("clock in");
    h.set_now("2025-03-10 12:58");
    let out = h.act(Action::Finish, first).expect("clock out");

    assert_eq!(out.next_shift.map(|s| s.id), Some(second));
    assert!(h.events().iter().any(|e| matches!(
        e,
        DomainEvent::ShiftFinished { next_shift_id: Some(n), .. } if *n == second
    )));
}

#[test]
fn test_action_is_written_to_internal_log() {
    let mut h = Harness::new("2025-03-10 09:00");
    let id = day_shift(&mut h);
    h.act(Action::Start, id).expect("clock in");

    let rows: i64 = h
        .pool
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'start' AND target = ?1",
            [format!("shift {id}")],
            |r| r.get(0),
        )
        .expect("log rows");
    assert_eq!(rows, 1);
}

#[test]
fn test_actions_work_without_event_listener() {
    use chrono::Duration;
    use rfichaje::core::attendance::AttendanceService;
    use rfichaje::core::events::NullSink;

    let mut h = Harness::new("2025-03-10 08:50");
    let id = day_shift(&mut h);
    let sink = NullSink;
    let service = AttendanceService::new(&h.clock, Duration::minutes(30), &h.scheduler, &sink);

    service
        .execute_action(&mut h.pool, Action::Start, id, Some(&common::here()))
        .expect("clock in");
    h.clock.advance(Duration::hours(2));
    let out = service
        .execute_action(&mut h.pool, ADDITIONAL, id, Some(&common::here()))
        .expect("start break");

    assert_eq!(out.shift.state, ShiftState::OnBreak);
    assert_eq!(h.breaks(id)[0].start, ts("2025-03-10 10:50"));
    assert!(h.events().is_empty());
}
