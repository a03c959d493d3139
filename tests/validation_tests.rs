use chrono::Duration;
use rfichaje::core::validation::ValidationService;
use rfichaje::db::queries::load_shifts_for_employee_on_date;
use rfichaje::models::action::Action;
use rfichaje::models::break_record::BreakKind;
use rfichaje::models::shift::Shift;

mod common;
use common::{Harness, ts};

fn todays_shifts(h: &Harness, employee_id: i64) -> Vec<Shift> {
    load_shifts_for_employee_on_date(&h.pool.conn, employee_id, &ts("2025-03-10 00:00").date())
        .expect("load shifts")
}

fn planned() -> (Harness, i64) {
    let mut h = Harness::new("2025-03-10 08:00");
    let id = h.plan(
        7,
        "2025-03-10 09:00",
        "2025-03-10 17:00",
        Some(("2025-03-10 13:00", "2025-03-10 13:30")),
    );
    (h, id)
}

#[test]
fn test_clock_in_eligibility_window() {
    let (h, _) = planned();
    let shifts = todays_shifts(&h, 7);

    for (now, expected) in [
        ("2025-03-10 08:44", false),
        ("2025-03-10 08:45", true),
        ("2025-03-10 09:00", true),
        ("2025-03-10 09:15", true),
        ("2025-03-10 09:16", false),
    ] {
        h.set_now(now);
        let svc = ValidationService::new(&h.clock, Duration::minutes(15));
        assert_eq!(svc.can_clock_in(&shifts), expected, "at {now}");
    }
}

#[test]
fn test_eligibility_is_narrower_than_action_window() {
    let (mut h, id) = planned();
    h.set_now("2025-03-10 08:40");

    let svc = ValidationService::new(&h.clock, Duration::minutes(15));
    assert!(!svc.can_clock_in(&todays_shifts(&h, 7)));

    h.act(Action::Start, id).expect("action window still accepts 08:40");
}

#[test]
fn test_no_clock_in_once_started() {
    let (mut h, id) = planned();
    h.set_now("2025-03-10 09:00");
    h.act(Action::Start, id).expect("clock in");

    let svc = ValidationService::new(&h.clock, Duration::minutes(15));
    assert!(!svc.can_clock_in(&todays_shifts(&h, 7)));
}

#[test]
fn test_break_eligibility_follows_state() {
    let (mut h, id) = planned();
    h.set_now("2025-03-10 09:00");

    let e = ValidationService::new(&h.clock, Duration::minutes(15))
        .evaluate(&h.pool.conn, &todays_shifts(&h, 7))
        .expect("evaluate");
    assert!(e.can_clock_in);
    assert!(!e.can_take_break);
    assert!(!e.can_take_mandatory_break);

    h.act(Action::Start, id).expect("clock in");
    let e = ValidationService::new(&h.clock, Duration::minutes(15))
        .evaluate(&h.pool.conn, &todays_shifts(&h, 7))
        .expect("evaluate");
    assert!(e.can_take_break);
    assert!(e.can_take_mandatory_break);

    h.set_now("2025-03-10 13:00");
    h.act(Action::StartBreak(BreakKind::Mandatory), id)
        .expect("start mandatory");
    let e = ValidationService::new(&h.clock, Duration::minutes(15))
        .evaluate(&h.pool.conn, &todays_shifts(&h, 7))
        .expect("evaluate");
    assert!(!e.can_take_break);
    assert!(!e.can_take_mandatory_break);

    h.set_now("2025-03-10 13:20");
    h.act(Action::EndBreak, id).expect("end break");
    let e = ValidationService::new(&h.clock, Duration::minutes(15))
        .evaluate(&h.pool.conn, &todays_shifts(&h, 7))
        .expect("evaluate");
    assert!(e.can_take_break);
    assert!(!e.can_take_mandatory_break, "one mandatory break per day");
}

#[test]
fn test_mandatory_limit_spans_employee_shifts() {
    let mut h = Harness::new("2025-03-10 08:00");
    let morning = h.plan(
        7,
        "2025-03-10 08:00",
        "2025-03-10 12:00",
        Some(("2025-03-10 10:00", "2025-03-10 10:15")),
    );
    let evening = h.plan(
        7,
        "2025-03-10 15:00",
        "2025-03-10 19:00",
        Some(("2025-03-10 17:00", "2025-03-10 17:15")),
    );

    h.act(Action::Start, morning).expect("clock in morning");
    h.set_now("2025-03-10 10:00");
    h.act(Action::StartBreak(BreakKind::Mandatory), morning)
        .expect("mandatory");
    h.set_now("2025-03-10 10:10");
    h.act(Action::EndBreak, morning).expect("end");
    h.set_now("2025-03-10 12:00");
    h.act(Action::Finish, morning).expect("finish");

    h.set_now("2025-03-10 15:00");
    h.act(Action::Start, evening).expect("clock in evening");

    let e = ValidationService::new(&h.clock, Duration::minutes(15))
        .evaluate(&h.pool.conn, &todays_shifts(&h, 7))
        .expect("evaluate");
    assert!(e.can_take_break);
    assert!(!e.can_take_mandatory_break);
}
