#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveDateTime};
use cuadrante::{model::Color, CommandRegistry, EmployeeId, Scheduler, ShiftDraft};
use serde_json::json;

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn setup() -> (Scheduler, CommandRegistry, EmployeeId) {
    let mut s = Scheduler::new();
    let id = s.roster_mut().add_employee("Alicia".to_string());
    (s, CommandRegistry::standard(), id)
}

fn draft(employee: EmployeeId, title: &str, start: NaiveDateTime, end: NaiveDateTime) -> ShiftDraft {
    ShiftDraft::new(
        employee,
        title.to_string(),
        start,
        end,
        Color::for_employee(employee),
    )
    .unwrap()
}

#[test]
fn unknown_command_is_a_structured_failure() {
    let (mut s, registry, _) = setup();
    let reply = registry.dispatch(&mut s, "launch_rocket", json!({}));
    assert!(!reply.success);
    assert!(reply.error.unwrap().contains("unknown command"));
}

#[test]
fn create_shift_via_registry() {
    let (mut s, registry, id) = setup();
    let reply = registry.dispatch(
        &mut s,
        "create_shift",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "start": "08:00",
            "end": "14:00",
            "title": "Turno mañana"
        }),
    );
    assert!(reply.success, "{:?}", reply.error);
    assert_eq!(s.roster().shifts_for_employee(id, None).len(), 1);
}

#[test]
fn create_shift_unknown_employee_fails_before_any_mutation() {
    let (mut s, registry, _) = setup();
    let reply = registry.dispatch(
        &mut s,
        "create_shift",
        json!({
            "employee": "Nadie",
            "date": "2025-03-01",
            "start": "08:00",
            "end": "14:00",
            "title": "Turno"
        }),
    );
    assert!(!reply.success);
    assert!(reply.error.unwrap().contains("unknown employee"));
    assert!(s.roster().shifts.is_empty());
}

#[test]
fn create_shift_rejects_bad_color() {
    let (mut s, registry, _) = setup();
    let reply = registry.dispatch(
        &mut s,
        "create_shift",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "start": "08:00",
            "end": "14:00",
            "title": "Turno",
            "color": "#12GH56"
        }),
    );
    assert!(!reply.success);
    assert!(reply.error.unwrap().contains("invalid color"));
    assert!(s.roster().shifts.is_empty());
}

#[test]
fn create_shift_rejects_unknown_fields() {
    let (mut s, registry, _) = setup();
    let reply = registry.dispatch(
        &mut s,
        "create_shift",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "start": "08:00",
            "end": "14:00",
            "title": "Turno",
            "surprise": true
        }),
    );
    assert!(!reply.success);
    assert!(reply.error.unwrap().contains("invalid arguments"));
}

#[test]
fn create_shift_adapts_conflicts_by_default() {
    let (mut s, registry, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Jornada", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 18, 0)));

    let reply = registry.dispatch(
        &mut s,
        "create_shift",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "start": "12:00",
            "end": "13:00",
            "title": "Guardia"
        }),
    );
    assert!(reply.success, "{:?}", reply.error);
    assert!(reply.message.unwrap().contains("adaptation"));
    assert_eq!(s.roster().shifts.len(), 3);
    assert!(s.detect_overlaps().is_empty());
}

#[test]
fn create_shift_resolves_overnight_end() {
    let (mut s, registry, id) = setup();
    let reply = registry.dispatch(
        &mut s,
        "create_shift",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "start": "22:00",
            "end": "06:00",
            "title": "Noche"
        }),
    );
    assert!(reply.success, "{:?}", reply.error);
    let shifts = s.roster().shifts_for_employee(id, None);
    assert_eq!(shifts[0].end, dt(2025, 3, 2, 6, 0));
}

#[test]
fn update_without_title_on_a_crowded_day_is_ambiguous() {
    let (mut s, registry, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Mañana", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 12, 0)));
    s.roster_mut()
        .create_shift(draft(id, "Tarde", dt(2025, 3, 1, 14, 0), dt(2025, 3, 1, 20, 0)));

    let reply = registry.dispatch(
        &mut s,
        "update_shift",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "new_start": "09:00"
        }),
    );
    assert!(!reply.success);
    let error = reply.error.unwrap();
    assert!(error.contains("ambiguous"));
    assert!(error.contains("Mañana"));
    assert!(error.contains("Tarde"));
}

#[test]
fn update_with_title_disambiguates() {
    let (mut s, registry, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Mañana", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 12, 0)));
    s.roster_mut()
        .create_shift(draft(id, "Tarde", dt(2025, 3, 1, 14, 0), dt(2025, 3, 1, 20, 0)));

    let reply = registry.dispatch(
        &mut s,
        "update_shift",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "title": "Tarde",
            "new_start": "15:00"
        }),
    );
    assert!(reply.success, "{:?}", reply.error);
    let updated = s
        .roster()
        .shifts
        .iter()
        .find(|sh| sh.title == "Tarde")
        .unwrap();
    assert_eq!(updated.start, dt(2025, 3, 1, 15, 0));
    assert_eq!(updated.end, dt(2025, 3, 1, 20, 0));
}

#[test]
fn update_that_would_overlap_is_refused() {
    let (mut s, registry, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Mañana", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 12, 0)));
    s.roster_mut()
        .create_shift(draft(id, "Tarde", dt(2025, 3, 1, 14, 0), dt(2025, 3, 1, 20, 0)));

    let reply = registry.dispatch(
        &mut s,
        "update_shift",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "title": "Tarde",
            "new_start": "11:00"
        }),
    );
    assert!(!reply.success);
    assert!(reply.error.unwrap().contains("overlap"));
}

#[test]
fn single_day_delete_requires_disambiguation() {
    let (mut s, registry, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Mañana", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 12, 0)));
    s.roster_mut()
        .create_shift(draft(id, "Tarde", dt(2025, 3, 1, 14, 0), dt(2025, 3, 1, 20, 0)));

    let reply = registry.dispatch(
        &mut s,
        "delete_shifts",
        json!({
            "employee": "Alicia",
            "start_date": "2025-03-01"
        }),
    );
    assert!(!reply.success);
    assert!(reply.error.unwrap().contains("ambiguous"));

    let reply = registry.dispatch(
        &mut s,
        "delete_shifts",
        json!({
            "employee": "Alicia",
            "start_date": "2025-03-01",
            "title": "Mañana"
        }),
    );
    assert!(reply.success, "{:?}", reply.error);
    assert_eq!(s.roster().shifts.len(), 1);
}

#[test]
fn range_delete_reports_counts() {
    let (mut s, registry, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "A", dt(2025, 3, 3, 8, 0), dt(2025, 3, 3, 12, 0)));
    s.roster_mut()
        .create_shift(draft(id, "B", dt(2025, 3, 4, 8, 0), dt(2025, 3, 4, 12, 0)));
    s.roster_mut()
        .create_shift(draft(id, "C", dt(2025, 3, 10, 8, 0), dt(2025, 3, 10, 12, 0)));

    let reply = registry.dispatch(
        &mut s,
        "delete_shifts",
        json!({
            "employee": "Alicia",
            "start_date": "2025-03-03",
            "end_date": "2025-03-07"
        }),
    );
    assert!(reply.success);
    assert!(reply.message.unwrap().contains("deleted 2"));
    assert_eq!(s.roster().shifts.len(), 1);
}

#[test]
fn schedule_range_skips_conflicting_days_by_default() {
    let (mut s, registry, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Previo", dt(2025, 3, 4, 9, 0), dt(2025, 3, 4, 12, 0)));

    let reply = registry.dispatch(
        &mut s,
        "schedule_range",
        json!({
            "employee": "Alicia",
            "title": "Turno",
            "start_date": "2025-03-03",
            "end_date": "2025-03-07",
            "start": "08:00",
            "end": "14:00"
        }),
    );
    assert!(reply.success);
    let message = reply.message.unwrap();
    assert!(message.contains("created 4"));
    assert!(message.contains("skipped 1"));
}

#[test]
fn schedule_rotation_via_registry() {
    let (mut s, registry, id) = setup();
    let reply = registry.dispatch(
        &mut s,
        "schedule_rotation",
        json!({
            "employee": "Alicia",
            "title": "Rotación",
            "work_days": 3,
            "rest_days": 3,
            "start_date": "2025-01-01",
            "end_date": "2025-01-14",
            "start": "08:00",
            "end": "14:00"
        }),
    );
    assert!(reply.success);
    assert!(reply.message.unwrap().contains("created 8"));
    assert_eq!(s.roster().shifts_for_employee(id, None).len(), 8);
}

#[test]
fn swap_and_copy_via_registry() {
    let (mut s, registry, id) = setup();
    let other = s.roster_mut().add_employee("Bruno".to_string());
    s.roster_mut()
        .create_shift(draft(id, "Lunes", dt(2025, 3, 3, 8, 0), dt(2025, 3, 3, 14, 0)));

    let reply = registry.dispatch(
        &mut s,
        "copy_shifts",
        json!({
            "from_employee": "Alicia",
            "to_employee": "Bruno",
            "start_date": "2025-03-03",
            "end_date": "2025-03-03"
        }),
    );
    assert!(reply.success);
    assert_eq!(s.roster().shifts_for_employee(other, None).len(), 1);

    let reply = registry.dispatch(
        &mut s,
        "swap_shifts",
        json!({
            "from_employee": "Alicia",
            "to_employee": "Bruno",
            "start_date": "2025-03-03",
            "end_date": "2025-03-03"
        }),
    );
    assert!(reply.success);
    // El destino ya tiene la copia a la misma hora: el movimiento se omite.
    assert!(reply.message.unwrap().contains("skipped 1"));
    assert_eq!(s.roster().shifts_for_employee(id, None).len(), 1);
}

#[test]
fn check_conflict_via_registry() {
    let (mut s, registry, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Mañana", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 14, 0)));

    let reply = registry.dispatch(
        &mut s,
        "check_conflict",
        json!({
            "employee": "Alicia",
            "date": "2025-03-01",
            "start": "14:00",
            "end": "20:00"
        }),
    );
    assert!(reply.success);
    assert!(reply.message.unwrap().contains("conflict: false"));
}
