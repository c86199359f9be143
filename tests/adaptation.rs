#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveDateTime};
use cuadrante::{
    model::Color, scheduler::ConflictPolicy, EmployeeId, Scheduler, ShiftDraft, Submission,
    MIN_SHIFT_MINUTES,
};

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn setup() -> (Scheduler, EmployeeId) {
    let mut s = Scheduler::new();
    let id = s.roster_mut().add_employee("Alicia".to_string());
    (s, id)
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
fn full_containment_deletes_never_truncates() {
    let (mut s, id) = setup();
    let existing = s
        .roster_mut()
        .create_shift(draft(id, "Mañana", dt(2025, 3, 1, 10, 0), dt(2025, 3, 1, 14, 0)));

    let winner = draft(id, "Completo", dt(2025, 3, 1, 9, 0), dt(2025, 3, 1, 15, 0));
    let plan = s.plan_adaptation(&winner);

    assert_eq!(plan.to_delete, vec![existing.id]);
    assert!(plan.to_update.is_empty());
    assert_eq!(plan.to_create.len(), 1);
    assert!(plan.to_create[0].is_new);
    assert_eq!(plan.to_create[0].draft.title, "Completo");
}

#[test]
fn middle_insertion_splits_into_three_shifts() {
    let (mut s, id) = setup();
    let existing = s
        .roster_mut()
        .create_shift(draft(id, "Jornada", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 18, 0)));

    let winner = draft(id, "Guardia", dt(2025, 3, 1, 12, 0), dt(2025, 3, 1, 13, 0));
    let plan = s.plan_adaptation(&winner);

    assert_eq!(plan.to_update.len(), 1);
    assert_eq!(plan.to_update[0].id, existing.id);
    assert_eq!(plan.to_update[0].start, dt(2025, 3, 1, 8, 0));
    assert_eq!(plan.to_update[0].end, dt(2025, 3, 1, 12, 0));

    assert_eq!(plan.to_create.len(), 2);
    assert!(plan.to_create[0].is_new);
    assert!(!plan.to_create[1].is_new);
    assert_eq!(plan.to_create[1].draft.start, dt(2025, 3, 1, 13, 0));
    assert_eq!(plan.to_create[1].draft.end, dt(2025, 3, 1, 18, 0));
    assert_eq!(plan.to_create[1].draft.title, "Jornada");
    assert!(plan.to_delete.is_empty());

    let applied = s.apply_plan(&plan).unwrap();
    assert_eq!(applied.created.len(), 2);
    assert_eq!(s.roster().shifts.len(), 3);
    assert!(s.detect_overlaps().is_empty());
    assert!(s.ledger().is_settled());
    for shift in &s.roster().shifts {
        assert!(shift.duration_minutes() >= MIN_SHIFT_MINUTES);
    }
}

#[test]
fn leading_remainder_below_floor_is_deleted() {
    let (mut s, id) = setup();
    let existing = s
        .roster_mut()
        .create_shift(draft(id, "Corto", dt(2025, 3, 1, 10, 0), dt(2025, 3, 1, 14, 0)));

    // Resto de cabeza de 10 minutos: por debajo del suelo, se borra entero.
    let winner = draft(id, "Ganador", dt(2025, 3, 1, 10, 10), dt(2025, 3, 1, 15, 0));
    let plan = s.plan_adaptation(&winner);

    assert_eq!(plan.to_delete, vec![existing.id]);
    assert!(plan.to_update.is_empty());
    assert_eq!(plan.to_create.len(), 1);
}

#[test]
fn trailing_remainder_below_floor_is_dropped_silently() {
    let (mut s, id) = setup();
    let existing = s
        .roster_mut()
        .create_shift(draft(id, "Tarde", dt(2025, 3, 1, 10, 0), dt(2025, 3, 1, 14, 0)));

    // Resto de cola de 10 minutos tras el ganador: se descarta.
    let winner = draft(id, "Ganador", dt(2025, 3, 1, 9, 0), dt(2025, 3, 1, 13, 50));
    let plan = s.plan_adaptation(&winner);

    assert_eq!(plan.to_delete, vec![existing.id]);
    assert!(plan.to_update.is_empty());
    assert_eq!(plan.to_create.len(), 1);
    assert!(plan.to_create[0].is_new);
}

#[test]
fn nested_winner_with_both_fragments_below_floor() {
    let (mut s, id) = setup();
    let existing = s
        .roster_mut()
        .create_shift(draft(id, "Breve", dt(2025, 3, 1, 12, 0), dt(2025, 3, 1, 13, 20)));

    let winner = draft(id, "Ganador", dt(2025, 3, 1, 12, 10), dt(2025, 3, 1, 13, 10));
    let plan = s.plan_adaptation(&winner);

    assert_eq!(plan.to_delete, vec![existing.id]);
    assert!(plan.to_update.is_empty());
    assert_eq!(plan.to_create.len(), 1);
}

#[test]
fn tail_overlap_moves_existing_start_to_winner_end() {
    let (mut s, id) = setup();
    let existing = s
        .roster_mut()
        .create_shift(draft(id, "Tarde", dt(2025, 3, 1, 12, 0), dt(2025, 3, 1, 20, 0)));

    let winner = draft(id, "Mañana", dt(2025, 3, 1, 9, 0), dt(2025, 3, 1, 14, 0));
    let plan = s.plan_adaptation(&winner);

    assert_eq!(plan.to_update.len(), 1);
    assert_eq!(plan.to_update[0].id, existing.id);
    assert_eq!(plan.to_update[0].start, dt(2025, 3, 1, 14, 0));
    assert_eq!(plan.to_update[0].end, dt(2025, 3, 1, 20, 0));
    assert!(plan.to_delete.is_empty());
}

#[test]
fn adapt_policy_applies_plan_end_to_end() {
    let (mut s, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Jornada", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 18, 0)));

    let outcome = s
        .submit(
            draft(id, "Guardia", dt(2025, 3, 1, 12, 0), dt(2025, 3, 1, 13, 0)),
            ConflictPolicy::Adapt,
        )
        .unwrap();

    match outcome {
        Submission::Adapted {
            created,
            updated,
            deleted,
        } => {
            assert_eq!(created.len(), 2);
            assert_eq!(updated, 1);
            assert_eq!(deleted, 0);
        }
        other => panic!("expected Adapted, got {other:?}"),
    }
    assert!(s.detect_overlaps().is_empty());
}

#[test]
fn override_policy_deletes_conflicts_outright() {
    let (mut s, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "A", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 12, 0)));
    s.roster_mut()
        .create_shift(draft(id, "B", dt(2025, 3, 1, 12, 0), dt(2025, 3, 1, 16, 0)));

    let outcome = s
        .submit(
            draft(id, "Ganador", dt(2025, 3, 1, 9, 0), dt(2025, 3, 1, 13, 0)),
            ConflictPolicy::Override,
        )
        .unwrap();

    match outcome {
        Submission::Replaced { deleted, .. } => assert_eq!(deleted, 2),
        other => panic!("expected Replaced, got {other:?}"),
    }
    assert_eq!(s.roster().shifts.len(), 1);
    assert!(s.detect_overlaps().is_empty());
}

#[test]
fn plan_summary_snapshot() {
    let (mut s, id) = setup();
    s.roster_mut()
        .create_shift(draft(id, "Jornada", dt(2025, 3, 1, 8, 0), dt(2025, 3, 1, 18, 0)));

    let winner = draft(id, "Guardia", dt(2025, 3, 1, 12, 0), dt(2025, 3, 1, 13, 0));
    let plan = s.plan_adaptation(&winner);

    let mut parts: Vec<String> = Vec::new();
    for planned in &plan.to_create {
        let marker = if planned.is_new { "*" } else { "" };
        parts.push(format!(
            "create{marker} {} {}-{}",
            planned.draft.title,
            planned.draft.start.format("%H:%M"),
            planned.draft.end.format("%H:%M")
        ));
    }
    for update in &plan.to_update {
        parts.push(format!(
            "update #{} {}-{}",
            update.id.raw(),
            update.start.format("%H:%M"),
            update.end.format("%H:%M")
        ));
    }
    for id in &plan.to_delete {
        parts.push(format!("delete #{}", id.raw()));
    }

    insta::assert_snapshot!(
        parts.join(" | "),
        @"create* Guardia 12:00-13:00 | create Jornada 13:00-18:00 | update #1 08:00-12:00"
    );
}
