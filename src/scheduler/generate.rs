use super::{conflicts, BulkReport, SchedError, Scheduler};
use crate::model::{Color, EmployeeId, Shift, ShiftDraft};
use crate::time;
use anyhow::Context;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

/// Parámetros del generador por rango: un turno por día natural del
/// intervalo, opcionalmente saltando fines de semana.
#[derive(Debug, Clone)]
pub struct RangeParams {
    pub employee_id: EmployeeId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub skip_weekends: bool,
    pub color: Color,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Parámetros del generador de rotación trabajo/descanso. El ciclo arranca
/// en fase de trabajo: `start_date` siempre es día trabajado.
#[derive(Debug, Clone)]
pub struct RotationParams {
    pub employee_id: EmployeeId,
    pub title: String,
    pub work_days: u32,
    pub rest_days: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub color: Color,
    pub location: Option<String>,
    pub notes: Option<String>,
}

fn draft_for_day(
    employee_id: EmployeeId,
    title: &str,
    day: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    color: &Color,
    location: &Option<String>,
    notes: &Option<String>,
) -> ShiftDraft {
    let start = time::at(day, start_time);
    let end = time::resolve_overnight_end(start, end_time);
    ShiftDraft {
        employee_id,
        title: title.to_owned(),
        start,
        end,
        location: location.clone(),
        notes: notes.clone(),
        color: color.clone(),
    }
}

/// Candidatos sin persistir para cada día del rango. Validación previa a
/// cualquier mutación: orden de fechas y selección no vacía.
pub fn expand_range(params: &RangeParams) -> Result<Vec<ShiftDraft>, SchedError> {
    if params.end_date < params.start_date {
        return Err(SchedError::InvalidTimeRange);
    }

    let mut drafts = Vec::new();
    let mut current = params.start_date;
    while current <= params.end_date {
        let weekend = matches!(current.weekday(), Weekday::Sat | Weekday::Sun);
        if !(params.skip_weekends && weekend) {
            drafts.push(draft_for_day(
                params.employee_id,
                &params.title,
                current,
                params.start_time,
                params.end_time,
                &params.color,
                &params.location,
                &params.notes,
            ));
        }
        current = current.succ_opt().context("date overflow")?;
    }

    if drafts.is_empty() {
        return Err(SchedError::EmptySelection);
    }
    Ok(drafts)
}

/// Candidatos sin persistir de un ciclo `work_days` trabajados seguidos de
/// `rest_days` de descanso, repetido a lo largo del rango.
pub fn expand_rotation(params: &RotationParams) -> Result<Vec<ShiftDraft>, SchedError> {
    if params.end_date < params.start_date {
        return Err(SchedError::InvalidTimeRange);
    }
    if params.work_days == 0 {
        return Err(SchedError::InvalidValue("work_days must be > 0".to_string()));
    }

    let cycle = params.work_days + params.rest_days;
    let mut day_in_cycle = 0u32;
    let mut drafts = Vec::new();
    let mut current = params.start_date;
    while current <= params.end_date {
        if day_in_cycle < params.work_days {
            drafts.push(draft_for_day(
                params.employee_id,
                &params.title,
                current,
                params.start_time,
                params.end_time,
                &params.color,
                &params.location,
                &params.notes,
            ));
        }
        day_in_cycle = (day_in_cycle + 1) % cycle;
        current = current.succ_opt().context("date overflow")?;
    }

    if drafts.is_empty() {
        return Err(SchedError::EmptySelection);
    }
    Ok(drafts)
}

/// Mueve los turnos de `from` a `to` dentro del rango, con comprobación de
/// conflicto contra el destino turno a turno; los que chocan se quedan
/// donde están y se anotan como omitidos.
pub(super) fn swap_employee_shifts(
    scheduler: &mut Scheduler,
    from: EmployeeId,
    to: EmployeeId,
    range: (NaiveDate, NaiveDate),
) -> Result<BulkReport, SchedError> {
    scheduler.require_employee(from)?;
    scheduler.require_employee(to)?;

    let candidates: Vec<Shift> = scheduler
        .roster
        .shifts_for_employee(from, Some(range))
        .into_iter()
        .cloned()
        .collect();

    let mut report = BulkReport::default();
    for shift in candidates {
        if conflicts::has_overlap(&scheduler.roster.shifts, to, shift.start, shift.end, None) {
            report.skipped.push(shift.start.date());
            continue;
        }
        match scheduler
            .roster
            .shifts
            .iter_mut()
            .find(|s| s.id == shift.id)
        {
            Some(moved) => {
                moved.employee_id = to;
                report.updated += 1;
            }
            None => report
                .errors
                .push(format!("{}: shift vanished mid-swap", shift.id.raw())),
        }
    }
    Ok(report)
}

/// Duplica los turnos de `from` sobre `to` dentro del rango, recoloreados
/// con el color de paleta del destino. Sin comprobación de conflictos: las
/// copias se revisan después.
pub(super) fn copy_employee_shifts(
    scheduler: &mut Scheduler,
    from: EmployeeId,
    to: EmployeeId,
    range: (NaiveDate, NaiveDate),
) -> Result<BulkReport, SchedError> {
    scheduler.require_employee(from)?;
    scheduler.require_employee(to)?;

    let color = Color::for_employee(to);
    let sources: Vec<Shift> = scheduler
        .roster
        .shifts_for_employee(from, Some(range))
        .into_iter()
        .cloned()
        .collect();

    let mut report = BulkReport::default();
    for shift in sources {
        scheduler.roster.create_shift(ShiftDraft {
            employee_id: to,
            title: shift.title,
            start: shift.start,
            end: shift.end,
            location: shift.location,
            notes: shift.notes,
            color: color.clone(),
        });
        report.created += 1;
    }
    Ok(report)
}
