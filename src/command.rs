//! Registro tipado de comandos para el despacho por function-calling.
//!
//! Cada comando es nombre → struct de entrada validado (serde) → handler.
//! Los handlers pasan por los mismos contratos del `Scheduler` que la UI
//! interactiva: una sola política de conflictos para todos los caminos.
//! Los fallos de validación vuelven como respuesta estructurada
//! (`success: false`), nunca como pánico, para que una capa de lenguaje
//! natural pueda relatarlos.

use crate::model::{Color, EmployeeId, Shift, ShiftDraft, ShiftPatch};
use crate::scheduler::{
    ConflictPolicy, RangeParams, RotationParams, SchedError, Scheduler, Submission,
};
use crate::time;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Respuesta estructurada de un comando.
#[derive(Debug, Clone, Serialize)]
pub struct CommandReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandReply {
    pub fn ok<S: Into<String>>(message: S) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn fail<S: Into<String>>(error: S) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

pub type Handler = fn(&mut Scheduler, Value) -> CommandReply;

/// Tabla nombre → handler. `standard()` registra los comandos de serie.
pub struct CommandRegistry {
    entries: BTreeMap<&'static str, Handler>,
}

impl CommandRegistry {
    pub fn standard() -> Self {
        let mut registry = Self {
            entries: BTreeMap::new(),
        };
        registry.register("check_conflict", check_conflict);
        registry.register("create_shift", create_shift);
        registry.register("update_shift", update_shift);
        registry.register("delete_shifts", delete_shifts);
        registry.register("schedule_range", schedule_range);
        registry.register("schedule_rotation", schedule_rotation);
        registry.register("swap_shifts", swap_shifts);
        registry.register("copy_shifts", copy_shifts);
        registry
    }

    pub fn register(&mut self, name: &'static str, handler: Handler) {
        self.entries.insert(name, handler);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn dispatch(&self, scheduler: &mut Scheduler, name: &str, args: Value) -> CommandReply {
        match self.entries.get(name) {
            Some(handler) => handler(scheduler, args),
            None => CommandReply::fail(format!("unknown command: {name}")),
        }
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, String> {
    serde_json::from_value(args).map_err(|err| format!("invalid arguments: {err}"))
}

fn employee_by_name(scheduler: &Scheduler, name: &str) -> Result<EmployeeId, String> {
    scheduler
        .roster()
        .find_employee_by_name(name)
        .map(|e| e.id)
        .ok_or_else(|| format!("unknown employee: {name}"))
}

/// Resuelve el turno objetivo de una edición/borrado puntual. Con varios
/// turnos ese día y sin título que desambigüe, la respuesta es un error
/// estructurado con los títulos candidatos, nunca una elección silenciosa.
fn resolve_target(
    scheduler: &Scheduler,
    employee: EmployeeId,
    date: NaiveDate,
    title: Option<&str>,
) -> Result<Shift, SchedError> {
    let day_shifts = scheduler.roster().shifts_for_day(employee, date);
    let matching: Vec<&Shift> = match title {
        Some(t) => day_shifts.iter().filter(|s| s.title == t).copied().collect(),
        None => day_shifts.iter().copied().collect(),
    };
    match matching.len() {
        0 => Err(SchedError::InvalidValue(format!(
            "no shift found on {date}"
        ))),
        1 => Ok(matching[0].clone()),
        _ => Err(SchedError::AmbiguousTarget {
            titles: matching.iter().map(|s| s.title.clone()).collect(),
        }),
    }
}

fn parse_color(raw: Option<&str>, employee: EmployeeId) -> Result<Color, String> {
    match raw {
        Some(raw) => Color::new(raw),
        None => Ok(Color::for_employee(employee)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckConflictArgs {
    employee: String,
    date: String,
    start: String,
    end: String,
}

fn check_conflict(scheduler: &mut Scheduler, args: Value) -> CommandReply {
    let run = || -> Result<String, String> {
        let args: CheckConflictArgs = parse_args(args)?;
        let employee = employee_by_name(scheduler, &args.employee)?;
        let date = time::parse_date(&args.date)?;
        let conflict = scheduler
            .check_conflict(employee, date, &args.start, &args.end, None)
            .map_err(|err| err.to_string())?;
        Ok(format!("conflict: {conflict}"))
    };
    settle(run())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateShiftArgs {
    employee: String,
    date: String,
    start: String,
    end: String,
    title: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    on_conflict: Option<ConflictPolicy>,
}

fn create_shift(scheduler: &mut Scheduler, args: Value) -> CommandReply {
    let run = || -> Result<String, String> {
        let args: CreateShiftArgs = parse_args(args)?;
        let employee = employee_by_name(scheduler, &args.employee)?;
        let date = time::parse_date(&args.date)?;
        let start_time = time::parse_hhmm(&args.start)?;
        let end_time = time::parse_hhmm(&args.end)?;
        let color = parse_color(args.color.as_deref(), employee)?;

        let start = time::at(date, start_time);
        let end = time::resolve_overnight_end(start, end_time);
        let mut draft = ShiftDraft::new(employee, args.title, start, end, color)?;
        draft.location = args.location;
        draft.notes = args.notes;

        let policy = args.on_conflict.unwrap_or(ConflictPolicy::Adapt);
        match scheduler.submit(draft, policy).map_err(|e| e.to_string())? {
            Submission::Created(shift) => Ok(format!("created shift {}", shift.id.raw())),
            Submission::Adapted {
                created,
                updated,
                deleted,
            } => Ok(format!(
                "created with adaptation: created {}, updated {updated}, deleted {deleted}",
                created.len()
            )),
            Submission::Replaced { created, deleted } => Ok(format!(
                "created shift {} overriding {deleted} conflicting shift(s)",
                created.id.raw()
            )),
            Submission::Conflicted(case) => Err(format!(
                "candidate overlaps {} existing shift(s)",
                case.conflicts.len()
            )),
        }
    };
    settle(run())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateShiftArgs {
    employee: String,
    date: String,
    /// Título que desambigua cuando el día tiene varios turnos.
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    new_start: Option<String>,
    #[serde(default)]
    new_end: Option<String>,
    #[serde(default)]
    new_title: Option<String>,
    #[serde(default)]
    new_location: Option<String>,
    #[serde(default)]
    new_notes: Option<String>,
    #[serde(default)]
    new_color: Option<String>,
}

fn update_shift(scheduler: &mut Scheduler, args: Value) -> CommandReply {
    let run = || -> Result<String, String> {
        let args: UpdateShiftArgs = parse_args(args)?;
        let employee = employee_by_name(scheduler, &args.employee)?;
        let date = time::parse_date(&args.date)?;
        let target = resolve_target(scheduler, employee, date, args.title.as_deref())
            .map_err(|e| e.to_string())?;

        // Ambos extremos se rederivan de horas de pared para que la regla
        // de nocturnidad aplique igual que en el resto de caminos.
        let start_time = match &args.new_start {
            Some(raw) => time::parse_hhmm(raw)?,
            None => target.start.time(),
        };
        let end_time = match &args.new_end {
            Some(raw) => time::parse_hhmm(raw)?,
            None => target.end.time(),
        };
        let start = time::at(date, start_time);
        let end = time::resolve_overnight_end(start, end_time);

        let probe = ShiftDraft {
            employee_id: employee,
            title: target.title.clone(),
            start,
            end,
            location: None,
            notes: None,
            color: target.color.clone(),
        };
        let overlapping = scheduler.find_conflicts(&probe, Some(target.id));
        if !overlapping.is_empty() {
            return Err(format!(
                "update would overlap {} existing shift(s)",
                overlapping.len()
            ));
        }

        let color = match args.new_color.as_deref() {
            Some(raw) => Some(Color::new(raw)?),
            None => None,
        };
        scheduler
            .roster_mut()
            .update_shift(
                target.id,
                ShiftPatch {
                    start: Some(start),
                    end: Some(end),
                    title: args.new_title,
                    location: args.new_location,
                    notes: args.new_notes,
                    color,
                },
            )?;
        Ok(format!("updated shift {}", target.id.raw()))
    };
    settle(run())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteShiftsArgs {
    employee: String,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
    /// Título que desambigua un borrado puntual.
    #[serde(default)]
    title: Option<String>,
}

fn delete_shifts(scheduler: &mut Scheduler, args: Value) -> CommandReply {
    let run = || -> Result<String, String> {
        let args: DeleteShiftsArgs = parse_args(args)?;
        let employee = employee_by_name(scheduler, &args.employee)?;
        let from = time::parse_date(&args.start_date)?;
        let to = match &args.end_date {
            Some(raw) => time::parse_date(raw)?,
            None => from,
        };
        if to < from {
            return Err("invalid time range: end must be after start".to_string());
        }

        // Borrado de un solo día: exige desambiguar si hay varios turnos.
        if from == to {
            let target = resolve_target(scheduler, employee, from, args.title.as_deref())
                .map_err(|e| e.to_string())?;
            scheduler.roster_mut().delete_shift(target.id);
            return Ok(format!("deleted shift {}", target.id.raw()));
        }

        let deleted = match &args.title {
            Some(title) => {
                let ids: Vec<_> = scheduler
                    .roster()
                    .shifts_for_employee(employee, Some((from, to)))
                    .into_iter()
                    .filter(|s| &s.title == title)
                    .map(|s| s.id)
                    .collect();
                let mut count = 0;
                for id in ids {
                    if scheduler.roster_mut().delete_shift(id) {
                        count += 1;
                    }
                }
                count
            }
            None => scheduler
                .roster_mut()
                .delete_shifts_in_range(employee, from, to),
        };
        Ok(format!("deleted {deleted} shift(s)"))
    };
    settle(run())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduleRangeArgs {
    employee: String,
    title: String,
    start_date: String,
    end_date: String,
    start: String,
    end: String,
    #[serde(default)]
    skip_weekends: bool,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    on_conflict: Option<ConflictPolicy>,
}

fn schedule_range(scheduler: &mut Scheduler, args: Value) -> CommandReply {
    let run = || -> Result<String, String> {
        let args: ScheduleRangeArgs = parse_args(args)?;
        let employee = employee_by_name(scheduler, &args.employee)?;
        let params = RangeParams {
            employee_id: employee,
            title: args.title,
            start_date: time::parse_date(&args.start_date)?,
            end_date: time::parse_date(&args.end_date)?,
            start_time: time::parse_hhmm(&args.start)?,
            end_time: time::parse_hhmm(&args.end)?,
            skip_weekends: args.skip_weekends,
            color: parse_color(args.color.as_deref(), employee)?,
            location: args.location,
            notes: args.notes,
        };
        // El camino masivo de IA omite por defecto los días en conflicto.
        let policy = args.on_conflict.unwrap_or(ConflictPolicy::Skip);
        let report = scheduler
            .schedule_range(&params, policy)
            .map_err(|e| e.to_string())?;
        Ok(report.summary())
    };
    settle(run())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduleRotationArgs {
    employee: String,
    title: String,
    work_days: u32,
    rest_days: u32,
    start_date: String,
    end_date: String,
    start: String,
    end: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    on_conflict: Option<ConflictPolicy>,
}

fn schedule_rotation(scheduler: &mut Scheduler, args: Value) -> CommandReply {
    let run = || -> Result<String, String> {
        let args: ScheduleRotationArgs = parse_args(args)?;
        let employee = employee_by_name(scheduler, &args.employee)?;
        let params = RotationParams {
            employee_id: employee,
            title: args.title,
            work_days: args.work_days,
            rest_days: args.rest_days,
            start_date: time::parse_date(&args.start_date)?,
            end_date: time::parse_date(&args.end_date)?,
            start_time: time::parse_hhmm(&args.start)?,
            end_time: time::parse_hhmm(&args.end)?,
            color: parse_color(args.color.as_deref(), employee)?,
            location: None,
            notes: None,
        };
        let policy = args.on_conflict.unwrap_or(ConflictPolicy::Skip);
        let report = scheduler
            .schedule_rotation(&params, policy)
            .map_err(|e| e.to_string())?;
        Ok(report.summary())
    };
    settle(run())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CrossEmployeeArgs {
    from_employee: String,
    to_employee: String,
    start_date: String,
    end_date: String,
}

fn swap_shifts(scheduler: &mut Scheduler, args: Value) -> CommandReply {
    let run = || -> Result<String, String> {
        let args: CrossEmployeeArgs = parse_args(args)?;
        let from = employee_by_name(scheduler, &args.from_employee)?;
        let to = employee_by_name(scheduler, &args.to_employee)?;
        let range = (
            time::parse_date(&args.start_date)?,
            time::parse_date(&args.end_date)?,
        );
        let report = scheduler
            .swap_employee_shifts(from, to, range)
            .map_err(|e| e.to_string())?;
        Ok(report.summary())
    };
    settle(run())
}

fn copy_shifts(scheduler: &mut Scheduler, args: Value) -> CommandReply {
    let run = || -> Result<String, String> {
        let args: CrossEmployeeArgs = parse_args(args)?;
        let from = employee_by_name(scheduler, &args.from_employee)?;
        let to = employee_by_name(scheduler, &args.to_employee)?;
        let range = (
            time::parse_date(&args.start_date)?,
            time::parse_date(&args.end_date)?,
        );
        let report = scheduler
            .copy_employee_shifts(from, to, range)
            .map_err(|e| e.to_string())?;
        Ok(report.summary())
    };
    settle(run())
}

fn settle(outcome: Result<String, String>) -> CommandReply {
    match outcome {
        Ok(message) => CommandReply::ok(message),
        Err(error) => CommandReply::fail(error),
    }
}
