use crate::model::{Employee, Roster, Shift};
use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDateTime};

/// Recordatorio generado para un empleado.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub employee_name: String,
    pub shift_id: i64,
    pub notice_at: NaiveDateTime,
    pub content: String,
}

/// Permite customizar el render del mensaje (texto, push, etc.). El envío
/// en sí queda fuera de la librería.
pub trait ReminderRenderer {
    fn render(&self, employee: &Employee, shift: &Shift, notice_at: NaiveDateTime) -> String;
}

/// Gabarito de texto plano para un futuro mail/push.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReminder;

impl ReminderRenderer for TextReminder {
    fn render(&self, employee: &Employee, shift: &Shift, notice_at: NaiveDateTime) -> String {
        format!(
            "Hola {name},\n\nTienes el turno \"{title}\" del {start} al {end}.\nEste mensaje se generó el {notice}.\n\nRevisa tu cuadrante antes de empezar.\n",
            name = employee.name,
            title = shift.title,
            start = shift.start.format("%Y-%m-%d %H:%M"),
            end = shift.end.format("%Y-%m-%d %H:%M"),
            notice = notice_at.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Prepara un recordatorio para el próximo turno de un empleado.
pub fn prepare_reminder(
    roster: &Roster,
    employee_name: &str,
    days_before: i64,
    now: NaiveDateTime,
    renderer: &dyn ReminderRenderer,
) -> Result<Reminder> {
    if days_before < 0 {
        bail!("days_before must be positive");
    }

    let employee = roster
        .find_employee_by_name(employee_name)
        .with_context(|| format!("unknown employee: {employee_name}"))?;

    let mut upcoming: Vec<&Shift> = roster
        .shifts
        .iter()
        .filter(|shift| shift.employee_id == employee.id && shift.start >= now)
        .collect();

    if upcoming.is_empty() {
        bail!("no upcoming shift found for employee {employee_name}");
    }

    upcoming.sort_by_key(|shift| shift.start);
    let shift = upcoming[0];

    let notice_at = shift.start - Duration::days(days_before);

    let content = renderer.render(employee, shift, notice_at);
    Ok(Reminder {
        employee_name: employee.name.clone(),
        shift_id: shift.id.raw(),
        notice_at,
        content,
    })
}
