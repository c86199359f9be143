//! Aritmética de hora de pared. Todo el crate deriva instantes e identifica
//! turnos nocturnos a través de este módulo, sin excepciones.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parsea una hora de pared `HH:MM`.
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| format!("invalid time {raw:?}: expected HH:MM"))
}

/// Parsea una fecha de calendario `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date {raw:?}: expected YYYY-MM-DD"))
}

/// Instante del día `date` a la hora `time` (hora civil local de la empresa).
pub fn at(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    NaiveDateTime::new(date, time)
}

fn minutes_of(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) / 60
}

/// Resuelve el instante de fin de un turno a partir de su hora de pared.
/// Si la hora de fin es menor o igual que la de inicio, el turno es
/// nocturno y termina al día siguiente; horas idénticas producen siempre
/// un turno de 24h, nunca uno de duración cero.
pub fn resolve_overnight_end(start: NaiveDateTime, end_time: NaiveTime) -> NaiveDateTime {
    if minutes_of(end_time) <= minutes_of(start.time()) {
        at(start.date().succ_opt().unwrap(), end_time)
    } else {
        at(start.date(), end_time)
    }
}

/// Contrato único de nocturnidad: día natural de fin posterior al de inicio.
pub fn is_overnight(start: NaiveDateTime, end: NaiveDateTime) -> bool {
    end.date() > start.date()
}

/// Intervalo en minutos relativo a la medianoche del día de inicio del
/// propio turno; el fin suma 1440 por cada día natural cruzado.
pub fn bucket_minutes(start: NaiveDateTime, end: NaiveDateTime) -> (i64, i64) {
    let spanned_days = (end.date() - start.date()).num_days();
    (
        minutes_of(start.time()),
        minutes_of(end.time()) + spanned_days * MINUTES_PER_DAY,
    )
}

pub fn minutes_between(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (b - a).num_minutes()
}
