use super::OverlapPair;
use crate::model::{EmployeeId, Shift, ShiftId};
use crate::time;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Intervalos semiabiertos `[s, e)`: dos turnos espalda con espalda que
/// comparten frontera exacta no entran en conflicto.
fn minutes_overlap(a: (i64, i64), b: (i64, i64)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

fn in_bucket(shift: &Shift, employee: EmployeeId, candidate: &NaiveDateTime) -> bool {
    // El escaneo se ancla al día natural de inicio del candidato; un turno
    // nocturno que desborda la medianoche sigue indexado por su día de inicio.
    shift.employee_id == employee && shift.start.date() == candidate.date()
}

pub(super) fn has_overlap(
    shifts: &[Shift],
    employee: EmployeeId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude: Option<ShiftId>,
) -> bool {
    let candidate = time::bucket_minutes(start, end);
    shifts.iter().any(|s| {
        in_bucket(s, employee, &start)
            && exclude != Some(s.id)
            && minutes_overlap(time::bucket_minutes(s.start, s.end), candidate)
    })
}

/// Variante de los flujos masivos y de IA: lista completa de turnos en
/// conflicto, en el orden del roster, para alimentar al planificador.
pub(super) fn find_overlapping<'a>(
    shifts: &'a [Shift],
    employee: EmployeeId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude: Option<ShiftId>,
) -> Vec<&'a Shift> {
    let candidate = time::bucket_minutes(start, end);
    shifts
        .iter()
        .filter(|s| {
            in_bucket(s, employee, &start)
                && exclude != Some(s.id)
                && minutes_overlap(time::bucket_minutes(s.start, s.end), candidate)
        })
        .collect()
}

/// Auditoría del roster completo: pares solapados por empleado y día.
pub(super) fn detect_overlaps(shifts: &[Shift]) -> Vec<OverlapPair> {
    let mut buckets: BTreeMap<(EmployeeId, chrono::NaiveDate), Vec<&Shift>> = BTreeMap::new();
    for shift in shifts {
        buckets
            .entry((shift.employee_id, shift.start.date()))
            .or_default()
            .push(shift);
    }

    let mut out = Vec::new();
    for ((employee, _day), day_shifts) in buckets {
        for (idx, a) in day_shifts.iter().enumerate() {
            for b in day_shifts.iter().skip(idx + 1) {
                let ia = time::bucket_minutes(a.start, a.end);
                let ib = time::bucket_minutes(b.start, b.end);
                if minutes_overlap(ia, ib) {
                    out.push(OverlapPair {
                        employee,
                        shift_a: a.id,
                        shift_b: b.id,
                    });
                }
            }
        }
    }
    out
}
