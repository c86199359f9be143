use super::{AdaptationPlan, PlannedShift, ShiftUpdate};
use crate::model::{Shift, ShiftDraft};
use crate::time;
use chrono::NaiveDateTime;

/// Suelo de duración: ningún fragmento superviviente baja de 15 minutos.
pub const MIN_SHIFT_MINUTES: i64 = 15;

/// Calcula el plan de cambio mínimo que elimina todos los solapamientos
/// entre el candidato ganador y los turnos existentes, conservando de cada
/// existente todo fragmento que respete el suelo de duración.
///
/// Geometría por turno en conflicto:
/// - contenido por completo en el ganador → borrado;
/// - empieza antes del ganador → se trunca su fin al inicio del ganador
///   (o se borra si el resto no llega al suelo) y, si además desborda el
///   fin del ganador, la cola se recrea como turno nuevo;
/// - empieza dentro del ganador y termina después → se adelanta su inicio
///   al fin del ganador (o se borra si el resto no llega al suelo).
///
/// Puro: no toca el roster. El llamante aplica el plan en orden
/// borrados → actualizaciones → altas.
pub(super) fn plan_adaptation(winning: &ShiftDraft, conflicts: &[Shift]) -> AdaptationPlan {
    let mut plan = AdaptationPlan::default();
    plan.to_create.push(PlannedShift {
        draft: winning.clone(),
        is_new: true,
    });

    for existing in conflicts {
        if winning.start <= existing.start && winning.end >= existing.end {
            plan.to_delete.push(existing.id);
            continue;
        }

        if existing.start < winning.start {
            if time::minutes_between(existing.start, winning.start) >= MIN_SHIFT_MINUTES {
                plan.to_update.push(ShiftUpdate {
                    id: existing.id,
                    start: existing.start,
                    end: winning.start,
                });
            } else {
                plan.to_delete.push(existing.id);
            }
            if existing.end > winning.end {
                push_trailing_fragment(&mut plan, existing, winning.end);
            }
            continue;
        }

        // Empieza dentro del ganador y termina después de él.
        if time::minutes_between(winning.end, existing.end) >= MIN_SHIFT_MINUTES {
            plan.to_update.push(ShiftUpdate {
                id: existing.id,
                start: winning.end,
                end: existing.end,
            });
        } else {
            plan.to_delete.push(existing.id);
        }
    }

    plan
}

/// Cola `[from, existing.end)` recreada como turno nuevo con los metadatos
/// del existente; si no llega al suelo se descarta en silencio.
fn push_trailing_fragment(plan: &mut AdaptationPlan, existing: &Shift, from: NaiveDateTime) {
    if time::minutes_between(from, existing.end) < MIN_SHIFT_MINUTES {
        return;
    }
    plan.to_create.push(PlannedShift {
        draft: ShiftDraft {
            employee_id: existing.employee_id,
            title: existing.title.clone(),
            start: from,
            end: existing.end,
            location: existing.location.clone(),
            notes: existing.notes.clone(),
            color: existing.color.clone(),
        },
        is_new: false,
    });
}
