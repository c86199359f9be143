use super::LaneAssignment;
use crate::model::Shift;

/// Asigna a cada turno del día su propio carril: orden estable por hora de
/// inicio ascendente, carril = índice, `total_lanes` = número de turnos.
/// No se empaquetan turnos compatibles en carriles compartidos; un carril
/// por turno es el comportamiento de producto.
pub(super) fn assign_lanes(day_shifts: &[&Shift]) -> Vec<LaneAssignment> {
    let mut ordered: Vec<&Shift> = day_shifts.to_vec();
    ordered.sort_by_key(|s| s.start);

    let total_lanes = ordered.len();
    ordered
        .into_iter()
        .enumerate()
        .map(|(lane, shift)| LaneAssignment {
            shift: shift.clone(),
            lane,
            total_lanes,
        })
        .collect()
}
