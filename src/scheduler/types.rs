use crate::model::{EmployeeId, Shift, ShiftDraft, ShiftId};
use crate::queue::ConflictCase;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Política ante un candidato en conflicto. Única para los tres puntos de
/// entrada (formulario manual, duplicación por arrastre, comandos de IA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Devuelve el caso al llamante sin tocar nada (flujo interactivo).
    Reject,
    /// Descarta el candidato y registra el día como omitido.
    Skip,
    /// Aplica el plan de adaptación (truncar / partir / borrar).
    Adapt,
    /// Borra los turnos en conflicto y crea el ganador tal cual.
    Override,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "skip" => Ok(Self::Skip),
            "adapt" => Ok(Self::Adapt),
            "override" => Ok(Self::Override),
            _ => Err(format!(
                "invalid conflict policy {raw:?}: expected reject|skip|adapt|override"
            )),
        }
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid time range: end must be after start")]
    InvalidTimeRange,
    #[error("{0}")]
    InvalidValue(String),
    #[error("unknown employee: {0}")]
    UnknownEmployee(String),
    #[error("unknown shift: {0}")]
    UnknownShift(i64),
    #[error("no days selected")]
    EmptySelection,
    #[error("ambiguous target, candidate titles: {}", .titles.join(", "))]
    AmbiguousTarget { titles: Vec<String> },
    #[error("candidate overlaps {conflicts} existing shift(s)")]
    ConflictRejected { conflicts: usize },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alta planificada: el candidato ganador (`is_new`) o un fragmento
/// superviviente de un turno truncado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedShift {
    pub draft: ShiftDraft,
    pub is_new: bool,
}

/// Recorte de un turno existente que sobrevive a la adaptación.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftUpdate {
    pub id: ShiftId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Salida pura del planificador de adaptación. Aplicada en orden
/// borrados → actualizaciones → altas, deja el día sin solapamientos.
#[derive(Debug, Clone, Default)]
pub struct AdaptationPlan {
    pub to_create: Vec<PlannedShift>,
    pub to_update: Vec<ShiftUpdate>,
    pub to_delete: Vec<ShiftId>,
}

impl AdaptationPlan {
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Resultado de aplicar un plan sobre el roster.
#[derive(Debug, Clone, Default)]
pub struct AppliedPlan {
    pub created: Vec<Shift>,
    pub updated: usize,
    pub deleted: usize,
}

/// Carril visual asignado a un turno dentro de su día.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneAssignment {
    pub shift: Shift,
    pub lane: usize,
    pub total_lanes: usize,
}

/// Par de turnos solapados detectado en una auditoría del roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapPair {
    pub employee: EmployeeId,
    pub shift_a: ShiftId,
    pub shift_b: ShiftId,
}

/// Desenlace de `Scheduler::submit` para un candidato.
#[derive(Debug, Clone)]
pub enum Submission {
    /// Sin conflicto: creado directamente.
    Created(Shift),
    /// Conflicto resuelto por adaptación.
    Adapted {
        created: Vec<Shift>,
        updated: usize,
        deleted: usize,
    },
    /// Conflicto resuelto borrando a los existentes.
    Replaced { created: Shift, deleted: usize },
    /// Conflicto devuelto al llamante (políticas `Reject` y `Skip`).
    Conflicted(ConflictCase),
}

/// Resumen liquidar-todo-y-contar de una operación masiva.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: Vec<NaiveDate>,
    pub errors: Vec<String>,
}

impl BulkReport {
    pub fn summary(&self) -> String {
        format!(
            "created {}, updated {}, deleted {}, skipped {}, errors {}",
            self.created,
            self.updated,
            self.deleted,
            self.skipped.len(),
            self.errors.len()
        )
    }
}
