mod adapt;
mod conflicts;
mod generate;
mod lanes;
mod types;

pub use adapt::MIN_SHIFT_MINUTES;
pub use generate::{expand_range, expand_rotation, RangeParams, RotationParams};
pub use types::{
    AdaptationPlan, AppliedPlan, BulkReport, ConflictPolicy, LaneAssignment, OverlapPair,
    PlannedShift, SchedError, ShiftUpdate, Submission,
};

use crate::model::{EmployeeId, Roster, Shift, ShiftDraft, ShiftId, ShiftPatch};
use crate::queue::{ConflictCase, OptimisticLedger};
use crate::time;
use chrono::NaiveDate;

/// Motor de cuadrantes: encapsula el roster y centraliza la única política
/// de conflictos que comparten el formulario manual, la duplicación por
/// arrastre y los comandos de IA.
#[derive(Debug, Default)]
pub struct Scheduler {
    roster: Roster,
    ledger: OptimisticLedger,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roster(roster: Roster) -> Self {
        Self {
            roster,
            ledger: OptimisticLedger::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }
    pub fn ledger(&self) -> &OptimisticLedger {
        &self.ledger
    }

    fn require_employee(&self, id: EmployeeId) -> Result<(), SchedError> {
        if self.roster.find_employee(id).is_none() {
            return Err(SchedError::UnknownEmployee(id.raw().to_string()));
        }
        Ok(())
    }

    /// ¿Chocaría un turno `start..end` (horas de pared, fin nocturno
    /// resuelto) con los existentes del empleado ese día? `exclude` permite
    /// a una edición in situ ignorar su propio estado anterior.
    pub fn check_conflict(
        &self,
        employee: EmployeeId,
        date: NaiveDate,
        start: &str,
        end: &str,
        exclude: Option<ShiftId>,
    ) -> Result<bool, SchedError> {
        let start_time = time::parse_hhmm(start).map_err(SchedError::InvalidValue)?;
        let end_time = time::parse_hhmm(end).map_err(SchedError::InvalidValue)?;
        let start_at = time::at(date, start_time);
        let end_at = time::resolve_overnight_end(start_at, end_time);
        Ok(conflicts::has_overlap(
            &self.roster.shifts,
            employee,
            start_at,
            end_at,
            exclude,
        ))
    }

    /// Turnos existentes que pisa el candidato.
    pub fn find_conflicts(&self, draft: &ShiftDraft, exclude: Option<ShiftId>) -> Vec<Shift> {
        conflicts::find_overlapping(
            &self.roster.shifts,
            draft.employee_id,
            draft.start,
            draft.end,
            exclude,
        )
        .into_iter()
        .cloned()
        .collect()
    }

    /// Plan de adaptación para un ganador contra sus conflictos actuales.
    pub fn plan_adaptation(&self, winning: &ShiftDraft) -> AdaptationPlan {
        adapt::plan_adaptation(winning, &self.find_conflicts(winning, None))
    }

    /// Aplica un plan en orden borrados → actualizaciones → altas. Las
    /// altas pasan por el libro optimista: id provisional negativo primero,
    /// confirmado con el id persistido después.
    pub fn apply_plan(&mut self, plan: &AdaptationPlan) -> Result<AppliedPlan, SchedError> {
        let mut applied = AppliedPlan::default();

        for id in &plan.to_delete {
            if !self.roster.delete_shift(*id) {
                return Err(SchedError::UnknownShift(id.raw()));
            }
            applied.deleted += 1;
        }

        for update in &plan.to_update {
            self.roster
                .update_shift(
                    update.id,
                    ShiftPatch {
                        start: Some(update.start),
                        end: Some(update.end),
                        ..ShiftPatch::default()
                    },
                )
                .map_err(SchedError::InvalidValue)?;
            applied.updated += 1;
        }

        for planned in &plan.to_create {
            let placeholder = self.ledger.stage(planned.draft.clone());
            let shift = self.roster.create_shift(planned.draft.clone());
            self.ledger.confirm(placeholder, shift.id);
            applied.created.push(shift);
        }

        Ok(applied)
    }

    /// Carriles del día de un empleado, ordenados por hora de inicio.
    pub fn assign_lanes(&self, employee: EmployeeId, date: NaiveDate) -> Vec<LaneAssignment> {
        lanes::assign_lanes(&self.roster.shifts_for_day(employee, date))
    }

    /// Auditoría de solapamientos residuales en todo el roster.
    pub fn detect_overlaps(&self) -> Vec<OverlapPair> {
        conflicts::detect_overlaps(&self.roster.shifts)
    }

    /// Punto de entrada único para un candidato. Sin conflicto, se crea
    /// directamente; con conflicto, decide la política: `Reject`/`Skip`
    /// devuelven el caso al llamante, `Adapt` aplica el plan, `Override`
    /// borra a los existentes (un id ya desaparecido cuenta como borrado).
    pub fn submit(
        &mut self,
        draft: ShiftDraft,
        policy: ConflictPolicy,
    ) -> Result<Submission, SchedError> {
        self.require_employee(draft.employee_id)?;
        if draft.end <= draft.start {
            return Err(SchedError::InvalidTimeRange);
        }

        let conflicts = self.find_conflicts(&draft, None);
        if conflicts.is_empty() {
            return Ok(Submission::Created(self.roster.create_shift(draft)));
        }

        match policy {
            ConflictPolicy::Reject | ConflictPolicy::Skip => Ok(Submission::Conflicted(
                ConflictCase {
                    candidate: draft,
                    conflicts,
                },
            )),
            ConflictPolicy::Adapt => {
                let plan = adapt::plan_adaptation(&draft, &conflicts);
                let applied = self.apply_plan(&plan)?;
                Ok(Submission::Adapted {
                    created: applied.created,
                    updated: applied.updated,
                    deleted: applied.deleted,
                })
            }
            ConflictPolicy::Override => {
                let mut deleted = 0;
                for conflict in &conflicts {
                    if self.roster.delete_shift(conflict.id) {
                        deleted += 1;
                    }
                }
                Ok(Submission::Replaced {
                    created: self.roster.create_shift(draft),
                    deleted,
                })
            }
        }
    }

    /// Resuelve un caso retirado de la cola con la política elegida.
    pub fn resolve_case(
        &mut self,
        case: ConflictCase,
        policy: ConflictPolicy,
    ) -> Result<Submission, SchedError> {
        self.submit(case.candidate, policy)
    }

    /// Un turno por día del rango; cada día se liquida por separado y el
    /// informe resume altas, adaptaciones, días omitidos y errores.
    pub fn schedule_range(
        &mut self,
        params: &RangeParams,
        policy: ConflictPolicy,
    ) -> Result<BulkReport, SchedError> {
        self.require_employee(params.employee_id)?;
        let drafts = generate::expand_range(params)?;
        Ok(self.settle_bulk(drafts, policy))
    }

    /// Ciclo trabajo/descanso sobre el rango; misma liquidación por día.
    pub fn schedule_rotation(
        &mut self,
        params: &RotationParams,
        policy: ConflictPolicy,
    ) -> Result<BulkReport, SchedError> {
        self.require_employee(params.employee_id)?;
        let drafts = generate::expand_rotation(params)?;
        Ok(self.settle_bulk(drafts, policy))
    }

    fn settle_bulk(&mut self, drafts: Vec<ShiftDraft>, policy: ConflictPolicy) -> BulkReport {
        let mut report = BulkReport::default();
        for draft in drafts {
            let day = draft.start.date();
            match self.submit(draft, policy) {
                Ok(Submission::Created(_)) => report.created += 1,
                Ok(Submission::Adapted {
                    created,
                    updated,
                    deleted,
                }) => {
                    report.created += created.len();
                    report.updated += updated;
                    report.deleted += deleted;
                }
                Ok(Submission::Replaced { deleted, .. }) => {
                    report.created += 1;
                    report.deleted += deleted;
                }
                Ok(Submission::Conflicted(_)) => report.skipped.push(day),
                Err(err) => report.errors.push(format!("{day}: {err}")),
            }
        }
        report
    }

    /// Mueve los turnos de un empleado a otro (con comprobación de
    /// conflicto en destino).
    pub fn swap_employee_shifts(
        &mut self,
        from: EmployeeId,
        to: EmployeeId,
        range: (NaiveDate, NaiveDate),
    ) -> Result<BulkReport, SchedError> {
        generate::swap_employee_shifts(self, from, to, range)
    }

    /// Duplica los turnos de un empleado sobre otro (sin comprobación;
    /// las copias quedan para revisión posterior).
    pub fn copy_employee_shifts(
        &mut self,
        from: EmployeeId,
        to: EmployeeId,
        range: (NaiveDate, NaiveDate),
    ) -> Result<BulkReport, SchedError> {
        generate::copy_employee_shifts(self, from, to, range)
    }
}
