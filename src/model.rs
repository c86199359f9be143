use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identificador fuerte para Employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(i64);

impl EmployeeId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }
    pub fn raw(&self) -> i64 {
        self.0
    }
}

/// Identificador fuerte para Shift. Los ids negativos son provisionales
/// (turnos optimistas aún sin persistir).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(i64);

impl ShiftId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }
    pub fn raw(&self) -> i64 {
        self.0
    }
    pub fn is_placeholder(&self) -> bool {
        self.0 < 0
    }
}

/// Paleta fija de colores de turno.
pub const PALETTE: [&str; 8] = [
    "#2563EB", "#16A34A", "#DC2626", "#D97706", "#7C3AED", "#0D9488", "#DB2777", "#475569",
];

/// Color `#RRGGBB` validado (6 dígitos hexadecimales exactos).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(String);

impl Color {
    pub fn new<S: AsRef<str>>(raw: S) -> Result<Self, String> {
        let raw = raw.as_ref();
        let hex = raw
            .strip_prefix('#')
            .ok_or_else(|| format!("invalid color {raw:?}: expected #RRGGBB"))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color {raw:?}: expected #RRGGBB"));
        }
        Ok(Self(raw.to_owned()))
    }

    /// Color derivado de la paleta para un empleado (índice modular).
    pub fn for_employee(employee: EmployeeId) -> Self {
        let idx = employee.raw().rem_euclid(PALETTE.len() as i64) as usize;
        Self(PALETTE[idx].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(PALETTE[0].to_owned())
    }
}

/// Empleado de la empresa (el roster es el ámbito de visibilidad).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
}

/// Turno persistido de un empleado. Instantes en hora civil local de la
/// empresa; invariante `end > start` (un turno nocturno termina al día
/// siguiente).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub employee_id: EmployeeId,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub color: Color,
}

impl Shift {
    /// Duración en minutos.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Nocturno: termina en un día natural posterior al de inicio.
    pub fn is_overnight(&self) -> bool {
        crate::time::is_overnight(self.start, self.end)
    }
}

/// Candidato a turno todavía sin persistir (sin id). Lo producen el
/// formulario manual, las plantillas y los generadores masivos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDraft {
    pub employee_id: EmployeeId,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub color: Color,
}

impl ShiftDraft {
    /// Crea un candidato validando que `end > start`.
    pub fn new(
        employee_id: EmployeeId,
        title: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        color: Color,
    ) -> Result<Self, String> {
        if end <= start {
            return Err("end must be strictly after start".to_string());
        }
        Ok(Self {
            employee_id,
            title,
            start,
            end,
            location: None,
            notes: None,
            color,
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Actualización parcial de un turno.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftPatch {
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub color: Option<Color>,
}

/// Cuadrante completo de una empresa.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    #[serde(default)]
    last_employee_id: i64,
    #[serde(default)]
    last_shift_id: i64,
}

impl Roster {
    pub fn find_employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn find_employee_by_name<'a>(&'a self, name: &str) -> Option<&'a Employee> {
        self.employees.iter().find(|e| e.name == name)
    }

    pub fn find_shift(&self, id: ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }

    pub fn add_employee(&mut self, name: String) -> EmployeeId {
        self.last_employee_id += 1;
        let id = EmployeeId::new(self.last_employee_id);
        self.employees.push(Employee { id, name });
        id
    }

    /// Turnos de un empleado, opcionalmente acotados por fecha de inicio
    /// (rango inclusivo sobre el día natural de inicio del turno).
    pub fn shifts_for_employee(
        &self,
        employee: EmployeeId,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Vec<&Shift> {
        self.shifts
            .iter()
            .filter(|s| s.employee_id == employee)
            .filter(|s| match range {
                Some((from, to)) => s.start.date() >= from && s.start.date() <= to,
                None => true,
            })
            .collect()
    }

    /// Turnos de un empleado cuyo día natural de inicio es `date`.
    pub fn shifts_for_day(&self, employee: EmployeeId, date: NaiveDate) -> Vec<&Shift> {
        self.shifts
            .iter()
            .filter(|s| s.employee_id == employee && s.start.date() == date)
            .collect()
    }

    /// Persiste un candidato asignándole un id positivo.
    pub fn create_shift(&mut self, draft: ShiftDraft) -> Shift {
        self.last_shift_id += 1;
        let shift = Shift {
            id: ShiftId::new(self.last_shift_id),
            employee_id: draft.employee_id,
            title: draft.title,
            start: draft.start,
            end: draft.end,
            location: draft.location,
            notes: draft.notes,
            color: draft.color,
        };
        self.shifts.push(shift.clone());
        shift
    }

    /// Actualización parcial; revalida `end > start` sobre el resultado.
    pub fn update_shift(&mut self, id: ShiftId, patch: ShiftPatch) -> Result<Shift, String> {
        let shift = self
            .shifts
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| format!("unknown shift: {}", id.raw()))?;

        let start = patch.start.unwrap_or(shift.start);
        let end = patch.end.unwrap_or(shift.end);
        if end <= start {
            return Err("end must be strictly after start".to_string());
        }
        shift.start = start;
        shift.end = end;
        if let Some(title) = patch.title {
            shift.title = title;
        }
        if let Some(location) = patch.location {
            shift.location = Some(location);
        }
        if let Some(notes) = patch.notes {
            shift.notes = Some(notes);
        }
        if let Some(color) = patch.color {
            shift.color = color;
        }
        Ok(shift.clone())
    }

    /// Borrado definitivo; devuelve `false` si el id no existe.
    pub fn delete_shift(&mut self, id: ShiftId) -> bool {
        let before = self.shifts.len();
        self.shifts.retain(|s| s.id != id);
        self.shifts.len() < before
    }

    /// Borrado masivo por empleado y rango de fechas de inicio.
    pub fn delete_shifts_in_range(
        &mut self,
        employee: EmployeeId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> usize {
        let before = self.shifts.len();
        self.shifts.retain(|s| {
            !(s.employee_id == employee && s.start.date() >= from && s.start.date() <= to)
        });
        before - self.shifts.len()
    }
}
