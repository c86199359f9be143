use crate::model::{Color, Roster, ShiftDraft};
use crate::scheduler::OverlapPair;
use crate::time;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de empleados desde CSV: cabecera `name`.
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid employee row (empty name)");
        }
        out.push(name.to_string());
    }
    Ok(out)
}

/// Import de turnos: cabecera `employee,title,date,start,end[,color[,location]]`.
/// Horas de pared `HH:MM`; un fin menor o igual que el inicio se resuelve
/// como turno nocturno. Devuelve candidatos sin persistir: el llamante los
/// pasa por el motor de conflictos.
pub fn import_shifts_csv<P: AsRef<Path>>(
    path: P,
    roster: &Roster,
) -> anyhow::Result<Vec<ShiftDraft>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let employee_name = rec.get(0).context("missing employee")?.trim();
        let title = rec.get(1).context("missing title")?.trim().to_string();
        let date_raw = rec.get(2).context("missing date")?.trim();
        let start_raw = rec.get(3).context("missing start")?.trim();
        let end_raw = rec.get(4).context("missing end")?.trim();

        let employee = roster
            .find_employee_by_name(employee_name)
            .with_context(|| format!("unknown employee: {employee_name}"))?;
        let date = time::parse_date(date_raw).map_err(anyhow::Error::msg)?;
        let start_time = time::parse_hhmm(start_raw).map_err(anyhow::Error::msg)?;
        let end_time = time::parse_hhmm(end_raw).map_err(anyhow::Error::msg)?;

        let color = match rec.get(5).map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Color::new(raw).map_err(anyhow::Error::msg)?,
            None => Color::for_employee(employee.id),
        };

        let start = time::at(date, start_time);
        let end = time::resolve_overnight_end(start, end_time);
        let mut draft = ShiftDraft::new(employee.id, title, start, end, color)
            .map_err(anyhow::Error::msg)?;
        if let Some(location) = rec.get(6).map(str::trim).filter(|s| !s.is_empty()) {
            draft.location = Some(location.to_string());
        }
        out.push(draft);
    }
    Ok(out)
}

/// Export JSON del roster (con formato).
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV de turnos: cabecera `id,employee,title,start,end,color`.
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "employee", "title", "start", "end", "color"])?;
    let mut id_buf = itoa::Buffer::new();
    for s in &roster.shifts {
        let employee = roster
            .find_employee(s.employee_id)
            .map(|e| e.name.as_str())
            .unwrap_or("");
        let start = s.start.format("%Y-%m-%dT%H:%M:%S").to_string();
        let end = s.end.format("%Y-%m-%dT%H:%M:%S").to_string();
        w.write_record([
            id_buf.format(s.id.raw()),
            employee,
            s.title.as_str(),
            start.as_str(),
            end.as_str(),
            s.color.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV de la auditoría de solapamientos.
pub fn export_overlaps_csv<P: AsRef<Path>>(
    path: P,
    roster: &Roster,
    overlaps: &[OverlapPair],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["employee", "shift_a", "shift_b"])?;
    let mut a_buf = itoa::Buffer::new();
    let mut b_buf = itoa::Buffer::new();
    for pair in overlaps {
        let employee = roster
            .find_employee(pair.employee)
            .map(|e| e.name.as_str())
            .unwrap_or("");
        w.write_record([
            employee,
            a_buf.format(pair.shift_a.raw()),
            b_buf.format(pair.shift_b.raw()),
        ])?;
    }
    w.flush()?;
    Ok(())
}
