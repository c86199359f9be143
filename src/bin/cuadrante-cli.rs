#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use cuadrante::{
    io,
    model::Color,
    notification::{prepare_reminder, TextReminder},
    scheduler::{ConflictPolicy, RangeParams, RotationParams, Scheduler, Submission},
    storage::{JsonStorage, Storage},
    template::{load_template_from_file, TemplateStore},
    CommandRegistry,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimalista de cuadrantes de turnos (sin base de datos)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Activa los logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichero JSON de roster
    #[arg(long, global = true, default_value = "cuadrante.json")]
    roster: String,

    /// Directorio de plantillas de turno
    #[arg(long, global = true, default_value = "templates")]
    templates: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dar de alta un empleado
    AddEmployee {
        #[arg(long)]
        name: String,
    },

    /// Crear un turno (formulario manual)
    CreateShift {
        #[arg(long)]
        employee: String,
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM; menor o igual que --start significa turno nocturno
        #[arg(long)]
        end: String,
        /// #RRGGBB (por defecto, color de paleta del empleado)
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// reject | skip | adapt | override
        #[arg(long, default_value = "reject")]
        on_conflict: String,
    },

    /// Un turno por día de un rango de fechas
    ScheduleRange {
        #[arg(long)]
        employee: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        skip_weekends: bool,
        #[arg(long, default_value = "skip")]
        on_conflict: String,
    },

    /// Rotación trabajo/descanso sobre un rango
    ScheduleRotation {
        #[arg(long)]
        employee: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        work_days: u32,
        #[arg(long)]
        rest_days: u32,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "skip")]
        on_conflict: String,
    },

    /// Mover los turnos de un empleado a otro (comprueba conflictos)
    Swap {
        #[arg(long)]
        from_employee: String,
        #[arg(long)]
        to_employee: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Duplicar los turnos de un empleado sobre otro (sin comprobación)
    Copy {
        #[arg(long)]
        from_employee: String,
        #[arg(long)]
        to_employee: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Carriles de pintado del día de un empleado
    Lanes {
        #[arg(long)]
        employee: String,
        #[arg(long)]
        date: String,
    },

    /// Auditar solapamientos residuales del roster
    Check {
        /// Export CSV de los pares solapados (opcional)
        #[arg(long)]
        report: Option<String>,
    },

    /// Guardar una plantilla de turno desde un fichero JSON
    TemplateSave {
        #[arg(long)]
        file: String,
    },

    /// Listar las plantillas guardadas
    TemplateList,

    /// Estampar una plantilla sobre un empleado y una fecha
    TemplateApply {
        #[arg(long)]
        id: String,
        #[arg(long)]
        employee: String,
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "reject")]
        on_conflict: String,
    },

    /// Importar empleados desde un CSV
    ImportEmployees {
        #[arg(long)]
        csv: String,
    },

    /// Importar turnos desde un CSV (pasa por el motor de conflictos)
    ImportShifts {
        #[arg(long)]
        csv: String,
        #[arg(long, default_value = "skip")]
        on_conflict: String,
    },

    /// Listar y opcionalmente exportar
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Generar un recordatorio de texto para un empleado
    Notify {
        #[arg(long)]
        employee: String,
        #[arg(long, default_value_t = 2)]
        days_before: i64,
        /// Fichero de salida (texto plano)
        #[arg(long)]
        out: String,
    },

    /// Despachar un comando del registro (function-calling)
    Ai {
        /// Nombre del comando registrado
        name: String,
        /// Argumentos JSON
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

fn parse_policy(raw: &str) -> Result<ConflictPolicy> {
    raw.parse::<ConflictPolicy>().map_err(anyhow::Error::msg)
}

fn parse_date(raw: &str) -> Result<chrono::NaiveDate> {
    cuadrante::time::parse_date(raw).map_err(anyhow::Error::msg)
}

fn parse_hhmm(raw: &str) -> Result<chrono::NaiveTime> {
    cuadrante::time::parse_hhmm(raw).map_err(anyhow::Error::msg)
}

fn employee_id(scheduler: &Scheduler, name: &str) -> Result<cuadrante::EmployeeId> {
    scheduler
        .roster()
        .find_employee_by_name(name)
        .map(|e| e.id)
        .ok_or_else(|| anyhow::anyhow!("unknown employee: {}", name))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.roster)?;
    let mut scheduler = Scheduler::with_roster(storage.load_or_default());

    let code = match cli.cmd {
        Commands::AddEmployee { name } => {
            let id = scheduler.roster_mut().add_employee(name.clone());
            storage.save(scheduler.roster())?;
            println!("employee {} -> id {}", name, id.raw());
            0
        }
        Commands::CreateShift {
            employee,
            title,
            date,
            start,
            end,
            color,
            location,
            notes,
            on_conflict,
        } => {
            let employee = employee_id(&scheduler, &employee)?;
            let date = parse_date(&date)?;
            let start_time = parse_hhmm(&start)?;
            let end_time = parse_hhmm(&end)?;
            let color = match color {
                Some(raw) => Color::new(raw).map_err(anyhow::Error::msg)?,
                None => Color::for_employee(employee),
            };
            let start_at = cuadrante::time::at(date, start_time);
            let end_at = cuadrante::time::resolve_overnight_end(start_at, end_time);
            let mut draft = cuadrante::ShiftDraft::new(employee, title, start_at, end_at, color)
                .map_err(anyhow::Error::msg)?;
            draft.location = location;
            draft.notes = notes;

            match scheduler.submit(draft, parse_policy(&on_conflict)?)? {
                Submission::Created(shift) => {
                    storage.save(scheduler.roster())?;
                    println!("created shift {}", shift.id.raw());
                    0
                }
                Submission::Adapted {
                    created,
                    updated,
                    deleted,
                } => {
                    storage.save(scheduler.roster())?;
                    println!(
                        "adapted: created {}, updated {updated}, deleted {deleted}",
                        created.len()
                    );
                    0
                }
                Submission::Replaced { created, deleted } => {
                    storage.save(scheduler.roster())?;
                    println!(
                        "created shift {} overriding {deleted} shift(s)",
                        created.id.raw()
                    );
                    0
                }
                Submission::Conflicted(case) => {
                    eprintln!(
                        "conflict: candidate overlaps {} shift(s)",
                        case.conflicts.len()
                    );
                    for shift in &case.conflicts {
                        eprintln!(
                            "  {} | {} -> {} | {}",
                            shift.id.raw(),
                            shift.start.format("%Y-%m-%d %H:%M"),
                            shift.end.format("%Y-%m-%d %H:%M"),
                            shift.title
                        );
                    }
                    // Código 2 = WARNING/conflicto sin resolver
                    2
                }
            }
        }
        Commands::ScheduleRange {
            employee,
            title,
            from,
            to,
            start,
            end,
            skip_weekends,
            on_conflict,
        } => {
            let employee = employee_id(&scheduler, &employee)?;
            let params = RangeParams {
                employee_id: employee,
                title,
                start_date: parse_date(&from)?,
                end_date: parse_date(&to)?,
                start_time: parse_hhmm(&start)?,
                end_time: parse_hhmm(&end)?,
                skip_weekends,
                color: Color::for_employee(employee),
                location: None,
                notes: None,
            };
            let report = scheduler.schedule_range(&params, parse_policy(&on_conflict)?)?;
            storage.save(scheduler.roster())?;
            println!("{}", report.summary());
            for day in &report.skipped {
                println!("skipped {day}");
            }
            if report.errors.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::ScheduleRotation {
            employee,
            title,
            work_days,
            rest_days,
            from,
            to,
            start,
            end,
            on_conflict,
        } => {
            let employee = employee_id(&scheduler, &employee)?;
            let params = RotationParams {
                employee_id: employee,
                title,
                work_days,
                rest_days,
                start_date: parse_date(&from)?,
                end_date: parse_date(&to)?,
                start_time: parse_hhmm(&start)?,
                end_time: parse_hhmm(&end)?,
                color: Color::for_employee(employee),
                location: None,
                notes: None,
            };
            let report = scheduler.schedule_rotation(&params, parse_policy(&on_conflict)?)?;
            storage.save(scheduler.roster())?;
            println!("{}", report.summary());
            if report.errors.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::Swap {
            from_employee,
            to_employee,
            from,
            to,
        } => {
            let from_id = employee_id(&scheduler, &from_employee)?;
            let to_id = employee_id(&scheduler, &to_employee)?;
            let report = scheduler
                .swap_employee_shifts(from_id, to_id, (parse_date(&from)?, parse_date(&to)?))?;
            storage.save(scheduler.roster())?;
            println!("{}", report.summary());
            0
        }
        Commands::Copy {
            from_employee,
            to_employee,
            from,
            to,
        } => {
            let from_id = employee_id(&scheduler, &from_employee)?;
            let to_id = employee_id(&scheduler, &to_employee)?;
            let report = scheduler
                .copy_employee_shifts(from_id, to_id, (parse_date(&from)?, parse_date(&to)?))?;
            storage.save(scheduler.roster())?;
            println!("{}", report.summary());
            0
        }
        Commands::Lanes { employee, date } => {
            let employee = employee_id(&scheduler, &employee)?;
            let date = parse_date(&date)?;
            for assignment in scheduler.assign_lanes(employee, date) {
                println!(
                    "{}/{} | {} -> {} | {}",
                    assignment.lane,
                    assignment.total_lanes,
                    assignment.shift.start.format("%H:%M"),
                    assignment.shift.end.format("%Y-%m-%d %H:%M"),
                    assignment.shift.title
                );
            }
            0
        }
        Commands::Check { report } => {
            let overlaps = scheduler.detect_overlaps();
            if overlaps.is_empty() {
                println!("OK: no overlaps");
                0
            } else {
                eprintln!("Found {} overlapping pair(s)", overlaps.len());
                if let Some(path) = report {
                    io::export_overlaps_csv(path, scheduler.roster(), &overlaps)?;
                }
                2
            }
        }
        Commands::TemplateSave { file } => {
            let template = load_template_from_file(&file)?;
            let store = TemplateStore::new(&cli.templates);
            let path = store.save(&template)?;
            println!("saved template {} -> {}", template.id, path.display());
            0
        }
        Commands::TemplateList => {
            let store = TemplateStore::new(&cli.templates);
            for info in store.list()? {
                println!(
                    "{} | {} | {} -> {}",
                    info.template.id,
                    info.template.title,
                    info.template.start_time.format("%H:%M"),
                    info.template.end_time.format("%H:%M")
                );
            }
            0
        }
        Commands::TemplateApply {
            id,
            employee,
            date,
            on_conflict,
        } => {
            let store = TemplateStore::new(&cli.templates);
            let template = store.load(&id)?;
            let employee = employee_id(&scheduler, &employee)?;
            let draft = template.instantiate(employee, parse_date(&date)?);
            match scheduler.submit(draft, parse_policy(&on_conflict)?)? {
                Submission::Conflicted(case) => {
                    eprintln!(
                        "conflict: template overlaps {} shift(s)",
                        case.conflicts.len()
                    );
                    2
                }
                _ => {
                    storage.save(scheduler.roster())?;
                    println!("applied template {id}");
                    0
                }
            }
        }
        Commands::ImportEmployees { csv } => {
            let names = io::import_employees_csv(csv)?;
            if names.is_empty() {
                bail!("no employees found in CSV");
            }
            for name in names {
                scheduler.roster_mut().add_employee(name);
            }
            storage.save(scheduler.roster())?;
            0
        }
        Commands::ImportShifts { csv, on_conflict } => {
            let policy = parse_policy(&on_conflict)?;
            let drafts = io::import_shifts_csv(csv, scheduler.roster())?;
            let mut created = 0usize;
            let mut skipped = 0usize;
            for draft in drafts {
                match scheduler.submit(draft, policy)? {
                    Submission::Conflicted(_) => skipped += 1,
                    _ => created += 1,
                }
            }
            storage.save(scheduler.roster())?;
            println!("imported {created}, skipped {skipped}");
            0
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_roster_json(path, scheduler.roster())?;
            }
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, scheduler.roster())?;
            }
            // impresión compacta
            for s in &scheduler.roster().shifts {
                let employee = scheduler
                    .roster()
                    .find_employee(s.employee_id)
                    .map(|e| e.name.as_str())
                    .unwrap_or("-");
                println!(
                    "{} | {} -> {} | {} | {}{}",
                    s.id.raw(),
                    s.start.format("%Y-%m-%d %H:%M"),
                    s.end.format("%Y-%m-%d %H:%M"),
                    employee,
                    s.title,
                    if s.is_overnight() { " (nocturno)" } else { "" }
                );
            }
            0
        }
        Commands::Notify {
            employee,
            days_before,
            out,
        } => {
            let renderer = TextReminder;
            let reminder = prepare_reminder(
                scheduler.roster(),
                &employee,
                days_before,
                chrono::Local::now().naive_local(),
                &renderer,
            )?;
            std::fs::write(&out, reminder.content)?;
            println!(
                "Reminder generated for {} (shift {}) at {}",
                reminder.employee_name,
                reminder.shift_id,
                reminder.notice_at.format("%Y-%m-%d %H:%M")
            );
            0
        }
        Commands::Ai { name, args } => {
            let registry = CommandRegistry::standard();
            let args: serde_json::Value = serde_json::from_str(&args)?;
            let reply = registry.dispatch(&mut scheduler, &name, args);
            if reply.success {
                storage.save(scheduler.roster())?;
            }
            println!("{}", serde_json::to_string_pretty(&reply)?);
            if reply.success {
                0
            } else {
                2
            }
        }
    };

    std::process::exit(code);
}
