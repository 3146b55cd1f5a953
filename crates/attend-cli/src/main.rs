use std::path::Path;

use anyhow::{Context, Result};
use attend_core::EmployeeId;
use attend_db::RecordFilter;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use attend_cli::commands::settings::ScheduleUpdate;
use attend_cli::commands::{employees, records, report, scan, settings, status, util};
use attend_cli::{Cli, Commands, Config, EmployeesAction, RangeArgs, ScheduleArgs, SettingsAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(attend_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = attend_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn record_filter(range: &RangeArgs) -> Result<RecordFilter> {
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            anyhow::bail!("--from {from} is after --to {to}");
        }
    }
    Ok(RecordFilter {
        employee_id: range.employee.as_deref().map(EmployeeId::new).transpose()?,
        shift: None,
        from: range.from,
        to: range.to,
    })
}

fn schedule_update(args: &ScheduleArgs) -> ScheduleUpdate {
    ScheduleUpdate {
        am_start: args.am_start,
        am_end: args.am_end,
        pm_start: args.pm_start,
        pm_end: args.pm_end,
        night_start: args.night_start,
        night_end: args.night_end,
        am_grace: args.am_grace,
        pm_grace: args.pm_grace,
        night_grace: args.night_grace,
        half_day_threshold: args.half_day_threshold,
        scan_cooldown_secs: args.scan_cooldown,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Scan {
            employee,
            shift,
            at,
            json,
        }) => {
            let at = util::resolve_at(at.as_deref())?;
            let (db, config) = open_database(cli.config.as_deref())?;
            let shift = shift.unwrap_or(config.default_shift);
            scan::run(
                &mut out,
                db,
                &config.lock_path(),
                employee,
                shift,
                at,
                *json,
            )?;
        }
        Some(Commands::Status {
            employee,
            shift,
            at,
            json,
        }) => {
            let at = util::resolve_at(at.as_deref())?;
            let (db, config) = open_database(cli.config.as_deref())?;
            let shift = shift.unwrap_or(config.default_shift);
            status::run(&mut out, db, employee, shift, at, *json)?;
        }
        Some(Commands::Employees(action)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                EmployeesAction::Add {
                    id,
                    name,
                    department,
                    position,
                } => employees::add(
                    &mut out,
                    &mut db,
                    id,
                    name,
                    department.clone(),
                    position.clone(),
                )?,
                EmployeesAction::List { json } => employees::list(&mut out, &db, *json)?,
            }
        }
        Some(Commands::Settings(action)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                SettingsAction::Show { json } => settings::show(&mut out, &db, *json)?,
                SettingsAction::Set(args) => {
                    settings::set(&mut out, &mut db, &schedule_update(args))?;
                }
            }
        }
        Some(Commands::Records { range, shift, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            let filter = RecordFilter {
                shift: *shift,
                ..record_filter(range)?
            };
            records::run(&mut out, &db, &filter, *json)?;
        }
        Some(Commands::Report { range, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            report::run(&mut out, &db, &record_filter(range)?, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
