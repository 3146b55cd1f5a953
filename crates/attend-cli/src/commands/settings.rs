//! Settings command for the organization-wide schedule.

use std::io::Write;

use anyhow::Result;
use attend_core::{ClockTime, ScheduleConfig, SessionKind};
use attend_db::Database;

/// Requested schedule changes; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub am_start: Option<ClockTime>,
    pub am_end: Option<ClockTime>,
    pub pm_start: Option<ClockTime>,
    pub pm_end: Option<ClockTime>,
    pub night_start: Option<ClockTime>,
    pub night_end: Option<ClockTime>,
    pub am_grace: Option<u32>,
    pub pm_grace: Option<u32>,
    pub night_grace: Option<u32>,
    pub half_day_threshold: Option<u32>,
    pub scan_cooldown_secs: Option<u32>,
}

impl ScheduleUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, config: &mut ScheduleConfig) {
        fn assign<T: Copy>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }
        assign(&mut config.am_start, self.am_start);
        assign(&mut config.am_end, self.am_end);
        assign(&mut config.pm_start, self.pm_start);
        assign(&mut config.pm_end, self.pm_end);
        assign(&mut config.night_start, self.night_start);
        assign(&mut config.night_end, self.night_end);
        assign(&mut config.am_grace, self.am_grace);
        assign(&mut config.pm_grace, self.pm_grace);
        assign(&mut config.night_grace, self.night_grace);
        assign(&mut config.half_day_threshold, self.half_day_threshold);
        assign(&mut config.scan_cooldown_secs, self.scan_cooldown_secs);
    }
}

/// Day sessions must be ordered within one calendar day; only the night
/// session may wrap past midnight.
fn validate(config: &ScheduleConfig) -> Result<()> {
    if config.am_start >= config.am_end {
        anyhow::bail!(
            "AM session must start before it ends ({} - {})",
            config.am_start,
            config.am_end
        );
    }
    if config.pm_start >= config.pm_end {
        anyhow::bail!(
            "PM session must start before it ends ({} - {})",
            config.pm_start,
            config.pm_end
        );
    }
    if config.am_end > config.pm_start {
        anyhow::bail!(
            "AM session must end by the PM start ({} > {})",
            config.am_end,
            config.pm_start
        );
    }
    if config.night_start == config.night_end {
        anyhow::bail!("night session cannot be empty ({})", config.night_start);
    }
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let config = db.load_schedule_config()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&config)?)?;
        return Ok(());
    }
    write_schedule(writer, &config)
}

pub fn set<W: Write>(writer: &mut W, db: &mut Database, update: &ScheduleUpdate) -> Result<()> {
    if update.is_empty() {
        anyhow::bail!("nothing to change; pass at least one option (see 'attend settings set --help')");
    }
    let mut config = db.load_schedule_config()?;
    update.apply(&mut config);
    validate(&config)?;
    db.save_schedule_config(&config)?;
    tracing::info!(?update, "schedule updated");

    writeln!(writer, "Schedule updated.")?;
    write_schedule(writer, &config)
}

fn write_schedule<W: Write>(writer: &mut W, config: &ScheduleConfig) -> Result<()> {
    for (label, kind) in [
        ("AM", SessionKind::Am),
        ("PM", SessionKind::Pm),
        ("Night", SessionKind::Night),
    ] {
        let session = config.session(kind);
        writeln!(
            writer,
            "{:<6} {} - {}  (grace {} min)",
            label, session.start, session.end, session.grace_minutes
        )?;
    }
    writeln!(
        writer,
        "Half-day after {} min late",
        config.half_day_threshold
    )?;
    writeln!(writer, "Scan cooldown {} s", config.scan_cooldown_secs)?;
    Ok(())
}
