//! TimelyCare CLI
//!
//! Command-line interface for TimelyCare operations:
//! - Manage medications
//! - Show a day's schedule and mark doses taken
//! - Inspect the watch sync payload
//! - Browse synthetic vitals history

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use timelycare::config::generate_default_config;
use timelycare::medication::{
    Frequency, Medication, MedicationStore, MedicationType, TakenDoseTracker, Weekday,
};
use timelycare::state::PHONE_NAMESPACE;
use timelycare::sync::{encode, EncodedPayload, WireFormat};
use timelycare::vitals::{backfill, samples};
use timelycare::watch::WatchMedication;
use timelycare::{Config, PreferenceStore};

#[derive(Parser)]
#[command(name = "timelycare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Medication schedule and dose tracking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage medications
    Med {
        #[command(subcommand)]
        action: MedCommand,
    },

    /// Show the doses due on a day
    Schedule {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Mark a dose taken
    Take {
        /// Medication id
        id: String,
        /// Scheduled time as HH:MM
        time: String,
        /// Date as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Mark a dose not taken
    Untake {
        id: String,
        time: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Print the payload that would be pushed to the watch
    Encode {
        /// Wire format (framed, delimited)
        #[arg(short, long)]
        wire: Option<WireFormat>,
    },

    /// Show synthetic vitals history
    Vitals {
        kind: VitalKind,
        /// Number of past days
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum MedCommand {
    /// Add a medication
    Add {
        name: String,
        dosage: String,
        /// Pill, Tablet, Capsule, Liquid, Injection or Other
        #[arg(short = 'k', long, default_value = "Pill")]
        kind: String,
        /// Dose times as HH:MM (repeatable)
        #[arg(short, long)]
        time: Vec<String>,
        /// Days such as "Mon,Wed" (default: daily)
        #[arg(long)]
        days: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(short, long)]
        instructions: Option<String>,
    },

    /// List medications
    List,

    /// Remove a medication
    Remove { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum VitalKind {
    HeartRate,
    BloodPressure,
    Glucose,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    let json = cli.format == "json";

    match cli.command {
        Commands::Med { action } => {
            let store = MedicationStore::with_preferences(open_prefs(&config)?);
            match action {
                MedCommand::Add {
                    name,
                    dosage,
                    kind,
                    time,
                    days,
                    start,
                    end,
                    instructions,
                } => {
                    let mut med = Medication::new(name, dosage).kind(MedicationType::from_name(&kind));
                    for t in &time {
                        med = med.at(parse_time(t)?);
                    }
                    if let Some(days) = days {
                        med = med.frequency(parse_days(&days)?);
                    }
                    med.start_date = start;
                    med.end_date = end;
                    if let Some(instructions) = instructions {
                        med = med.instructions(instructions);
                    }

                    let id = med.id.clone();
                    store.add(med)?;
                    println!("Added medication {}", id);
                }

                MedCommand::List => {
                    let meds = store.list();
                    if json {
                        println!("{}", serde_json::to_string_pretty(&meds)?);
                    } else if meds.is_empty() {
                        println!("No medications yet.");
                        println!();
                        println!("Add one with:");
                        println!("  timelycare-cli med add Amoxicillin 500mg --time 08:00");
                    } else {
                        println!(
                            "{:<38} {:<20} {:<10} {:<10} {:<14} {}",
                            "ID", "Name", "Dosage", "Type", "Frequency", "Times"
                        );
                        println!("{}", "-".repeat(105));
                        for med in meds {
                            let times: Vec<String> =
                                med.times.iter().map(|t| t.format("%H:%M").to_string()).collect();
                            println!(
                                "{:<38} {:<20} {:<10} {:<10} {:<14} {}",
                                med.id,
                                med.name,
                                med.dosage,
                                med.medication_type.display_name(),
                                med.frequency.display(),
                                times.join(" ")
                            );
                        }
                    }
                }

                MedCommand::Remove { id } => {
                    let removed = store.delete(&id)?;
                    println!("Removed {} ({})", removed.name, removed.id);
                }
            }
        }

        Commands::Schedule { date } => {
            let date = date.unwrap_or_else(today);
            let prefs = open_prefs(&config)?;
            let store = MedicationStore::with_preferences(prefs.clone());
            let tracker = TakenDoseTracker::with_preferences(prefs);

            let doses = store.scheduled_for(date);
            if json {
                let rows: Vec<serde_json::Value> = doses
                    .iter()
                    .map(|d| {
                        serde_json::json!({
                            "dose": d,
                            "status": tracker.status(&d.medication_id, d.time, date),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if doses.is_empty() {
                println!("Nothing scheduled on {}", date);
            } else {
                println!("Schedule for {} ({} taken)", date, tracker.taken_count_on(date));
                println!();
                for dose in doses {
                    println!(
                        "  {}  {:<20} {:<10} {:<9} {}",
                        dose.time.format("%-I:%M %p"),
                        dose.name,
                        dose.dosage,
                        tracker.status(&dose.medication_id, dose.time, date),
                        dose.medication_id
                    );
                }
            }
        }

        Commands::Take { id, time, date } => set_taken(&config, &id, &time, date, true)?,
        Commands::Untake { id, time, date } => set_taken(&config, &id, &time, date, false)?,

        Commands::Encode { wire } => {
            let store = MedicationStore::with_preferences(open_prefs(&config)?);
            let projected: Vec<WatchMedication> =
                store.list().iter().map(WatchMedication::from_medication).collect();

            match encode(wire.unwrap_or(config.sync.format), &projected)? {
                EncodedPayload::Text(text) => println!("{}", text),
                EncodedPayload::Bytes(bytes) => {
                    for chunk in bytes.chunks(32) {
                        let line: String = chunk.iter().map(|b| format!("{:02x}", b)).collect();
                        println!("{}", line);
                    }
                    eprintln!("{} records, {} bytes", projected.len(), bytes.len());
                }
            }
        }

        Commands::Vitals { kind, days } => {
            let today = today();
            let days = days.unwrap_or(config.watch.history_days);
            match kind {
                VitalKind::HeartRate => {
                    let history = backfill(&samples::heart_rate_day(today), today, days);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&history)?);
                    } else {
                        println!("{:<12} {:>7} {:>7} {:>5} {:>5}", "Date", "Current", "Avg", "Min", "Max");
                        for day in history {
                            println!(
                                "{:<12} {:>7} {:>7} {:>5} {:>5}",
                                day.date, day.current, day.average, day.min, day.max
                            );
                        }
                    }
                }
                VitalKind::BloodPressure => {
                    let history = backfill(&samples::blood_pressure_day(today), today, days);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&history)?);
                    } else {
                        println!("{:<12} {:>9} {:>9} {:>9} {:>9}  {}", "Date", "Current", "Average", "Lowest", "Highest", "Category");
                        for day in history {
                            println!(
                                "{:<12} {:>9} {:>9} {:>9} {:>9}  {}",
                                day.date,
                                day.current.to_string(),
                                day.average.to_string(),
                                day.lowest.to_string(),
                                day.highest.to_string(),
                                day.average.category().display_name()
                            );
                        }
                    }
                }
                VitalKind::Glucose => {
                    let history = backfill(&samples::glucose_day(today), today, days);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&history)?);
                    } else {
                        println!("{:<12} {:>7} {:>7} {:>5} {:>5}", "Date", "Current", "Avg", "Min", "Max");
                        for day in history {
                            println!(
                                "{:<12} {:>7} {:>7} {:>5} {:>5}",
                                day.date, day.current.value, day.average.value, day.min.value, day.max.value
                            );
                        }
                    }
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn open_prefs(config: &Config) -> anyhow::Result<Arc<dyn PreferenceStore>> {
    config
        .storage
        .storage_config()
        .open(PHONE_NAMESPACE)
        .context("Failed to open phone preferences")
}

fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| anyhow!("Invalid time '{}', expected HH:MM", s))
}

fn parse_days(s: &str) -> anyhow::Result<Frequency> {
    if s.trim().eq_ignore_ascii_case("daily") {
        return Ok(Frequency::Daily);
    }

    let mut days = BTreeSet::new();
    for token in s.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        let day = Weekday::all()
            .iter()
            .copied()
            .find(|d| d.short_label().eq_ignore_ascii_case(token))
            .ok_or_else(|| anyhow!("Unknown day '{}', expected Mon..Sun", token))?;
        days.insert(day);
    }
    if days.is_empty() {
        bail!("No days given");
    }
    Ok(Frequency::SpecificDays(days))
}

fn set_taken(
    config: &Config,
    id: &str,
    time: &str,
    date: Option<NaiveDate>,
    taken: bool,
) -> anyhow::Result<()> {
    let prefs = open_prefs(config)?;
    let store = MedicationStore::with_preferences(prefs.clone());
    let med = store
        .get(id)
        .ok_or_else(|| anyhow!("No medication with id {}", id))?;

    let time = parse_time(time)?;
    let date = date.unwrap_or_else(today);
    if !med.times.contains(&time) {
        bail!("{} is not scheduled at {}", med.name, time.format("%H:%M"));
    }

    let tracker = TakenDoseTracker::with_preferences(prefs);
    if taken {
        tracker.mark_taken(id, time, date);
    } else {
        tracker.mark_not_taken(id, time, date);
    }

    println!(
        "{} {} at {} on {}: {}",
        med.name,
        med.dosage,
        time.format("%-I:%M %p"),
        date,
        tracker.status(id, time, date)
    );
    Ok(())
}
