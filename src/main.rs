//! TimelyCare demo
//!
//! Runs the phone and watch halves in one process over the in-process data
//! layer and walks through a typical day.

use chrono::{Local, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use timelycare::medication::{Frequency, Medication, MedicationType, Weekday};
use timelycare::vitals::{backfill, samples};
use timelycare::{logging, Config, InProcessDataLayer, PhoneState, WatchState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    logging::init(&config.logging);

    tracing::info!("TimelyCare v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.storage.data_dir);

    // Watch subscribes first so the phone has someone to push to
    let layer = Arc::new(InProcessDataLayer::new(config.watch.channel_capacity));
    let watch = WatchState::build(&config);
    let listener = watch.listen(layer.subscribe());
    let phone = PhoneState::build(&config, layer.clone());

    if phone.medications.is_empty() {
        add_sample_medications(&phone)?;
    }

    // Give the background push a moment to land on the watch
    let mut watch_rx = watch.medications.subscribe();
    let expected = phone.medications.len();
    let _ = tokio::time::timeout(
        Duration::from_millis(500),
        watch_rx.wait_for(|list| list.len() == expected),
    )
    .await;

    let status = phone.sync.status().await;
    match &status.last_outcome {
        Some(outcome) => tracing::info!(pushes = status.pushes, "Last sync: {}", outcome),
        None => tracing::info!("No sync attempted"),
    }

    println!("Watch sees {} medications:", watch.medications.len());
    for med in watch.medications.list() {
        println!("  {:<14} {:<8} {:<9} {}", med.name, med.dosage, med.time, med.frequency);
    }
    println!();

    // Today's schedule
    let today = Local::now().date_naive();
    let doses = phone.medications.scheduled_for(today);
    println!("Schedule for {}:", today);
    for dose in &doses {
        println!(
            "  {}  {:<14} {:<8} {}",
            dose.time.format("%-I:%M %p"),
            dose.name,
            dose.dosage,
            phone.taken.status(&dose.medication_id, dose.time, today)
        );
    }

    if let Some(first) = doses.first() {
        phone.taken.mark_taken(&first.medication_id, first.time, today);
        println!();
        println!(
            "Marked {} at {} taken ({} of {} doses today)",
            first.name,
            first.time.format("%-I:%M %p"),
            phone.taken.taken_count_on(today),
            doses.len()
        );
    }
    println!();

    // Vitals history
    let days = config.watch.history_days;
    println!("Heart rate, last {} days:", days);
    for day in backfill(&samples::heart_rate_day(today), today, days) {
        println!(
            "  {}  avg {:>3}  min {:>3}  max {:>3}",
            day.date, day.average, day.min, day.max
        );
    }
    println!();
    println!("Blood pressure, last {} days:", days);
    for day in backfill(&samples::blood_pressure_day(today), today, days) {
        println!(
            "  {}  avg {:>7}  {}",
            day.date,
            day.average.to_string(),
            day.average.category().display_name()
        );
    }

    tracing::info!("Shutting down...");
    drop(phone);
    listener.abort();

    tracing::info!("TimelyCare shutdown complete");
    Ok(())
}

fn add_sample_medications(phone: &PhoneState) -> Result<(), Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();
    let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).ok_or("invalid sample time");

    phone.medications.add(
        Medication::new("Amoxicillin", "500mg")
            .kind(MedicationType::Capsule)
            .between(today, today + chrono::Duration::days(9))
            .at(at(8, 0)?)
            .at(at(20, 0)?)
            .instructions("Take with food"),
    )?;

    phone.medications.add(
        Medication::new("Vitamin D", "1000IU")
            .kind(MedicationType::Tablet)
            .frequency(Frequency::on(&[Weekday::Monday, Weekday::Wednesday, Weekday::Friday]))
            .at(at(9, 0)?),
    )?;

    phone.medications.add(
        Medication::new("Lisinopril", "10mg")
            .kind(MedicationType::Pill)
            .at(at(7, 30)?),
    )?;

    tracing::info!(count = phone.medications.len(), "Added sample medications");
    Ok(())
}
