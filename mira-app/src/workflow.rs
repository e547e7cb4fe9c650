use crate::config::{RunMode, RunRequest};
use crate::plotting;
use anyhow::{Context, Result};
use mira_core::{
    analysis::{self, RunSummary},
    simulation::{SimulationBuilder, SimulationEngine, SimulationSnapshot},
};
use mira_schemas::crop::CropConfig;
use std::{fs, path::Path, thread, time::Duration};

/// Builds a session for `crop`, drives it as the request asks and writes every artefact
/// of the run into `output_dir`.
pub fn run_session(request: &RunRequest, crop: CropConfig, output_dir: &Path) -> Result<()> {
    println!(
        "\n--- [Workflow] Growing {} for {} ticks at {} h/tick ({:?}) ---",
        crop.name, request.ticks, request.speed, request.mode
    );

    let log_path = output_dir.join("timeseries.csv");
    let log_path = log_path
        .to_str()
        .context("Output path is not valid UTF-8")?
        .to_string();

    let mut builder = SimulationBuilder::new()
        .with_crop(crop)
        .with_speed(request.speed)
        .with_agent_tuning(request.agent)
        .with_timeseries_logging_to_file(&log_path);
    if let Some(seed) = request.seed {
        builder = builder.with_seed(seed);
    }
    let mut engine = builder.build()?;

    match request.mode {
        RunMode::Headless => run_headless(&mut engine, request.ticks)?,
        RunMode::Realtime => run_realtime(
            &mut engine,
            request.ticks,
            Duration::from_millis(request.tick_interval_ms),
        )?,
    }

    write_json(output_dir, "final_snapshot.json", &engine.snapshot())?;
    write_json(output_dir, "action_log.json", engine.action_log())?;
    write_json(output_dir, "cycles.json", engine.cycles())?;

    let summary = analysis::summarize_log(&log_path)?;
    plotting::generate_all_plots(output_dir, &log_path)?;

    print_session_report(&engine);
    print_run_summary(&summary);
    Ok(())
}

pub fn run_headless(engine: &mut SimulationEngine, ticks: u64) -> Result<()> {
    let report_every = (ticks / 10).max(1);
    for tick in 1..=ticks {
        engine.tick()?;
        if tick % report_every == 0 {
            log::info!("{}", status_line(&engine.snapshot()));
        }
    }
    Ok(())
}

/// Ticks once per `interval` of wall-clock time, printing the chamber state each time.
pub fn run_realtime(engine: &mut SimulationEngine, ticks: u64, interval: Duration) -> Result<()> {
    for tick in 1..=ticks {
        engine.tick()?;
        println!("{}", status_line(&engine.snapshot()));
        if tick < ticks {
            thread::sleep(interval);
        }
    }
    Ok(())
}

fn status_line(snapshot: &SimulationSnapshot) -> String {
    let sensor = &snapshot.sensor_data;
    let set = &snapshot.set_values;
    let marker = snapshot
        .adjusted_parameter
        .map(|p| format!("  * adjusted {}", p.display_name()))
        .unwrap_or_default();
    format!(
        "[tick {:>5}] cycle {} day {:>3} {:02}:{:02} {:<11} | T {:>5.1}/{:>5.1} °C  RH {:>5.1}/{:>5.1} %  CO₂ {:>6.0}/{:>6.0}  PPFD {:>5.0}/{:>5.0} | yield {:>6.1}/{:>6.1} g{}",
        snapshot.tick,
        snapshot.current_cycle.cycle_number,
        snapshot.time.cycle_day,
        snapshot.time.hour,
        snapshot.time.minute,
        snapshot.plant_stage.stage,
        sensor.temperature,
        set.temperature,
        sensor.relative_humidity,
        set.relative_humidity,
        sensor.co2,
        set.co2,
        sensor.ppfd,
        set.ppfd,
        snapshot.yield_progress.current,
        snapshot.yield_progress.target,
        marker
    )
}

fn write_json<T: serde::Serialize + ?Sized>(output_dir: &Path, name: &str, value: &T) -> Result<()> {
    let path = output_dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_session_report(engine: &SimulationEngine) {
    let snapshot = engine.snapshot();
    let crop = engine.crop();

    println!("\n\n--- [Session Report] ---");
    println!("========================================");
    println!("Crop: {} ({})", crop.name, crop.id);
    println!(
        "Cycle {} on day {} in the {} stage",
        snapshot.current_cycle.cycle_number, snapshot.time.cycle_day, snapshot.plant_stage.stage
    );
    println!(
        "Yield: {:.1} g of {:.1} g ({:.0}% of target)",
        snapshot.yield_progress.current,
        snapshot.yield_progress.target,
        snapshot.yield_progress.fraction() * 100.0
    );

    println!("\nCompleted Cycles:");
    if engine.cycles().is_empty() {
        println!("  - none");
    }
    for cycle in engine.cycles() {
        println!(
            "  - Cycle {:>2}: {:>3} days | {:>7.1} g | quality {:>5.1}",
            cycle.cycle_number,
            cycle.duration.unwrap_or(0),
            cycle.final_yield.unwrap_or(0.0),
            cycle.quality.unwrap_or(0.0)
        );
    }

    let a = &snapshot.actuators;
    println!("\nActuators (% duty):");
    println!("  - Heat pump:            {:>5.0}", a.heat_pump);
    println!("  - Cooldown:             {:>5.0}", a.cooldown);
    println!("  - Waterside economizer: {:>5.0}", a.waterside_economizer);
    println!("  - CO₂ valve:            {:>5.0}", a.co2_valve);
    println!("  - Chiller:              {:>5.0}", a.chiller);
    println!("  - EC pump:              {:>5.0}", a.ec_pump);
    println!("  - pH pump:              {:>5.0}", a.ph_pump);
    println!("  - LED dimmer:           {:>5.0}", a.led_dimmer);

    println!("\nRecent Agent Actions:");
    let log = engine.action_log();
    for entry in log.iter().rev().take(5) {
        println!(
            "  - [{}] {}: {:.2} -> {:.2}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.parameter.display_name(),
            entry.old_value,
            entry.new_value,
            entry.reason
        );
    }
}

pub fn print_run_summary(summary: &RunSummary) {
    println!("\n--- [Run Summary] ---");
    println!("========================================");
    println!("Ticks Logged: {}", summary.total_ticks);
    if let Some(stage) = summary.final_stage {
        println!("Final Stage: {}", stage);
    }
    println!(
        "Final Yield: {:.1} g / {:.1} g",
        summary.final_yield, summary.final_yield_target
    );
    println!("Cycles Completed: {}", summary.completed_cycles.len());
    if let Some(quality) = summary.mean_cycle_quality() {
        println!("Mean Cycle Quality: {:.1}", quality);
    }
    println!("Stage Changes: {}", summary.stage_changes);
    println!(
        "Setpoint Adjustments: {} by the agent, {} manual",
        summary.ai_adjustments, summary.manual_adjustments
    );
    for (parameter, count) in &summary.adjustments_by_parameter {
        println!("  - {:<22} {:>5}", parameter.display_name(), count);
    }

    println!("\nMean Tracking Error (|reading - setpoint|):");
    for (parameter, error) in &summary.mean_tracking_error {
        println!(
            "  - {:<22} {:>8.3} {}",
            parameter.display_name(),
            error,
            parameter.unit()
        );
    }
    println!("========================================");
}
