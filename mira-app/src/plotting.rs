//! Charts rendered from a run's time-series log.

use anyhow::Result;
use mira_core::{analysis, logger::TickLogEntry};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// The main function to generate and save all plots for a simulation run.
pub fn generate_all_plots(output_dir: &Path, log_path: &str) -> Result<()> {
    println!("[Plotting] Generating graphs from simulation data...");

    let data = analysis::read_log(log_path)?;

    if data.len() < 2 {
        println!("[Plotting] Warning: No data to plot.");
        return Ok(());
    }

    plot_yield_progress(output_dir, &data)?;
    plot_climate_tracking(output_dir, &data)?;
    plot_light_and_co2(output_dir, &data)?;

    println!("[Plotting] Graphs have been saved to '{}'.", output_dir.display());
    Ok(())
}

/// Predicted harvest against the cycle target. Drops back to zero at each rollover.
fn plot_yield_progress(output_dir: &Path, data: &[TickLogEntry]) -> Result<()> {
    let path = output_dir.join("1_yield_progress.png");
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_tick = last_tick(data);
    let max_yield = data
        .iter()
        .map(|d| d.yield_target.max(d.yield_current))
        .fold(1.0, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption("Yield Progress", ("sans-serif", 50).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0u64..max_tick, 0f64..max_yield * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Tick")
        .y_desc("Yield (g)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            data.iter().map(|d| (d.tick, d.yield_current)),
            GREEN.stroke_width(3),
        ))?
        .label("Predicted yield")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.filled()));

    chart
        .draw_series(LineSeries::new(
            data.iter().map(|d| (d.tick, d.yield_target)),
            BLACK.stroke_width(2),
        ))?
        .label("Target")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn plot_climate_tracking(output_dir: &Path, data: &[TickLogEntry]) -> Result<()> {
    let path = output_dir.join("2_climate_tracking.png");
    let root = BitMapBackend::new(&path, (1024, 1024)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((2, 1));
    draw_tracking_panel(
        &panels[0],
        "Air Temperature",
        "°C",
        data,
        |d| d.sensor_temperature,
        |d| d.set_temperature,
    )?;
    draw_tracking_panel(
        &panels[1],
        "Relative Humidity",
        "%",
        data,
        |d| d.sensor_relative_humidity,
        |d| d.set_relative_humidity,
    )?;
    root.present()?;
    Ok(())
}

fn plot_light_and_co2(output_dir: &Path, data: &[TickLogEntry]) -> Result<()> {
    let path = output_dir.join("3_light_and_co2.png");
    let root = BitMapBackend::new(&path, (1024, 1024)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((2, 1));
    draw_tracking_panel(
        &panels[0],
        "Light (PPFD)",
        "µmol/m²/s",
        data,
        |d| d.sensor_ppfd,
        |d| d.set_ppfd,
    )?;
    draw_tracking_panel(
        &panels[1],
        "CO₂",
        "ppm",
        data,
        |d| d.sensor_co2,
        |d| d.set_co2,
    )?;
    root.present()?;
    Ok(())
}

/// Reading against setpoint for one parameter.
fn draw_tracking_panel(
    area: &Panel<'_>,
    caption: &str,
    y_desc: &str,
    data: &[TickLogEntry],
    reading: fn(&TickLogEntry) -> f64,
    setpoint: fn(&TickLogEntry) -> f64,
) -> Result<()> {
    let max_tick = last_tick(data);
    let (low, high) = value_range(data.iter().flat_map(|d| [reading(d), setpoint(d)]));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0u64..max_tick, low..high)?;

    chart
        .configure_mesh()
        .x_desc("Tick")
        .y_desc(y_desc)
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            data.iter().map(|d| (d.tick, reading(d))),
            BLUE.stroke_width(1),
        ))?
        .label("Reading")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));

    chart
        .draw_series(LineSeries::new(
            data.iter().map(|d| (d.tick, setpoint(d))),
            RED.stroke_width(2),
        ))?
        .label("Setpoint")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

fn last_tick(data: &[TickLogEntry]) -> u64 {
    data.last().map_or(1, |d| d.tick).max(1)
}

/// Axis bounds with a little headroom; flat series get a unit band.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !low.is_finite() || !high.is_finite() {
        return (0.0, 1.0);
    }
    let span = high - low;
    if span < 1e-6 {
        (low - 1.0, high + 1.0)
    } else {
        (low - span * 0.05, high + span * 0.05)
    }
}
