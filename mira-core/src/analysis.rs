//! Post-run analysis of a time-series CSV.

use crate::{
    error::MiraError,
    logger::TickLogEntry,
    simulation::state::SimulationEvent,
};
use mira_schemas::{action::ActionSource, parameter::Parameter, plant::GrowthStage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters whose setpoint tracking is scored.
pub const TRACKED_PARAMETERS: [Parameter; 6] = [
    Parameter::Temperature,
    Parameter::RelativeHumidity,
    Parameter::Co2,
    Parameter::Ppfd,
    Parameter::Ec,
    Parameter::Ph,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle_number: u32,
    pub final_yield: f64,
    pub quality: f64,
    pub duration: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_ticks: u64,
    pub final_yield: f64,
    pub final_yield_target: f64,
    pub final_stage: Option<GrowthStage>,
    pub completed_cycles: Vec<CycleSummary>,
    pub ai_adjustments: u64,
    pub manual_adjustments: u64,
    pub stage_changes: u64,
    /// Mean `|reading - setpoint|` over all ticks.
    pub mean_tracking_error: BTreeMap<Parameter, f64>,
    /// How often each parameter was adjusted.
    pub adjustments_by_parameter: BTreeMap<Parameter, u64>,
}

impl RunSummary {
    pub fn mean_cycle_quality(&self) -> Option<f64> {
        if self.completed_cycles.is_empty() {
            return None;
        }
        let total: f64 = self.completed_cycles.iter().map(|c| c.quality).sum();
        Some(total / self.completed_cycles.len() as f64)
    }
}

pub fn read_log(log_path: &str) -> Result<Vec<TickLogEntry>, MiraError> {
    let mut reader = csv::Reader::from_path(log_path)
        .map_err(|e| MiraError::CsvError(log_path.to_string(), e))?;
    let mut entries = Vec::new();
    for result in reader.deserialize() {
        let record: TickLogEntry =
            result.map_err(|e| MiraError::CsvError(log_path.to_string(), e))?;
        entries.push(record);
    }
    Ok(entries)
}

pub fn summarize(entries: &[TickLogEntry]) -> Result<RunSummary, MiraError> {
    let mut summary = RunSummary::default();
    let mut error_sums: BTreeMap<Parameter, f64> = BTreeMap::new();

    for record in entries.iter().filter(|r| !r.is_initial()) {
        summary.total_ticks += 1;
        summary.final_yield = record.yield_current;
        summary.final_yield_target = record.yield_target;
        summary.final_stage = Some(record.stage);

        for parameter in TRACKED_PARAMETERS {
            if let Some((reading, setpoint)) = record.tracking_pair(parameter) {
                *error_sums.entry(parameter).or_insert(0.0) += (reading - setpoint).abs();
            }
        }

        let events: Vec<SimulationEvent> = serde_json::from_str(&record.events_json)?;
        for event in events {
            match event {
                SimulationEvent::StageChanged { .. } => summary.stage_changes += 1,
                SimulationEvent::SetpointAdjusted {
                    parameter, source, ..
                } => {
                    match source {
                        ActionSource::Ai => summary.ai_adjustments += 1,
                        ActionSource::Manual => summary.manual_adjustments += 1,
                    }
                    *summary.adjustments_by_parameter.entry(parameter).or_insert(0) += 1;
                }
                SimulationEvent::CycleCompleted {
                    cycle_number,
                    final_yield,
                    quality,
                    duration,
                } => summary.completed_cycles.push(CycleSummary {
                    cycle_number,
                    final_yield,
                    quality,
                    duration,
                }),
            }
        }
    }

    if summary.total_ticks > 0 {
        let n = summary.total_ticks as f64;
        summary.mean_tracking_error = error_sums.into_iter().map(|(p, sum)| (p, sum / n)).collect();
    }
    Ok(summary)
}

pub fn summarize_log(log_path: &str) -> Result<RunSummary, MiraError> {
    let entries = read_log(log_path)?;
    summarize(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tick: u64, phase: &str, events: &[SimulationEvent]) -> TickLogEntry {
        TickLogEntry {
            tick,
            phase: phase.to_string(),
            cycle_number: 1,
            day: 0,
            hour: 6,
            minute: 0,
            cycle_day: 0,
            stage: GrowthStage::Germination,
            sensor_temperature: 21.0,
            set_temperature: 20.0,
            sensor_relative_humidity: 70.0,
            set_relative_humidity: 70.0,
            sensor_vpd: 0.7,
            set_vpd: 0.7,
            sensor_co2: 460.0,
            set_co2: 450.0,
            sensor_ppfd: 0.0,
            set_ppfd: 0.0,
            sensor_ec: 1.2,
            set_ec: 1.2,
            sensor_ph: 6.0,
            set_ph: 6.0,
            sensor_stomata_openings: 60.0,
            set_stomata_openings: 60.0,
            sensor_photosynthesis_rate: 12.0,
            set_photosynthesis_rate: 12.0,
            external_temperature: 10.0,
            external_relative_humidity: 70.0,
            yield_current: tick as f64,
            yield_target: 200.0,
            adjusted_parameter: None,
            events_json: serde_json::to_string(events).unwrap(),
        }
    }

    #[test]
    fn test_summary_skips_initial_row_and_counts_events() {
        let entries = vec![
            row(0, "INITIAL", &[]),
            row(
                1,
                "TICK",
                &[SimulationEvent::SetpointAdjusted {
                    parameter: Parameter::Co2,
                    old_value: 450.0,
                    new_value: 455.0,
                    source: ActionSource::Ai,
                }],
            ),
            row(
                2,
                "TICK",
                &[
                    SimulationEvent::SetpointAdjusted {
                        parameter: Parameter::Ph,
                        old_value: 6.0,
                        new_value: 6.2,
                        source: ActionSource::Manual,
                    },
                    SimulationEvent::CycleCompleted {
                        cycle_number: 1,
                        final_yield: 180.0,
                        quality: 80.0,
                        duration: 31,
                    },
                ],
            ),
        ];

        let summary = summarize(&entries).unwrap();
        assert_eq!(summary.total_ticks, 2);
        assert_eq!(summary.ai_adjustments, 1);
        assert_eq!(summary.manual_adjustments, 1);
        assert_eq!(summary.final_yield, 2.0);
        assert_eq!(summary.completed_cycles.len(), 1);
        assert_eq!(summary.mean_cycle_quality(), Some(80.0));
        assert_eq!(summary.mean_tracking_error[&Parameter::Temperature], 1.0);
        assert_eq!(summary.mean_tracking_error[&Parameter::Co2], 10.0);
        assert_eq!(summary.adjustments_by_parameter[&Parameter::Ph], 1);
    }

    #[test]
    fn test_empty_log_has_no_errors_recorded() {
        let summary = summarize(&[]).unwrap();
        assert_eq!(summary.total_ticks, 0);
        assert!(summary.mean_tracking_error.is_empty());
        assert_eq!(summary.mean_cycle_quality(), None);
    }

    #[test]
    fn test_missing_log_is_csv_error() {
        assert!(matches!(
            read_log("/nonexistent/mira/run.csv"),
            Err(MiraError::CsvError(..))
        ));
    }
}
