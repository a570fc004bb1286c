//! Replay recorded position reports through the tracker
//!
//! Input is CSV with one report per row. Reports are grouped per callsign,
//! each callsign's stream is processed in time order and callsigns run in
//! parallel. Output is one JSON object per processed situation.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::aircraft_performance::{PerformanceLookup, PerformanceTable};
use crate::config::SitusConfig;
use crate::elevation_plane::ElevationProvenance;
use crate::geo::GeoPoint;
use crate::on_ground_guess::GuessReason;
use crate::situation::{AltitudeCorrection, Callsign, GroundDetails, GroundState};
use crate::tracker::{PositionReport, ProcessedSituation, SituationTracker};
use crate::units::{degrees, feet, in_feet, knots};

/// One CSV row
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRecord {
    pub callsign: String,
    pub timestamp: DateTime<Utc>,
    pub time_offset_ms: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_ft: f64,
    pub pitch_deg: Option<f64>,
    pub bank_deg: Option<f64>,
    pub heading_deg: Option<f64>,
    pub ground_speed_kts: Option<f64>,
    pub on_ground: Option<bool>,
    pub ground_elevation_ft: Option<f64>,
    pub icao_type: Option<String>,
}

impl ReportRecord {
    pub fn to_report(&self) -> PositionReport {
        PositionReport {
            callsign: Callsign::new(&self.callsign),
            timestamp: self.timestamp,
            time_offset_ms: self.time_offset_ms.unwrap_or(0),
            position: GeoPoint::new(self.latitude, self.longitude),
            altitude: feet(self.altitude_ft),
            pressure_altitude: None,
            pitch: degrees(self.pitch_deg.unwrap_or(0.0)),
            bank: degrees(self.bank_deg.unwrap_or(0.0)),
            heading: degrees(self.heading_deg.unwrap_or(0.0)),
            ground_speed: self.ground_speed_kts.map(knots),
            on_ground: self.on_ground,
            ground_elevation: self.ground_elevation_ft.map(feet),
        }
    }

    /// Timestamp plus time offset, `None` if out of range
    pub fn adjusted_timestamp(&self) -> Option<DateTime<Utc>> {
        self.to_report().adjusted_timestamp()
    }
}

/// One JSON output line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayRecord {
    pub callsign: String,
    pub timestamp: DateTime<Utc>,
    pub adjusted_timestamp: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub reported_altitude_ft: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub correction: AltitudeCorrection,
    pub ground_elevation_ft: Option<f64>,
    pub elevation_provenance: ElevationProvenance,
    pub elevation_transferred: bool,
    pub on_ground: GroundState,
    pub on_ground_details: GroundDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenery_offset_ft: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guess_reason: Option<GuessReason>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub history_reset: bool,
}

impl From<&ProcessedSituation> for ReplayRecord {
    fn from(p: &ProcessedSituation) -> Self {
        let s = &p.situation;
        Self {
            callsign: s.callsign.to_string(),
            timestamp: s.timestamp,
            adjusted_timestamp: s.adjusted_timestamp(),
            latitude: s.position.map(|p| p.latitude),
            longitude: s.position.map(|p| p.longitude),
            reported_altitude_ft: p.reported_altitude.map(in_feet),
            altitude_ft: s.altitude.map(in_feet),
            correction: p.correction,
            ground_elevation_ft: s.ground_elevation().map(|plane| in_feet(plane.elevation())),
            elevation_provenance: s.ground_elevation_provenance(),
            elevation_transferred: p.elevation_transferred,
            on_ground: s.on_ground_info().state(),
            on_ground_details: s.on_ground_info().details(),
            scenery_offset_ft: p.scenery_offset.map(in_feet),
            guess_reason: p.guess.map(|g| g.reason),
            history_reset: p.history_reset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub reports: usize,
    pub callsigns: usize,
    pub processed: usize,
    /// Reports not newer than the previous one of the same callsign, or
    /// without a valid position
    pub skipped: usize,
    pub corrected: usize,
    pub guessed: usize,
}

pub fn read_reports<R: Read>(reader: R) -> Result<Vec<ReportRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for (i, row) in csv_reader.deserialize::<ReportRecord>().enumerate() {
        let record = row.with_context(|| format!("Invalid report in row {}", i + 1))?;
        if record.adjusted_timestamp().is_none() {
            bail!(
                "Invalid report in row {}: time offset {}ms out of range",
                i + 1,
                record.time_offset_ms.unwrap_or_default()
            );
        }
        records.push(record);
    }
    Ok(records)
}

pub fn read_reports_file(path: &Path) -> Result<Vec<ReportRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    read_reports(BufReader::new(file)).with_context(|| format!("Failed to read {:?}", path))
}

/// Process all records, returning output ordered by callsign then time
pub fn replay(
    records: &[ReportRecord],
    tracker: &SituationTracker,
    performance: &dyn PerformanceLookup,
) -> (Vec<ReplayRecord>, ReplaySummary) {
    let mut per_callsign: HashMap<Callsign, Vec<&ReportRecord>> = HashMap::new();
    for record in records {
        per_callsign
            .entry(Callsign::new(&record.callsign))
            .or_default()
            .push(record);
    }

    let mut streams: Vec<(Callsign, Vec<&ReportRecord>)> = per_callsign.into_iter().collect();
    streams.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

    let results: Vec<(Vec<ReplayRecord>, ReplaySummary)> = streams
        .into_par_iter()
        .map(|(callsign, mut stream)| {
            stream.sort_by_key(|r| r.adjusted_timestamp().unwrap_or(r.timestamp));
            let icao = stream
                .iter()
                .find_map(|r| r.icao_type.as_deref())
                .unwrap_or_default();
            let perf = performance.lookup(icao);
            debug!(
                callsign = %callsign,
                "Replaying {} reports as {}",
                stream.len(),
                if perf.icao.is_empty() { "unknown type" } else { perf.icao.as_str() }
            );

            let mut output = Vec::with_capacity(stream.len());
            let mut summary = ReplaySummary {
                reports: stream.len(),
                callsigns: 1,
                ..Default::default()
            };
            for record in stream {
                match tracker.process(&record.to_report(), &perf) {
                    Some(processed) => {
                        summary.processed += 1;
                        if processed.correction.is_corrected() {
                            summary.corrected += 1;
                        }
                        if processed.guess.is_some() {
                            summary.guessed += 1;
                        }
                        output.push(ReplayRecord::from(&processed));
                    }
                    None => summary.skipped += 1,
                }
            }
            (output, summary)
        })
        .collect();

    let mut output = Vec::new();
    let mut summary = ReplaySummary::default();
    for (records, s) in results {
        output.extend(records);
        summary.reports += s.reports;
        summary.callsigns += s.callsigns;
        summary.processed += s.processed;
        summary.skipped += s.skipped;
        summary.corrected += s.corrected;
        summary.guessed += s.guessed;
    }
    (output, summary)
}

pub fn write_json_lines<W: Write>(mut writer: W, records: &[ReplayRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record).context("Failed to serialize record")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Replay `input` with `config`, writing JSON lines to `output` (stdout if `None`)
pub fn run_replay(input: &Path, output: Option<&Path>, config: &SitusConfig) -> Result<ReplaySummary> {
    info!("Replaying reports from {:?}", input);
    let records = read_reports_file(input)?;
    if records.is_empty() {
        warn!("No reports in {:?}", input);
    }

    let tracker = SituationTracker::new(config);
    let performance = PerformanceTable::new(&config.aircraft);
    let (output_records, summary) = replay(&records, &tracker, &performance);

    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
            write_json_lines(BufWriter::new(file), &output_records)
                .with_context(|| format!("Failed to write {:?}", path))?;
        }
        None => write_json_lines(std::io::stdout().lock(), &output_records)?,
    }

    info!(
        "Replayed {} reports of {} callsigns: {} processed, {} skipped, {} corrected, {} guessed",
        summary.reports,
        summary.callsigns,
        summary.processed,
        summary.skipped,
        summary.corrected,
        summary.guessed
    );
    Ok(summary)
}
