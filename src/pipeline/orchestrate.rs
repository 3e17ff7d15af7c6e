//! Pipeline orchestrator - fetch, transform, chart and (optionally) persist
//! one estimate, for either estimate kind

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::chart::{render_chart, write_chart};
use crate::pipeline::fetch::AvmClient;
use crate::pipeline::parse::normalize;
use crate::pipeline::types::{EstimateKind, OutputFiles, PipelineOutput, PropertyQuery};
use crate::pipeline::write::write_record_csv;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct Orchestrator {
    client: AvmClient,
}

impl Orchestrator {
    pub fn new(client: AvmClient) -> Self {
        Orchestrator { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Orchestrator::new(AvmClient::new(config)?))
    }

    /// Default output base for a kind: `<output_dir>/<kind file base>`
    pub fn default_output_base(&self, kind: EstimateKind) -> PathBuf {
        self.client
            .config()
            .output_dir
            .join(kind.default_file_base())
    }

    /// Fetch, transform and chart in memory
    pub fn run(&self, kind: EstimateKind, query: &PropertyQuery) -> Result<PipelineOutput> {
        info!("=== {} Pipeline ===", kind);

        // Step 1: Fetch raw data
        info!("Step 1/3: Fetching data...");
        let record = self.client.fetch_estimate(kind, query)?;
        let fetched_at = Utc::now();
        info!("✓ Fetch complete ({} fields)", record.fields().len());

        // Step 2: Flatten into a table
        info!("Step 2/3: Transforming data...");
        let table = normalize(&record);
        if table.is_empty() {
            warn!("No {} data returned for '{}'", kind.noun(), query.address);
        }
        info!("✓ Transformed into {} row(s)", table.row_count());

        // Step 3: Render chart
        info!("Step 3/3: Rendering chart...");
        let chart = render_chart(&table, kind, &query.address)?;
        if chart.is_empty() {
            warn!("No {} chart available for '{}'", kind.noun(), query.address);
        } else {
            info!("✓ Rendered chart ({} bytes)", chart.len());
        }

        Ok(PipelineOutput {
            kind,
            query: query.clone(),
            record,
            table,
            chart,
            files: None,
            fetched_at,
        })
    }

    /// Same as [`Orchestrator::run`], then writes `<output_base>.csv` and
    /// `<output_base>_bar_chart.png`
    ///
    /// An empty record skips the CSV and an empty chart skips the PNG; the
    /// skipped paths are `None` in the returned [`OutputFiles`].
    ///
    /// Both artifacts are rendered before anything is written. If writing the
    /// PNG fails, the CSV written by this run is removed again, so an `Err`
    /// never leaves half of the outputs behind.
    pub fn run_to_files(
        &self,
        kind: EstimateKind,
        query: &PropertyQuery,
        output_base: &Path,
    ) -> Result<PipelineOutput> {
        let mut output = self.run(kind, query)?;

        info!("Persisting outputs to {:?}", output_base);
        let (csv_path, chart_path) = output_paths(output_base);
        let mut files = OutputFiles::default();

        if output.record.is_empty() {
            warn!("Skipping CSV: empty {} record", kind.noun());
        } else {
            write_record_csv(&output.record, &csv_path)?;
            files.csv = Some(csv_path);
        }

        if output.chart.is_empty() {
            warn!("Skipping chart file: no {} chart", kind.noun());
        } else {
            if let Err(e) = write_chart(&output.chart, &chart_path) {
                if let Some(csv) = files.csv.take() {
                    if let Err(cleanup) = fs::remove_file(&csv) {
                        warn!("Failed to remove {:?} after chart error: {}", csv, cleanup);
                    }
                }
                return Err(e);
            }
            files.chart = Some(chart_path);
        }

        info!("✓ Persist complete");
        output.files = Some(files);

        Ok(output)
    }
}

/// `(<base>.csv, <base>_bar_chart.png)`
pub fn output_paths(output_base: &Path) -> (PathBuf, PathBuf) {
    let stem = output_base
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "estimate".to_string());

    (
        output_base.with_file_name(format!("{}.csv", stem)),
        output_base.with_file_name(format!("{}_bar_chart.png", stem)),
    )
}
