use std::{
    fmt::Write,
    fs,
    io::{self, Write as _},
    path::Path,
};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use rethrow_lab_core::{
    ensure_report_file, update_sections, verify, ExperimentConfig, ExperimentMode, Observation,
    ReportSection, Runner, TraceMetrics, DEFAULT_REPORT_TEMPLATE,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct BenchmarkSnapshot {
    traces: Vec<TraceMetrics>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = ExperimentConfig::from_env()?;
    info!("running stack trace scenarios in {} mode", config.mode.label());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let observations = Runner::new(config.native_backtrace).run_all(&mut out)?;
    out.flush().context("failed to flush standard output")?;

    if let Some(report) = &config.report {
        ensure_report_file(report, DEFAULT_REPORT_TEMPLATE)?;
        write_report(report, &config, &observations)?;
        info!("updated report at {}", report.display());
    }

    if config.mode == ExperimentMode::Test {
        verify(&observations)?;
        info!("all trace properties hold");

        if let Some(path) = &config.benchmark {
            let snapshot = BenchmarkSnapshot {
                traces: observations.iter().map(|o| o.metrics.clone()).collect(),
            };
            match load_benchmark(path)? {
                Some(reference) => {
                    validate_benchmark(&snapshot, &reference)?;
                    info!("benchmark check passed");
                }
                None => {
                    save_benchmark(path, &snapshot)?;
                    warn!("saved new benchmark snapshot to {}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn write_report(
    report_path: &Path,
    config: &ExperimentConfig,
    observations: &[Observation],
) -> Result<()> {
    let sections = [
        ReportSection::new("configuration", render_configuration_section(config)),
        ReportSection::new("metrics", render_metrics_section(observations)),
        ReportSection::new("traces", render_traces_section(observations)),
    ];

    update_sections(report_path, &sections)
}

fn render_configuration_section(config: &ExperimentConfig) -> String {
    format!(
        "- Mode: {}\n- Native backtrace: {}\n- Benchmark: {}\n",
        config.mode.label(),
        config.native_backtrace,
        config
            .benchmark
            .as_deref()
            .map_or_else(|| "none".to_string(), |path| path.display().to_string())
    )
}

fn render_metrics_section(observations: &[Observation]) -> String {
    let mut output = String::new();
    let _ = writeln!(
        &mut output,
        "| Scenario | Message | Origin depth | Rethrow sites | Raise site visible |"
    );
    let _ = writeln!(&mut output, "| --- | --- | --- | --- | --- |");

    for observation in observations {
        let metrics = &observation.metrics;
        let _ = writeln!(
            &mut output,
            "| {} | {} | {} | {} | {} |",
            metrics.scenario,
            metrics.message.as_deref().unwrap_or("-"),
            metrics.origin_depth,
            metrics.rethrow_sites,
            if metrics.includes_raise_site { "yes" } else { "no" }
        );
    }

    output
}

fn render_traces_section(observations: &[Observation]) -> String {
    let mut output = String::new();
    for observation in observations {
        let _ = writeln!(&mut output, "```text\n{}```\n", observation.block);
    }
    output
}

fn load_benchmark(path: &Path) -> Result<Option<BenchmarkSnapshot>> {
    if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read benchmark from {}", path.display()))?;
        let snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse benchmark at {}", path.display()))?;
        Ok(Some(snapshot))
    } else {
        Ok(None)
    }
}

fn save_benchmark(path: &Path, snapshot: &BenchmarkSnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write benchmark to {}", path.display()))?;
    Ok(())
}

fn validate_benchmark(actual: &BenchmarkSnapshot, reference: &BenchmarkSnapshot) -> Result<()> {
    if actual.traces.len() != reference.traces.len() {
        return Err(anyhow!(
            "scenario count changed (actual {} vs expected {}); update the benchmark if this is intentional",
            actual.traces.len(),
            reference.traces.len()
        ));
    }

    for (actual, expected) in actual.traces.iter().zip(&reference.traces) {
        if actual != expected {
            return Err(anyhow!(
                "{} deviated from benchmark (actual {:?} vs expected {:?})",
                actual.scenario,
                actual,
                expected
            ));
        }
    }

    Ok(())
}
