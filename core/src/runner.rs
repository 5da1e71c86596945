use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::{
    metrics::TraceMetrics,
    scenario::{Handled, Outcome, Scenario},
};

/// What one scenario printed, and what its caught fault looked like.
#[derive(Clone, Debug)]
pub struct Observation {
    pub scenario: Scenario,
    pub block: String,
    pub swallowed: Option<&'static str>,
    pub metrics: TraceMetrics,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Runner {
    native_backtrace: bool,
}

impl Runner {
    pub fn new(native_backtrace: bool) -> Self {
        Self { native_backtrace }
    }

    /// Run every scenario in declared order, writing one block each to `out`.
    pub fn run_all<W: Write>(&self, out: &mut W) -> Result<Vec<Observation>> {
        let total = Scenario::ALL.len();
        let mut observations = Vec::with_capacity(total);

        for (index, scenario) in Scenario::ALL.into_iter().enumerate() {
            let outcome = scenario.run();
            let body = self.render_outcome(&outcome);
            let block = format!(
                "== [{}/{}] {}: {} ==\n{}",
                index + 1,
                total,
                scenario.id(),
                scenario.title(),
                body
            );

            out.write_all(block.as_bytes())
                .with_context(|| format!("failed to print block for {}", scenario.id()))?;

            let swallowed = match &outcome {
                Outcome::Handled(Handled::Swallowed(note)) => Some(*note),
                _ => None,
            };
            let metrics = TraceMetrics::observe(scenario.id(), &outcome, &body);
            info!(
                "{} finished: depth {}, {} rethrow site(s)",
                scenario.id(),
                metrics.origin_depth,
                metrics.rethrow_sites
            );

            observations.push(Observation {
                scenario,
                block,
                swallowed,
                metrics,
            });
        }

        out.flush().context("failed to flush scenario output")?;
        Ok(observations)
    }

    fn render_outcome(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Caught(fault) => fault.render(self.native_backtrace),
            Outcome::Handled(Handled::Swallowed(note)) => format!("{note}\n"),
            Outcome::Handled(Handled::Completed) => "completed without a fault\n".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fault::RAISE_FRAME, scenario::SWALLOW_NOTE};

    fn run() -> (String, Vec<Observation>) {
        let mut out = Vec::new();
        let observations = Runner::default().run_all(&mut out).unwrap();
        (String::from_utf8(out).unwrap(), observations)
    }

    #[test]
    fn prints_six_blocks_in_declared_order() {
        let (printed, observations) = run();
        let headers: Vec<_> = printed.lines().filter(|line| line.starts_with("== [")).collect();

        assert_eq!(headers.len(), 6);
        for (index, (header, scenario)) in headers.iter().zip(Scenario::ALL).enumerate() {
            assert!(header.starts_with(&format!("== [{}/6] {}:", index + 1, scenario.id())));
        }
        let order: Vec<_> = observations.iter().map(|o| o.scenario).collect();
        assert_eq!(order, Scenario::ALL);
    }

    #[test]
    fn every_block_carries_a_trace() {
        let (_, observations) = run();
        for observation in &observations {
            assert!(observation.block.contains("\tat "), "{}", observation.block);
            assert!(observation.swallowed.is_none());
        }
    }

    #[test]
    fn swallow_note_is_never_printed() {
        let (printed, _) = run();
        assert!(!printed.lines().any(|line| line.trim() == SWALLOW_NOTE));
    }

    #[test]
    fn raise_site_appears_only_in_same_object_blocks() {
        let (_, observations) = run();
        let with_raise_site: Vec<_> = observations
            .iter()
            .filter(|o| o.block.contains(&format!("\tat {RAISE_FRAME}\n")))
            .map(|o| o.scenario.id())
            .collect();

        assert_eq!(
            with_raise_site,
            [
                "inside-same",
                "outside-same",
                "conditional-rethrow",
                "stored-rethrow"
            ]
        );
    }

    #[test]
    fn native_backtrace_is_opt_in() {
        let mut out = Vec::new();
        Runner::new(true).run_all(&mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches("native backtrace:").count(), 6);

        let (plain, _) = run();
        assert!(!plain.contains("native backtrace:"));
    }
}
