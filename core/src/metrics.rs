use serde::{Deserialize, Serialize};

use crate::{fault::RAISE_FRAME, scenario::Outcome};

/// Shape of the fault a scenario's protecting region caught.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMetrics {
    pub scenario: String,
    pub message: Option<String>,
    pub origin_depth: usize,
    pub rethrow_sites: usize,
    pub includes_raise_site: bool,
    pub printed_lines: usize,
}

impl TraceMetrics {
    pub fn observe(scenario: &str, outcome: &Outcome, printed: &str) -> Self {
        let fault = outcome.fault();
        Self {
            scenario: scenario.to_string(),
            message: fault.map(|fault| fault.message().to_string()),
            origin_depth: fault.map_or(0, |fault| fault.origin().depth()),
            rethrow_sites: fault.map_or(0, |fault| fault.rethrow_sites().len()),
            includes_raise_site: fault.is_some_and(|fault| fault.raised_at(RAISE_FRAME)),
            printed_lines: printed.lines().count(),
        }
    }
}
