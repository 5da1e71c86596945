//! Checks that observed traces behave as each scenario's [`Expectation`] says.

use anyhow::{bail, ensure, Result};

use crate::{
    fault::RAISE_FRAME,
    runner::Observation,
    scenario::{Expectation, Scenario, SWALLOW_NOTE},
};

pub fn verify(observations: &[Observation]) -> Result<()> {
    let order: Vec<_> = observations.iter().map(|o| o.scenario).collect();
    ensure!(
        order == Scenario::ALL,
        "expected {} blocks in declared order, observed {:?}",
        Scenario::ALL.len(),
        order
    );

    for observation in observations {
        verify_one(observation)?;
    }
    Ok(())
}

fn verify_one(observation: &Observation) -> Result<()> {
    let id = observation.scenario.id();
    let metrics = &observation.metrics;

    if let Some(note) = observation.swallowed {
        bail!("{id}: fault was swallowed with note {note:?} instead of reaching the outer handler");
    }
    ensure!(
        !observation.block.lines().any(|line| line.trim() == SWALLOW_NOTE),
        "{id}: swallow note was printed"
    );
    ensure!(
        metrics.message.is_some() && metrics.origin_depth > 0,
        "{id}: no fault with a stack snapshot was printed"
    );

    match observation.scenario.expectation() {
        Expectation::PreservesOrigin => {
            ensure!(
                metrics.includes_raise_site,
                "{id}: rethrown fault lost its raise site {RAISE_FRAME}"
            );
            ensure!(
                metrics.rethrow_sites > 0,
                "{id}: rethrown fault did not record where it was rethrown"
            );
            ensure!(
                metrics.printed_lines > 1 + metrics.origin_depth,
                "{id}: rethrow did not grow the printed trace"
            );
        }
        Expectation::FreshOrigin => {
            ensure!(
                !metrics.includes_raise_site,
                "{id}: new fault leaked the original raise site {RAISE_FRAME}"
            );
            ensure!(
                metrics.rethrow_sites == 0,
                "{id}: new fault carries rethrow sites of the original"
            );
            let origin = observation
                .block
                .lines()
                .find_map(|line| line.strip_prefix("\tat "));
            ensure!(
                origin == Some(observation.scenario.body_frame()),
                "{id}: new fault originates at {:?} rather than the rethrow site",
                origin
            );
        }
    }

    Ok(())
}
