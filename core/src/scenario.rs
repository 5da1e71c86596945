//! The fixed set of catch/rethrow scenarios.
//!
//! Each scenario body triggers [`div_by_zero`], intercepts the fault and then
//! either rethrows the same object or throws a newly constructed one, from
//! inside the handler or after it has exited. Entry routines wrap the body in
//! [`catch_print`], the protecting region that ends every propagation.

use log::{debug, info};

use crate::{
    fault::{div_by_zero, Fault},
    frame,
};

/// Frame name of the protecting region around every scenario body.
pub const CATCH_FRAME: &str = "catch_print";

/// Literal printed by the swallow branch of the conditional rethrow.
pub const SWALLOW_NOTE: &str = "yay";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scenario {
    InsideSame,
    InsideNew,
    OutsideSame,
    OutsideNew,
    ConditionalRethrow,
    StoredRethrow,
}

/// What the printed snapshot of a scenario's fault is expected to show.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expectation {
    /// The original fault travels on; its raise site and rethrow sites are visible.
    PreservesOrigin,
    /// A new fault replaces the original; only the rethrow site is visible.
    FreshOrigin,
}

/// A handler that finished without a fault escaping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Handled {
    Completed,
    Swallowed(&'static str),
}

/// What the protecting region of an entry routine observed.
#[derive(Debug)]
pub enum Outcome {
    Caught(Fault),
    Handled(Handled),
}

impl Outcome {
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Self::Caught(fault) => Some(fault),
            Self::Handled(_) => None,
        }
    }
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Self::InsideSame,
        Self::InsideNew,
        Self::OutsideSame,
        Self::OutsideNew,
        Self::ConditionalRethrow,
        Self::StoredRethrow,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::InsideSame => "inside-same",
            Self::InsideNew => "inside-new",
            Self::OutsideSame => "outside-same",
            Self::OutsideNew => "outside-new",
            Self::ConditionalRethrow => "conditional-rethrow",
            Self::StoredRethrow => "stored-rethrow",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::InsideSame => "same object rethrown inside the handler",
            Self::InsideNew => "new object thrown inside the handler",
            Self::OutsideSame => "same object rethrown after the handler",
            Self::OutsideNew => "new object thrown after the handler",
            Self::ConditionalRethrow => "same object rethrown when it cannot be handled",
            Self::StoredRethrow => "stored object rethrown after the handler",
        }
    }

    pub fn expectation(&self) -> Expectation {
        match self {
            Self::InsideNew | Self::OutsideNew => Expectation::FreshOrigin,
            Self::InsideSame
            | Self::OutsideSame
            | Self::ConditionalRethrow
            | Self::StoredRethrow => Expectation::PreservesOrigin,
        }
    }

    fn entry_frame(&self) -> &'static str {
        match self {
            Self::InsideSame => "inside_same",
            Self::InsideNew => "inside_new",
            Self::OutsideSame => "outside_same",
            Self::OutsideNew => "outside_new",
            Self::ConditionalRethrow => "rethrow_in_handler",
            Self::StoredRethrow => "rethrow_outside_handler",
        }
    }

    /// Frame name of the routine that intercepts the division fault.
    pub fn body_frame(&self) -> &'static str {
        match self {
            Self::InsideSame => "inside_same::body",
            Self::InsideNew => "inside_new::body",
            Self::OutsideSame => "outside_same::body",
            Self::OutsideNew => "outside_new::body",
            Self::ConditionalRethrow => "in_thrower",
            Self::StoredRethrow => "out_thrower",
        }
    }

    fn body(&self) -> fn() -> Result<Handled, Fault> {
        match self {
            Self::InsideSame => inside_same,
            Self::InsideNew => inside_new,
            Self::OutsideSame => outside_same,
            Self::OutsideNew => outside_new,
            Self::ConditionalRethrow => in_thrower,
            Self::StoredRethrow => out_thrower,
        }
    }

    /// Run the entry routine: the body inside its protecting region.
    pub fn run(&self) -> Outcome {
        info!("running scenario {}", self.id());
        let _frame = frame::enter(self.entry_frame());
        let body = self.body();
        let body_frame = self.body_frame();
        catch_print(|| {
            let _frame = frame::enter(body_frame);
            body()
        })
    }
}

/// Protecting region: whatever fault escapes `body` stops here.
pub fn catch_print<F>(body: F) -> Outcome
where
    F: FnOnce() -> Result<Handled, Fault>,
{
    let _frame = frame::enter(CATCH_FRAME);
    match body() {
        Ok(handled) => Outcome::Handled(handled),
        Err(fault) => {
            debug!("caught \"{}\"", fault);
            Outcome::Caught(fault)
        }
    }
}

fn inside_same() -> Result<Handled, Fault> {
    match div_by_zero() {
        Ok(_) => Ok(Handled::Completed),
        Err(fault) => Err(fault.rethrow()),
    }
}

fn inside_new() -> Result<Handled, Fault> {
    match div_by_zero() {
        Ok(_) => Ok(Handled::Completed),
        Err(_) => Err(Fault::new("Oh noes, I couldn't handle")),
    }
}

fn outside_same() -> Result<Handled, Fault> {
    let mut stored: Option<Fault> = None;
    if let Err(fault) = div_by_zero() {
        stored = Some(fault);
    }

    let fault = stored.unwrap_or_else(|| Fault::new("unreachable code"));
    Err(fault.rethrow())
}

fn outside_new() -> Result<Handled, Fault> {
    let mut stored: Option<Fault> = None;
    if let Err(fault) = div_by_zero() {
        stored = Some(fault);
    }

    if let Some(discarded) = stored {
        debug!("discarding stored fault \"{}\"", discarded);
    }
    Err(Fault::new("This definitely is a new fresh throw!"))
}

fn in_thrower() -> Result<Handled, Fault> {
    match div_by_zero() {
        Ok(_) => Ok(Handled::Completed),
        Err(fault) => {
            // Always true; the swallow branch below is kept for contrast.
            let cannot_handle = Some(&fault).is_some();
            if cannot_handle {
                Err(fault.rethrow())
            } else {
                Ok(Handled::Swallowed(SWALLOW_NOTE))
            }
        }
    }
}

fn out_thrower() -> Result<Handled, Fault> {
    let mut stored: Option<Fault> = None;
    if let Err(fault) = div_by_zero() {
        stored = Some(fault);
    }

    match stored {
        Some(fault) => Err(fault.rethrow()),
        None => Err(Fault::new("no fault was stored")),
    }
}
