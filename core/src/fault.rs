use std::fmt::{self, Write};

use backtrace::Backtrace;
use log::debug;

use crate::frame::{self, Frame, StackSnapshot};

pub const DIVIDE_BY_ZERO: &str = "attempt to divide by zero";

/// Frame name of the routine that triggers the division fault.
pub const RAISE_FRAME: &str = "div_by_zero";

/// An error value whose stack snapshot is fixed when it is constructed.
///
/// Rethrowing the same `Fault` keeps `origin` untouched and appends the
/// rethrowing frame to `rethrows`. Constructing a new `Fault` starts over with
/// a fresh snapshot of wherever construction happens.
#[derive(Debug)]
pub struct Fault {
    message: String,
    origin: StackSnapshot,
    rethrows: Vec<Frame>,
    native: Backtrace,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let origin = frame::snapshot();
        debug!(
            "fault constructed at {}: {}",
            origin
                .innermost()
                .map_or("<top level>", |frame| frame.name()),
            message
        );

        Self {
            message,
            origin,
            rethrows: Vec::new(),
            native: Backtrace::new_unresolved(),
        }
    }

    /// Hand this same fault onward, recording the innermost current frame as a rethrow site.
    #[must_use]
    pub fn rethrow(mut self) -> Self {
        if let Some(site) = frame::innermost() {
            debug!("rethrowing \"{}\" from {}", self.message, site);
            self.rethrows.push(site);
        }
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn origin(&self) -> &StackSnapshot {
        &self.origin
    }

    pub fn rethrow_sites(&self) -> &[Frame] {
        &self.rethrows
    }

    /// Whether `name` was on the stack when this fault was constructed.
    pub fn raised_at(&self, name: &str) -> bool {
        self.origin.contains(name)
    }

    /// Message followed by the creation snapshot (innermost first) and rethrow sites.
    pub fn render(&self, native: bool) -> String {
        let mut output = String::new();
        let _ = writeln!(&mut output, "Fault: {}", self.message);
        for frame in self.origin.innermost_first() {
            let _ = writeln!(&mut output, "\tat {frame}");
        }
        for site in &self.rethrows {
            let _ = writeln!(&mut output, "\trethrown at {site}");
        }

        if native {
            let mut resolved = self.native.clone();
            resolved.resolve();
            let _ = writeln!(&mut output, "native backtrace:\n{resolved:?}");
        }

        output
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Fault {}

/// Checked integer division that raises a [`Fault`] instead of panicking.
pub fn divide(dividend: i32, divisor: i32) -> Result<i32, Fault> {
    dividend
        .checked_div(divisor)
        .ok_or_else(|| Fault::new(DIVIDE_BY_ZERO))
}

pub fn div_by_zero() -> Result<i32, Fault> {
    let _frame = frame::enter(RAISE_FRAME);
    divide(1, 0)
}
