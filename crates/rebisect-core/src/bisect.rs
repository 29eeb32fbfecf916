//! Bisection engine.
//!
//! Searches the offsets `[0, behind)` of a reference branch for the
//! boundary between rebase targets that conflict (near the tip) and targets
//! that apply cleanly (further back). Each candidate is checked by a
//! [`Probe`], which performs the operation and reports success.
//!
//! Probe outcomes are not guaranteed to be monotonic in the offset: whether
//! a rebase conflicts depends on content, not position. The engine therefore
//! reports the largest failing offset it actually observed, not the final
//! position of the interval.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Distance in commits from the tip of the reference branch.
///
/// `0` is the tip itself, `n` is `<reference>~n`.
pub type Offset = usize;

/// A single attempt at the operation for a given offset.
///
/// Implementations must leave no residual state behind on failure: a
/// conflicting rebase is aborted before `Ok(false)` is returned. An `Err`
/// stops the search immediately and is propagated out of [`search`].
pub trait Probe {
    /// Attempt the operation at `offset`.
    ///
    /// # Errors
    /// Returns an error (typically [`crate::Error::Interrupted`]) when the
    /// search must stop rather than continue with the next offset.
    fn probe(&mut self, offset: Offset) -> Result<bool>;
}

impl<F> Probe for F
where
    F: FnMut(Offset) -> Result<bool>,
{
    fn probe(&mut self, offset: Offset) -> Result<bool> {
        self(offset)
    }
}

/// One probe and its result, in the order they were made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStep {
    /// Offset that was probed.
    pub offset: Offset,
    /// Whether the probe succeeded.
    pub succeeded: bool,
}

/// What the search concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// No probe failed: the branch can be rebased all the way to the tip.
    CaughtUp,
    /// At least one probe failed; `offset` is the largest failing offset.
    FirstFailure {
        /// Largest failing offset seen.
        offset: Offset,
    },
}

/// Full result of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bisection {
    /// Behind count the search started from.
    pub behind: usize,
    /// Conclusion of the search.
    pub outcome: Outcome,
    /// Every probe made, in order.
    pub trace: Vec<ProbeStep>,
}

impl Bisection {
    /// Number of probes made.
    #[must_use]
    pub fn probes(&self) -> usize {
        self.trace.len()
    }

    /// The largest failing offset, if any probe failed.
    #[must_use]
    pub const fn first_failure(&self) -> Option<Offset> {
        match self.outcome {
            Outcome::CaughtUp => None,
            Outcome::FirstFailure { offset } => Some(offset),
        }
    }

    /// Smallest offset (closest to the tip) at which a probe succeeded.
    #[must_use]
    pub fn closest_success(&self) -> Option<Offset> {
        self.trace
            .iter()
            .filter(|step| step.succeeded)
            .map(|step| step.offset)
            .min()
    }

    /// Offset of the most recent successful probe.
    ///
    /// Failed probes are rolled back, so this is where the working tree was
    /// left when the search ended.
    #[must_use]
    pub fn settled_at(&self) -> Option<Offset> {
        self.trace
            .iter()
            .rev()
            .find(|step| step.succeeded)
            .map(|step| step.offset)
    }
}

/// Upper bound on the number of probes [`search`] makes for `behind`.
///
/// `ceil(log2(behind + 1)) + 2`: one probe per halving, plus the final
/// one-wide interval and the repeated-midpoint guard.
#[must_use]
pub const fn max_probes(behind: usize) -> usize {
    let halvings = if behind == 0 {
        0
    } else {
        behind.ilog2() as usize + 1
    };
    halvings + 2
}

/// Search `[0, behind)` for the first failing offset.
///
/// Failing probes move the lower bound away from the tip; succeeding
/// probes move the upper bound toward it. The loop ends when the midpoint
/// repeats or falls outside the interval.
///
/// # Errors
/// Returns the first error raised by `probe`. No further probes run.
pub fn search<P>(behind: usize, probe: &mut P) -> Result<Bisection>
where
    P: Probe + ?Sized,
{
    let mut pmin: Offset = 0;
    let mut pmax: Offset = behind;
    let mut first_fail: Option<Offset> = None;
    let mut previous_mid: Option<Offset> = None;
    let mut trace = Vec::new();

    loop {
        let mid = pmin + (pmax - pmin) / 2;
        if previous_mid == Some(mid) || mid < pmin || mid >= pmax {
            break;
        }

        let succeeded = probe.probe(mid)?;
        tracing::debug!(offset = mid, succeeded, pmin, pmax, "probe");
        trace.push(ProbeStep {
            offset: mid,
            succeeded,
        });

        if succeeded {
            pmax = mid;
        } else {
            first_fail = Some(first_fail.map_or(mid, |ff| ff.max(mid)));
            pmin = mid;
        }

        previous_mid = Some(mid);
    }

    let outcome = first_fail.map_or(Outcome::CaughtUp, |offset| Outcome::FirstFailure { offset });

    Ok(Bisection {
        behind,
        outcome,
        trace,
    })
}
