//! Generic ordered-check runner.
//!
//! Every concrete check is a predicate plus a static definition (message
//! tag, failure indication). The runner executes checks in the order they
//! are submitted, skips unconfigured ones, records messages according to
//! the resolved [`Level`], and short-circuits the rest of the block after
//! the first FAIL-level failure.

use super::{Conclusion, Indication, Message, MessageTag, SubIndication};
use crate::policy::Level;
use tracing::{debug, trace};

/// Result of one predicate evaluation.
#[derive(Debug, Clone)]
pub(crate) struct CheckOutcome {
    pub passed: bool,
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            detail: None,
        }
    }

    pub fn fail() -> Self {
        Self {
            passed: false,
            detail: None,
        }
    }

    pub fn fail_with(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: Some(detail.into()),
        }
    }

    pub fn of(passed: bool) -> Self {
        if passed {
            Self::pass()
        } else {
            Self::fail()
        }
    }
}

/// Ordered constraint chain for one validation block.
///
/// Checks are pure: the runner's only side effect is appending to the
/// conclusion under construction.
pub(crate) struct ConstraintChain {
    conclusion: Conclusion,
    short_circuited: bool,
}

impl ConstraintChain {
    pub fn new() -> Self {
        Self {
            conclusion: Conclusion::passed(),
            short_circuited: false,
        }
    }

    /// Run one check.
    ///
    /// `level` absent means the constraint is not configured: the
    /// predicate is not evaluated at all. After a FAIL-level failure the
    /// whole block is short-circuited and later checks are skipped, so
    /// the first failure's indication is never overwritten.
    pub fn execute<F>(
        &mut self,
        level: Option<Level>,
        tag: MessageTag,
        failure: (Indication, SubIndication),
        predicate: F,
    ) where
        F: FnOnce() -> CheckOutcome,
    {
        if self.short_circuited {
            trace!("skipping {:?}: block already concluded", tag);
            return;
        }
        let Some(level) = level else {
            trace!("skipping {:?}: not configured", tag);
            return;
        };
        let outcome = predicate();
        if outcome.passed {
            return;
        }
        match level {
            Level::Fail => {
                self.conclusion.indication = failure.0;
                self.conclusion.sub_indication = Some(failure.1);
                self.conclusion.errors.push(Message::new(tag, outcome.detail));
                self.short_circuited = true;
            }
            Level::Warn => {
                self.conclusion
                    .warnings
                    .push(Message::new(tag, outcome.detail));
            }
            Level::Inform => {
                self.conclusion.infos.push(Message::new(tag, outcome.detail));
            }
            Level::Ignore => {
                debug!("{:?} failed at IGNORE level", tag);
            }
        }
    }

    /// Record a warning without running a check (used for sub-process
    /// notes such as rejected revocation records).
    pub fn note_warning(&mut self, tag: MessageTag, detail: String) {
        self.conclusion.warnings.push(Message {
            tag,
            text: detail,
        });
    }

    /// Record an informational message without running a check.
    pub fn note_info(&mut self, tag: MessageTag, detail: String) {
        self.conclusion.infos.push(Message { tag, text: detail });
    }

    pub fn is_short_circuited(&self) -> bool {
        self.short_circuited
    }

    /// Finish the block. A block with no FAIL-level failure concludes
    /// PASSED regardless of recorded warnings or infos.
    pub fn conclude(self) -> Conclusion {
        self.conclusion
    }
}
