//! Endpoint verification results.

use std::fmt;

/// Result of probing one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The endpoint answered 2xx.
    Working {
        /// HTTP status.
        status: u16,
    },
    /// The endpoint answered with a non-success status.
    HttpStatus {
        /// HTTP status.
        status: u16,
    },
    /// No response was received.
    Unreachable {
        /// Transport error.
        error: String,
    },
}

/// One probed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCheck {
    /// Engine path, e.g. `/sensors`.
    pub endpoint: String,
    /// What happened.
    pub outcome: CheckOutcome,
}

impl EndpointCheck {
    /// Whether the endpoint is working.
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Working { .. })
    }
}

impl fmt::Display for EndpointCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CheckOutcome::Working { .. } => write!(f, "{} - working", self.endpoint),
            CheckOutcome::HttpStatus { status } => write!(f, "{} - HTTP {status}", self.endpoint),
            CheckOutcome::Unreachable { error } => write!(f, "{} - error: {error}", self.endpoint),
        }
    }
}

/// All endpoint checks of one verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Checks in probe order.
    pub checks: Vec<EndpointCheck>,
}

impl VerificationReport {
    /// True when every endpoint works.
    ///
    /// An empty report passes.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(EndpointCheck::passed)
    }

    /// Checks that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &EndpointCheck> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        write!(f, "{failed} of {} endpoints failed", self.checks.len())?;
        for check in self.failures() {
            write!(f, "; {check}")?;
        }
        Ok(())
    }
}
