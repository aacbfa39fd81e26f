//! Payment reconciliation state machine.
//!
//! After the shopper pays on the provider's hosted page, they are sent back to us with nothing but a session id. The
//! provider confirms the payment asynchronously, so we ask it about the session a bounded number of times, waiting a
//! fixed interval between attempts, until we either learn the outcome or give up.
//!
//! [`Reconciliation`] holds only the decision logic. It is told what each status query returned and answers with the
//! next [`Step`]. Performing the query, waiting, and the side effects of success belong to
//! [`crate::checkout_api::poller`].
//!
//! ```text
//!  CHECKING ──query──┬── paid ─────────────────────► SUCCESS
//!      ▲             ├── expired ──────────────────► EXPIRED
//!      │             ├── failed ───────────────────► ERROR
//!      │             ├── other, n == max_attempts ─► TIMEOUT
//!      │             └── other, n < max_attempts ──► PENDING
//!      │                                               │
//!      └─────────────────── wait interval ◄────────────┘
//! ```
use std::{fmt::Display, str::FromStr, time::Duration};

use log::*;
use serde::{Deserialize, Serialize};

use crate::checkout_types::SessionStatus;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

//--------------------------------------  ReconciliationState  ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationState {
    /// Initial state. The first status query has not resolved yet.
    Checking,
    /// At least one query was inconclusive and another is scheduled.
    Pending,
    /// The provider reported the session as paid.
    Success,
    /// The provider reported the session as expired.
    Expired,
    /// Every attempt was inconclusive.
    Timeout,
    /// A status query failed.
    Error,
}

impl ReconciliationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Checking | Self::Pending)
    }

    /// What the shopper is shown for this state. Expiry, timeouts and errors all read as "could not confirm".
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Checking | Self::Pending => Outcome::Processing,
            Self::Success => Outcome::Success,
            Self::Expired | Self::Timeout | Self::Error => Outcome::Unconfirmed,
        }
    }
}

impl Display for ReconciliationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Checking => "CHECKING",
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Expired => "EXPIRED",
            Self::Timeout => "TIMEOUT",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

impl FromStr for ReconciliationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CHECKING" => Ok(Self::Checking),
            "PENDING" => Ok(Self::Pending),
            "SUCCESS" => Ok(Self::Success),
            "EXPIRED" => Ok(Self::Expired),
            "TIMEOUT" => Ok(Self::Timeout),
            "ERROR" => Ok(Self::Error),
            _ => Err(format!("Invalid reconciliation state: {s}")),
        }
    }
}

//--------------------------------------        Outcome        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Processing,
    Success,
    Unconfirmed,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Processing => write!(f, "Your payment is being processed"),
            Outcome::Success => write!(f, "Payment successful. Thank you for your order!"),
            Outcome::Unconfirmed => {
                write!(f, "We could not confirm your payment. Please check your order history for the latest status")
            },
        }
    }
}

//--------------------------------------      PollPolicy       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, interval: DEFAULT_POLL_INTERVAL }
    }
}

impl PollPolicy {
    /// A policy with at least one attempt.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        if max_attempts == 0 {
            warn!("🔁️ A poll policy needs at least one attempt. Using 1.");
        }
        Self { max_attempts: max_attempts.max(1), interval }
    }

    /// Reads `GAURA_POLL_MAX_ATTEMPTS` and `GAURA_POLL_INTERVAL_MS`, falling back to the defaults for anything
    /// missing or invalid.
    pub fn from_env_or_default() -> Self {
        let max_attempts = std::env::var("GAURA_POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("🪛️ Invalid GAURA_POLL_MAX_ATTEMPTS '{s}': {e}. Using the default instead."))
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let interval = std::env::var("GAURA_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid GAURA_POLL_INTERVAL_MS '{s}': {e}. Using the default instead."))
                    .ok()
            })
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        Self::new(max_attempts, interval)
    }
}

//--------------------------------------    Reconciliation     ---------------------------------------------------------
/// What the driver of a [`Reconciliation`] must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Query the session status now.
    Poll,
    /// Wait for the given duration, then query again.
    Wait(Duration),
    /// Reconciliation is over. No further requests may be made.
    Finished(ReconciliationState),
}

/// A snapshot of a reconciliation: where it is and how many status queries have resolved so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub state: ReconciliationState,
    pub attempts: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self { state: ReconciliationState::Checking, attempts: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    policy: PollPolicy,
    progress: Progress,
}

impl Reconciliation {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy, progress: Progress::default() }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn state(&self) -> ReconciliationState {
        self.progress.state
    }

    pub fn attempts(&self) -> u32 {
        self.progress.attempts
    }

    /// The first step of a fresh reconciliation is always a query.
    pub fn begin(&self) -> Step {
        self.finished().unwrap_or(Step::Poll)
    }

    /// Records the result of a status query and decides what happens next.
    ///
    /// Once a terminal state has been reached, further results are ignored and the state is reported unchanged.
    pub fn on_status(&mut self, status: &SessionStatus) -> Step {
        if let Some(done) = self.finished() {
            return done;
        }
        self.progress.attempts += 1;
        let n = self.progress.attempts;
        if status.is_paid() {
            return self.finish(ReconciliationState::Success);
        }
        if status.is_expired() {
            return self.finish(ReconciliationState::Expired);
        }
        if n < self.policy.max_attempts {
            trace!("🔁️ Attempt {n}/{} was inconclusive ({:?})", self.policy.max_attempts, status.status);
            self.progress.state = ReconciliationState::Pending;
            Step::Wait(self.policy.interval)
        } else {
            self.finish(ReconciliationState::Timeout)
        }
    }

    /// Records a failed status query. Failures are never retried.
    pub fn on_query_failed(&mut self) -> Step {
        if let Some(done) = self.finished() {
            return done;
        }
        self.progress.attempts += 1;
        self.finish(ReconciliationState::Error)
    }

    fn finish(&mut self, state: ReconciliationState) -> Step {
        debug!("🔁️ Reconciliation finished in state {state} after {} attempts", self.progress.attempts);
        self.progress.state = state;
        Step::Finished(state)
    }

    fn finished(&self) -> Option<Step> {
        self.progress.state.is_terminal().then_some(Step::Finished(self.progress.state))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::checkout_types::{SessionPaymentState, SessionState};

    fn policy() -> PollPolicy {
        PollPolicy::new(5, Duration::from_millis(2000))
    }

    #[test]
    fn inconclusive_results_wait_then_time_out() {
        let mut machine = Reconciliation::new(policy());
        assert_eq!(machine.begin(), Step::Poll);
        for n in 1..5 {
            assert_eq!(machine.on_status(&SessionStatus::open()), Step::Wait(Duration::from_millis(2000)));
            assert_eq!(machine.progress(), Progress { state: ReconciliationState::Pending, attempts: n });
        }
        assert_eq!(machine.on_status(&SessionStatus::open()), Step::Finished(ReconciliationState::Timeout));
        assert_eq!(machine.attempts(), 5);
    }

    #[test]
    fn paid_wins_over_expired() {
        let mut machine = Reconciliation::new(policy());
        let status = SessionStatus::new(SessionState::Expired, SessionPaymentState::Paid);
        assert_eq!(machine.on_status(&status), Step::Finished(ReconciliationState::Success));
    }

    #[test]
    fn terminal_states_are_sticky() {
        let mut machine = Reconciliation::new(policy());
        machine.on_status(&SessionStatus::paid());
        assert_eq!(machine.on_status(&SessionStatus::expired()), Step::Finished(ReconciliationState::Success));
        assert_eq!(machine.on_query_failed(), Step::Finished(ReconciliationState::Success));
        assert_eq!(machine.attempts(), 1);
        assert_eq!(machine.begin(), Step::Finished(ReconciliationState::Success));
    }

    #[test]
    fn failures_are_terminal() {
        let mut machine = Reconciliation::new(policy());
        machine.on_status(&SessionStatus::open());
        assert_eq!(machine.on_query_failed(), Step::Finished(ReconciliationState::Error));
        assert_eq!(machine.attempts(), 2);
    }

    #[test]
    fn no_payment_required_is_inconclusive() {
        let mut machine = Reconciliation::new(PollPolicy::new(1, Duration::ZERO));
        let status = SessionStatus::new(SessionState::Complete, SessionPaymentState::NoPaymentRequired);
        assert_eq!(machine.on_status(&status), Step::Finished(ReconciliationState::Timeout));
    }

    #[test]
    fn zero_attempts_is_clamped() {
        assert_eq!(PollPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn outcomes() {
        use ReconciliationState::*;
        assert_eq!(Checking.outcome(), Outcome::Processing);
        assert_eq!(Pending.outcome(), Outcome::Processing);
        assert_eq!(Success.outcome(), Outcome::Success);
        for s in [Expired, Timeout, Error] {
            assert!(s.is_terminal());
            assert_eq!(s.outcome(), Outcome::Unconfirmed);
        }
        assert_eq!("timeout".parse::<ReconciliationState>().unwrap(), Timeout);
        assert!("done".parse::<ReconciliationState>().is_err());
    }
}
