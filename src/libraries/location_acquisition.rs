//! Bounded-retry acquisition of the user's position.
//!
//! The machine asks a [`LocationSource`] for a fix, backs off exponentially
//! between failed attempts and settles on a fixed fallback coordinate once the
//! retry budget is spent. Transitions live in [`AcquisitionState::on_event`];
//! [`spawn`] drives them from an event queue on a tokio task tied to a single
//! lifetime token, so tearing the consumer down stops every timer and
//! suppresses every later transition or emission.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::LocationFix;

/// Why a single attempt produced no fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Permission denied. Please allow location access in your browser settings.")]
    PermissionDenied,

    #[error("Location information is unavailable. Check your device settings.")]
    PositionUnavailable,

    #[error("Location request timed out. Make sure location services are enabled.")]
    Timeout,

    /// Raw error string reported by the device or browser
    #[error("{0}")]
    Other(String),
}

/// Device or browser geolocation.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn locate(&self) -> Result<LocationFix, LocationError>;
}

#[derive(Debug, Clone)]
pub struct AcquisitionPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Per-attempt device timeout, independent of the backoff timer
    pub attempt_timeout: Duration,
    pub fallback: LocationFix,
}

impl Default for AcquisitionPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
            attempt_timeout: Duration::from_secs(10),
            // Chennai
            fallback: LocationFix::new(13.08, 80.27),
        }
    }
}

impl AcquisitionPolicy {
    /// `min(base * 2^attempt, max)`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionState {
    Idle,
    Requesting { attempt: u32 },
    /// Waiting out `delay` before attempt number `attempt`
    Retrying { attempt: u32, delay: Duration },
    Found(LocationFix),
    FallenBack(LocationFix),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionEvent {
    Start,
    FixAcquired(LocationFix),
    FixFailed(LocationError),
    BackoffElapsed,
}

/// Work the driver performs after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RequestFix { attempt: u32 },
    Backoff(Duration),
    Emit,
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AcquisitionState::Found(_) | AcquisitionState::FallenBack(_)
        )
    }

    /// Pure transition function. Events that do not apply to the current state
    /// leave it unchanged and produce no effect.
    pub fn on_event(
        &self,
        event: AcquisitionEvent,
        policy: &AcquisitionPolicy,
    ) -> (AcquisitionState, Option<Effect>) {
        match (self, event) {
            (AcquisitionState::Idle, AcquisitionEvent::Start) => enter_attempt(0, policy),
            (AcquisitionState::Requesting { .. }, AcquisitionEvent::FixAcquired(fix)) => {
                (AcquisitionState::Found(fix), Some(Effect::Emit))
            }
            (AcquisitionState::Requesting { attempt }, AcquisitionEvent::FixFailed(_)) => {
                let delay = policy.backoff(*attempt);
                (
                    AcquisitionState::Retrying {
                        attempt: attempt + 1,
                        delay,
                    },
                    Some(Effect::Backoff(delay)),
                )
            }
            (AcquisitionState::Retrying { attempt, .. }, AcquisitionEvent::BackoffElapsed) => {
                enter_attempt(*attempt, policy)
            }
            (state, _) => (state.clone(), None),
        }
    }
}

fn enter_attempt(attempt: u32, policy: &AcquisitionPolicy) -> (AcquisitionState, Option<Effect>) {
    if attempt >= policy.max_retries {
        (AcquisitionState::FallenBack(policy.fallback), Some(Effect::Emit))
    } else {
        (
            AcquisitionState::Requesting { attempt },
            Some(Effect::RequestFix { attempt }),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found,
    FallenBack,
}

/// The one externally consumed output of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionOutcome {
    pub fix: LocationFix,
    pub resolution: Resolution,
    /// Device requests actually made
    pub attempts: u32,
    /// Sum of every backoff delay scheduled during the run
    pub scheduled_backoff: Duration,
    /// Last failure reported, for a manual-retry prompt
    pub last_error: Option<LocationError>,
}

/// Owner side of a running acquisition. Dropping it tears the run down.
pub struct AcquisitionHandle {
    lifetime: CancellationToken,
    states: watch::Receiver<AcquisitionState>,
    outcome: Option<oneshot::Receiver<AcquisitionOutcome>>,
}

impl AcquisitionHandle {
    /// Current state, updated on every transition
    pub fn states(&self) -> watch::Receiver<AcquisitionState> {
        self.states.clone()
    }

    /// Wait for the final fix. `None` once the run has been cancelled, even if
    /// the worker finished just before the cancel landed.
    pub async fn outcome(&mut self) -> Option<AcquisitionOutcome> {
        if self.lifetime.is_cancelled() {
            return None;
        }
        let outcome = self.outcome.take()?.await.ok()?;
        (!self.lifetime.is_cancelled()).then_some(outcome)
    }

    pub fn cancel(&self) {
        self.lifetime.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.lifetime.is_cancelled()
    }
}

impl Drop for AcquisitionHandle {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

/// Start acquiring a fix. A manual retry is simply another call.
pub fn spawn(source: Arc<dyn LocationSource>, policy: AcquisitionPolicy) -> AcquisitionHandle {
    let lifetime = CancellationToken::new();
    let (state_tx, state_rx) = watch::channel(AcquisitionState::Idle);
    let (outcome_tx, outcome_rx) = oneshot::channel();

    let token = lifetime.clone();
    tokio::spawn(async move {
        if let Some(outcome) = run(source, policy, &token, &state_tx).await {
            if !token.is_cancelled() {
                let _ = outcome_tx.send(outcome);
            }
        }
    });

    AcquisitionHandle {
        lifetime,
        states: state_rx,
        outcome: Some(outcome_rx),
    }
}

async fn run(
    source: Arc<dyn LocationSource>,
    policy: AcquisitionPolicy,
    lifetime: &CancellationToken,
    state_tx: &watch::Sender<AcquisitionState>,
) -> Option<AcquisitionOutcome> {
    let mut state = AcquisitionState::Idle;
    let mut events = VecDeque::from([AcquisitionEvent::Start]);
    let mut attempts = 0;
    let mut scheduled_backoff = Duration::ZERO;
    let mut last_error = None;

    while let Some(event) = events.pop_front() {
        if lifetime.is_cancelled() {
            debug!("Location acquisition torn down in {:?}", state);
            return None;
        }

        if let AcquisitionEvent::FixFailed(e) = &event {
            warn!("Location attempt {} failed: {}", attempts, e);
            last_error = Some(e.clone());
        }

        let (next, effect) = state.on_event(event, &policy);
        debug!("Location acquisition {:?} -> {:?}", state, next);
        state = next;
        state_tx.send_replace(state.clone());

        match effect {
            None => {}
            Some(Effect::RequestFix { attempt }) => {
                attempts += 1;
                debug!(
                    "Requesting location (attempt {}/{})",
                    attempt + 1,
                    policy.max_retries
                );
                let event = tokio::select! {
                    biased;
                    _ = lifetime.cancelled() => return None,
                    result = tokio::time::timeout(policy.attempt_timeout, source.locate()) => {
                        match result {
                            Ok(Ok(fix)) => AcquisitionEvent::FixAcquired(fix),
                            Ok(Err(e)) => AcquisitionEvent::FixFailed(e),
                            Err(_) => AcquisitionEvent::FixFailed(LocationError::Timeout),
                        }
                    }
                };
                events.push_back(event);
            }
            Some(Effect::Backoff(delay)) => {
                scheduled_backoff += delay;
                tokio::select! {
                    biased;
                    _ = lifetime.cancelled() => return None,
                    _ = tokio::time::sleep(delay) => events.push_back(AcquisitionEvent::BackoffElapsed),
                }
            }
            Some(Effect::Emit) => {
                let (fix, resolution) = match &state {
                    AcquisitionState::Found(fix) => {
                        info!("Location found: {}, {}", fix.lat, fix.lng);
                        (*fix, Resolution::Found)
                    }
                    AcquisitionState::FallenBack(fix) => {
                        warn!("Max location retries reached, using fallback");
                        (*fix, Resolution::FallenBack)
                    }
                    _ => return None,
                };
                return Some(AcquisitionOutcome {
                    fix,
                    resolution,
                    attempts,
                    scheduled_backoff,
                    last_error,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays scripted results, then keeps failing
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<LocationFix, LocationError>>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<LocationFix, LocationError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LocationSource for ScriptedSource {
        async fn locate(&self) -> Result<LocationFix, LocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LocationError::PositionUnavailable))
        }
    }

    /// Never answers, like a browser stuck on a permission prompt
    struct SilentSource;

    #[async_trait]
    impl LocationSource for SilentSource {
        async fn locate(&self) -> Result<LocationFix, LocationError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let policy = AcquisitionPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff(2), Duration::from_millis(4000));
        assert_eq!(policy.backoff(3), Duration::from_millis(5000));
        assert_eq!(policy.backoff(40), Duration::from_millis(5000));
    }

    #[test]
    fn test_transition_sequence_to_fallback() {
        let policy = AcquisitionPolicy::default();
        let failure = || AcquisitionEvent::FixFailed(LocationError::PositionUnavailable);

        let (s, e) = AcquisitionState::Idle.on_event(AcquisitionEvent::Start, &policy);
        assert_eq!(s, AcquisitionState::Requesting { attempt: 0 });
        assert_eq!(e, Some(Effect::RequestFix { attempt: 0 }));

        let (s, e) = s.on_event(failure(), &policy);
        assert_eq!(
            s,
            AcquisitionState::Retrying {
                attempt: 1,
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(e, Some(Effect::Backoff(Duration::from_millis(1000))));

        let (s, _) = s.on_event(AcquisitionEvent::BackoffElapsed, &policy);
        let (s, _) = s.on_event(failure(), &policy);
        let (s, _) = s.on_event(AcquisitionEvent::BackoffElapsed, &policy);
        assert_eq!(s, AcquisitionState::Requesting { attempt: 2 });

        let (s, e) = s.on_event(failure(), &policy);
        assert_eq!(e, Some(Effect::Backoff(Duration::from_millis(4000))));

        let (s, e) = s.on_event(AcquisitionEvent::BackoffElapsed, &policy);
        assert_eq!(s, AcquisitionState::FallenBack(LocationFix::new(13.08, 80.27)));
        assert_eq!(e, Some(Effect::Emit));
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        let policy = AcquisitionPolicy::default();
        let found = AcquisitionState::Found(LocationFix::new(19.07, 72.87));
        assert!(found.is_terminal());

        let (s, e) = found.on_event(AcquisitionEvent::BackoffElapsed, &policy);
        assert_eq!(s, found);
        assert_eq!(e, None);

        let (s, e) = found.on_event(AcquisitionEvent::Start, &policy);
        assert_eq!(s, found);
        assert_eq!(e, None);
    }

    #[test]
    fn test_zero_retry_budget_falls_back_immediately() {
        let policy = AcquisitionPolicy {
            max_retries: 0,
            ..Default::default()
        };
        let (s, e) = AcquisitionState::Idle.on_event(AcquisitionEvent::Start, &policy);
        assert_eq!(s, AcquisitionState::FallenBack(policy.fallback));
        assert_eq!(e, Some(Effect::Emit));
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_fall_back() {
        let source = ScriptedSource::new(vec![]);
        let started = Instant::now();

        let mut handle = spawn(source.clone(), AcquisitionPolicy::default());
        let outcome = handle.outcome().await.unwrap();

        assert_eq!(outcome.resolution, Resolution::FallenBack);
        assert_eq!(outcome.fix, LocationFix::new(13.08, 80.27));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.scheduled_backoff, Duration::from_millis(1000 + 2000 + 4000));
        assert_eq!(outcome.last_error, Some(LocationError::PositionUnavailable));

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(7000));
        assert!(elapsed < Duration::from_millis(7100));

        // No further attempts after the terminal state
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(
            *handle.states().borrow(),
            AcquisitionState::FallenBack(LocationFix::new(13.08, 80.27))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_second_attempt() {
        let source = ScriptedSource::new(vec![
            Err(LocationError::Timeout),
            Ok(LocationFix::new(19.076, 72.8777)),
        ]);

        let mut handle = spawn(source.clone(), AcquisitionPolicy::default());
        let outcome = handle.outcome().await.unwrap();

        assert_eq!(outcome.resolution, Resolution::Found);
        assert_eq!(outcome.fix, LocationFix::new(19.076, 72.8777));
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.scheduled_backoff, Duration::from_millis(1000));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(
            *handle.states().borrow(),
            AcquisitionState::Found(LocationFix::new(19.076, 72.8777))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_backoff_stops_everything() {
        let source = ScriptedSource::new(vec![]);
        let mut handle = spawn(source.clone(), AcquisitionPolicy::default());
        let states = handle.states();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            *states.borrow(),
            AcquisitionState::Retrying {
                attempt: 1,
                delay: Duration::from_millis(1000)
            }
        );

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(handle.is_cancelled());
        assert_eq!(source.calls(), 1);
        assert_eq!(
            *states.borrow(),
            AcquisitionState::Retrying {
                attempt: 1,
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(handle.outcome().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_completion_suppresses_outcome() {
        let source = ScriptedSource::new(vec![Ok(LocationFix::new(19.076, 72.8777))]);
        let mut handle = spawn(source.clone(), AcquisitionPolicy::default());
        let mut states = handle.states();

        // Let the worker reach its terminal state and hand off the outcome
        states.wait_for(|s| s.is_terminal()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        handle.cancel();
        assert_eq!(handle.outcome().await, None);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_tears_down() {
        let source = ScriptedSource::new(vec![]);
        let handle = spawn(source.clone(), AcquisitionPolicy::default());
        let states = handle.states();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(source.calls(), 2);
        drop(handle);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 2);
        assert!(!states.borrow().is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout_counts_as_failure() {
        let mut handle = spawn(Arc::new(SilentSource), AcquisitionPolicy::default());
        let started = Instant::now();
        let outcome = handle.outcome().await.unwrap();

        assert_eq!(outcome.resolution, Resolution::FallenBack);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.last_error, Some(LocationError::Timeout));
        // Three ten-second attempts plus 1s + 2s + 4s of backoff
        assert!(started.elapsed() >= Duration::from_secs(37));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy_caps_each_delay() {
        let policy = AcquisitionPolicy {
            max_retries: 5,
            fallback: LocationFix::new(20.5937, 78.9629),
            ..Default::default()
        };
        let mut handle = spawn(ScriptedSource::new(vec![]), policy);
        let outcome = handle.outcome().await.unwrap();

        assert_eq!(outcome.fix, LocationFix::new(20.5937, 78.9629));
        assert_eq!(outcome.attempts, 5);
        assert_eq!(
            outcome.scheduled_backoff,
            Duration::from_millis(1000 + 2000 + 4000 + 5000 + 5000)
        );
    }
}
