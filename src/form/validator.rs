//! Debounced, generation-tokened remote check for a single form field.
//!
//! Every edit mints a new generation and restarts the debounce timer. When the
//! timer fires the request for that generation is issued on a detached task;
//! its response is committed only if no newer generation has been minted in
//! the meantime. Late responses for superseded generations are dropped, no
//! matter in which order the transport delivers them.
//!
//! A check that errors resolves the field as invalid.

use crate::config::ValidatorConfig;
use crate::core::ClientResult;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Remote boolean predicate over a field value.
#[async_trait]
pub trait FieldCheck<V: Send + 'static>: Send + Sync {
    async fn check(&self, value: V) -> ClientResult<bool>;
}

#[async_trait]
impl<V, F> FieldCheck<V> for F
where
    V: Send + 'static,
    F: Fn(V) -> BoxFuture<'static, ClientResult<bool>> + Send + Sync,
{
    async fn check(&self, value: V) -> ClientResult<bool> {
        (self)(value).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckPhase<V> {
    /// Never edited, or reset because the value is not worth checking.
    Idle,
    Debouncing { value: V, generation: u64 },
    InFlight { value: V, generation: u64 },
    Resolved { value: V, valid: bool },
}

impl<V> CheckPhase<V> {
    /// No timer armed and no request outstanding.
    pub fn is_settled(&self) -> bool {
        matches!(self, CheckPhase::Idle | CheckPhase::Resolved { .. })
    }
}

/// What the field contributes to form validity for its live value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldVerdict {
    Valid,
    Invalid,
    /// Not yet determined. Gates like `Invalid`.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldState<V> {
    phase: CheckPhase<V>,
    /// Most recently minted generation.
    generation: u64,
    /// Requests that actually left the debounce window.
    issued: u64,
}

impl<V: Clone + PartialEq> FieldState<V> {
    fn new() -> Self {
        Self {
            phase: CheckPhase::Idle,
            generation: 0,
            issued: 0,
        }
    }

    fn mint(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn begin_flight(&mut self, generation: u64) -> bool {
        match &self.phase {
            CheckPhase::Debouncing {
                value,
                generation: armed,
            } if *armed == generation => {
                self.phase = CheckPhase::InFlight {
                    value: value.clone(),
                    generation,
                };
                self.issued += 1;
                true
            }
            _ => false,
        }
    }

    fn resolve(&mut self, generation: u64, value: V, valid: bool) -> bool {
        match &self.phase {
            CheckPhase::InFlight {
                generation: current,
                ..
            } if *current == generation => {
                self.phase = CheckPhase::Resolved { value, valid };
                true
            }
            _ => false,
        }
    }

    fn verdict(&self, live: &V) -> FieldVerdict {
        match &self.phase {
            CheckPhase::Resolved { value, valid } if value == live => {
                if *valid {
                    FieldVerdict::Valid
                } else {
                    FieldVerdict::Invalid
                }
            }
            _ => FieldVerdict::Pending,
        }
    }
}

/// Binds one field to a [`FieldCheck`].
///
/// Must be driven from inside a tokio runtime: edits spawn the debounce timer
/// and the request tasks.
pub struct AsyncFieldValidator<V: Send + 'static> {
    check: Arc<dyn FieldCheck<V>>,
    debounce: Duration,
    state: Arc<watch::Sender<FieldState<V>>>,
    timer: Option<JoinHandle<()>>,
}

impl<V> AsyncFieldValidator<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(check: Arc<dyn FieldCheck<V>>, config: &ValidatorConfig) -> Self {
        let (state, _) = watch::channel(FieldState::new());
        Self {
            check,
            debounce: config.debounce,
            state: Arc::new(state),
            timer: None,
        }
    }

    /// Registers an edit: supersedes anything pending and restarts the debounce.
    pub fn edit(&mut self, value: V) {
        self.cancel_timer();

        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = s.mint();
            s.phase = CheckPhase::Debouncing {
                value: value.clone(),
                generation,
            };
        });
        debug!(generation, "field edit, debounce armed");

        let state = Arc::clone(&self.state);
        let check = Arc::clone(&self.check);
        let delay = self.debounce;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if state.send_if_modified(|s| s.begin_flight(generation)) {
                // detached so that a later edit cancelling the timer does not
                // abort the request; its response is discarded by generation instead
                tokio::spawn(run_check(state, check, value, generation));
            }
        }));
    }

    /// Issues a check for `value` right away, skipping the debounce window.
    pub fn check_now(&mut self, value: V) {
        self.cancel_timer();

        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = s.mint();
            s.phase = CheckPhase::InFlight {
                value: value.clone(),
                generation,
            };
            s.issued += 1;
        });
        debug!(generation, "field check issued without debounce");

        tokio::spawn(run_check(
            Arc::clone(&self.state),
            Arc::clone(&self.check),
            value,
            generation,
        ));
    }

    /// Back to `Idle`; outstanding responses become stale.
    pub fn reset(&mut self) {
        self.cancel_timer();
        self.state.send_modify(|s| {
            s.mint();
            s.phase = CheckPhase::Idle;
        });
    }

    pub fn phase(&self) -> CheckPhase<V> {
        self.state.borrow().phase.clone()
    }

    pub fn verdict(&self, live: &V) -> FieldVerdict {
        self.state.borrow().verdict(live)
    }

    pub fn requests_issued(&self) -> u64 {
        self.state.borrow().issued
    }

    /// Waits until no timer is armed and no request is outstanding.
    pub async fn settle(&self) {
        let mut rx = self.state.subscribe();
        // the sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|s| s.phase.is_settled()).await;
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<V: Send + 'static> Drop for AsyncFieldValidator<V> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

async fn run_check<V>(
    state: Arc<watch::Sender<FieldState<V>>>,
    check: Arc<dyn FieldCheck<V>>,
    value: V,
    generation: u64,
) where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    // own task, so a panicking check still resolves the field
    let request = {
        let value = value.clone();
        tokio::spawn(async move { check.check(value).await })
    };
    let valid = match request.await {
        Ok(Ok(valid)) => valid,
        Ok(Err(err)) => {
            warn!(generation, error = %err, "remote field check failed, failing closed");
            false
        }
        Err(err) => {
            warn!(generation, error = %err, "remote field check aborted, failing closed");
            false
        }
    };

    if state.send_if_modified(|s| s.resolve(generation, value, valid)) {
        debug!(generation, valid, "field check resolved");
    } else {
        debug!(generation, "stale field check response discarded");
    }
}
