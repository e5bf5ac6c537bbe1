//! In-process workflow orchestrator backed by tokio timers.
//!
//! Every started [`TimerRun`] becomes a spawned task that sleeps for the run's
//! delay, leaves the running set and is then handed back through the fired
//! channel. Starting a run under a name that is already pending replaces it;
//! each start carries a generation so a replaced task never fires or removes
//! its successor. The fired channel is returned by
//! [`InProcessWorkflows::new`]; the composition root drains it into
//! [`TimerFenceController::on_workflow_fired`](crate::services::timer_fence::TimerFenceController::on_workflow_fired).
//!
//! Pending runs live in memory only and are lost on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use gardenhub_domain::error::GardenHubError;
use gardenhub_domain::id::DeviceId;
use gardenhub_domain::timer::{TimerRun, TimerRunName};

use crate::ports::WorkflowOrchestrator;

struct Pending {
    device_id: DeviceId,
    generation: u64,
    handle: JoinHandle<()>,
}

type RunMap = HashMap<TimerRunName, Pending>;

fn lock(runs: &Mutex<RunMap>) -> MutexGuard<'_, RunMap> {
    runs.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Remove `name` if it still belongs to `generation`.
///
/// Returns `false` when the run was stopped or replaced by a newer start,
/// in which case the newer entry is left alone.
fn retire(runs: &Mutex<RunMap>, name: &TimerRunName, generation: u64) -> bool {
    let mut guard = lock(runs);
    if guard
        .get(name)
        .is_some_and(|pending| pending.generation == generation)
    {
        guard.remove(name);
        true
    } else {
        false
    }
}

/// [`WorkflowOrchestrator`] running timer fences inside this process.
pub struct InProcessWorkflows {
    runs: Arc<Mutex<RunMap>>,
    next_generation: AtomicU64,
    fired: mpsc::UnboundedSender<TimerRun>,
}

impl InProcessWorkflows {
    /// Create an orchestrator and the receiver its fired runs arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerRun>) {
        let (fired, rx) = mpsc::unbounded_channel();
        let runs = Arc::new(Mutex::new(HashMap::new()));
        let workflows = Self {
            runs,
            next_generation: AtomicU64::new(0),
            fired,
        };
        (workflows, rx)
    }

    /// Number of runs that have neither fired nor been stopped.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.runs).len()
    }
}

impl WorkflowOrchestrator for InProcessWorkflows {
    async fn start(&self, run: TimerRun) -> Result<(), GardenHubError> {
        let name = run.name.clone();
        let device_id = run.device_id;
        let runs = Arc::clone(&self.runs);
        let fired = self.fired.clone();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        // The task removes itself under the same lock, so it cannot race
        // ahead of the insert below.
        let mut guard = lock(&self.runs);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(run.delay).await;
            if !retire(&runs, &run.name, generation) {
                tracing::debug!(run = %run.name, "timer run superseded before firing");
                return;
            }
            tracing::debug!(run = %run.name, "timer run fired");
            if fired.send(run).is_err() {
                tracing::warn!("fired timer run dropped, nobody is listening");
            }
        });
        if let Some(previous) = guard.insert(
            name,
            Pending {
                device_id,
                generation,
                handle,
            },
        ) {
            previous.handle.abort();
        }
        Ok(())
    }

    async fn list_running(
        &self,
        device_id: DeviceId,
    ) -> Result<Vec<TimerRunName>, GardenHubError> {
        let mut names: Vec<TimerRunName> = lock(&self.runs)
            .iter()
            .filter(|(_, pending)| pending.device_id == device_id)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn stop(&self, name: &TimerRunName) -> Result<(), GardenHubError> {
        if let Some(pending) = lock(&self.runs).remove(name) {
            pending.handle.abort();
            tracing::debug!(run = %name, "timer run stopped");
        }
        Ok(())
    }
}
