//! Background sweeps that keep the schedule consistent without anyone looking at it.
//!
//! * The auto-finish worker moves overdue matches to `FT`.
//! * The loan completion worker closes off loans for finished matches.
//!
//! The two workers run independently on the same interval, and neither waits for the other. A loan whose match is
//! finished by one auto-finish pass is completed by the next loan completion pass.
//!
//! Both workers run their first pass immediately. Errors are logged and the pass is skipped, and the next tick tries
//! again.
use std::time::Duration;

use log::*;
use matchday_engine::{
    db_types::Match,
    events::EventProducers,
    lifecycle::ScheduleClock,
    LoanApi,
    MatchApi,
    SqliteDatabase,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Owns a background task. The task is aborted when the handle is stopped or dropped.
#[derive(Debug)]
pub struct WorkerHandle {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    fn new(name: &'static str, handle: JoinHandle<()>) -> Self {
        Self { name, handle: Some(handle) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Stops the worker and waits for the task to wind down.
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            info!("🕰️ {} stopped", self.name);
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("🕰️ {} dropped. Aborting the task.", self.name);
            handle.abort();
        }
    }
}

/// Starts the auto-finish worker. Every `interval`, matches that are at least 105 minutes past kickoff and not yet
/// `FT` are finished.
pub fn start_auto_finish_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    clock: ScheduleClock,
    interval: Duration,
) -> WorkerHandle {
    let handle = tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let api = MatchApi::new(db, producers);
        info!("🕰️ Auto-finish worker started. Sweeping every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Running auto-finish sweep");
            match api.run_auto_finish_sweep(clock.now()).await {
                Ok(result) if result.has_changes() || result.failed_count() > 0 => {
                    info!("🕰️ {} matches auto-finished. {} failed.", result.finished_count(), result.failed_count());
                    debug!("🕰️ Auto-finished matches: {}", match_list(&result.finished));
                },
                Ok(_) => trace!("🕰️ No matches were due to finish"),
                Err(e) => error!("🕰️ Error running auto-finish sweep: {e}"),
            }
        }
    });
    WorkerHandle::new("Auto-finish worker", handle)
}

/// Starts the loan completion worker. Every `interval`, loans attached to finished matches are marked as completed.
pub fn start_loan_completion_worker(db: SqliteDatabase, producers: EventProducers, interval: Duration) -> WorkerHandle {
    let handle = tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let api = LoanApi::new(db, producers);
        info!("🕰️ Loan completion worker started. Sweeping every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Running loan completion sweep");
            match api.complete_loans_for_finished_matches().await {
                Ok(completed) if !completed.is_empty() => {
                    let ids = completed.iter().map(|l| format!("#{}", l.id)).collect::<Vec<_>>().join(", ");
                    info!("🕰️ {} loans completed: {ids}", completed.len());
                },
                Ok(_) => trace!("🕰️ No loans were waiting to be completed"),
                Err(e) => error!("🕰️ Error running loan completion sweep: {e}"),
            }
        }
    });
    WorkerHandle::new("Loan completion worker", handle)
}

fn match_list(matches: &[Match]) -> String {
    matches
        .iter()
        .map(|m| {
            format!("[{}] {} {}-{} {}", m.id, m.home_team.team_name, m.home_score, m.away_score, m.away_team.team_name)
        })
        .collect::<Vec<String>>()
        .join(", ")
}
