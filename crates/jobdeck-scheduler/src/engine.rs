use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError, Weak,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{Result, SchedulerError},
    job::ScheduledJob,
    schedule::{compute_next_run, upcoming_runs, Schedule},
    scheduler::Scheduler,
    types::{JobDefinition, JobOptions, Task},
};

/// In-process scheduler: keeps jobs in memory and drives each one from its
/// own Tokio task at the precision of the Tokio timer.
///
/// Created stopped. Jobs can be added at any time; they only fire between
/// [`start`](Scheduler::start) and [`stop_jobs`](Scheduler::stop_jobs).
pub struct LocalScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    jobs: DashMap<Uuid, Arc<LocalJob>>,
    next_seq: AtomicU64,
    /// `true` while jobs fire on schedule.
    running: watch::Sender<bool>,
    /// Parent of every job's cancellation token.
    shutdown: CancellationToken,
}

impl LocalScheduler {
    pub fn new() -> Self {
        let (running, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                jobs: DashMap::new(),
                next_seq: AtomicU64::new(0),
                running,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        *self.inner.running.borrow()
    }

    /// Stop firing and cancel every job runner. Terminal: a shut-down
    /// scheduler rejects new jobs and cannot be restarted.
    pub fn shutdown(&self) {
        self.inner.running.send_replace(false);
        self.inner.shutdown.cancel();
        info!(jobs = self.inner.jobs.len(), "scheduler shut down");
    }
}

impl Default for LocalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scheduler for LocalScheduler {
    async fn jobs(&self) -> Vec<Arc<dyn ScheduledJob>> {
        let mut jobs: Vec<Arc<LocalJob>> = self
            .inner
            .jobs
            .iter()
            .filter(|entry| !entry.value().cancel.is_cancelled())
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        jobs.sort_by_key(|job| job.seq);
        jobs.into_iter()
            .map(|job| job as Arc<dyn ScheduledJob>)
            .collect()
    }

    async fn new_job(
        &self,
        definition: JobDefinition,
        task: Task,
        options: JobOptions,
    ) -> Result<Arc<dyn ScheduledJob>> {
        if self.inner.shutdown.is_cancelled() {
            return Err(SchedulerError::ShutDown);
        }
        let schedule = Schedule::compile(&definition)?;
        if options.limited_runs == Some(0) {
            return Err(SchedulerError::InvalidSchedule(
                "limited runs must be positive".to_string(),
            ));
        }

        let job = Arc::new(LocalJob {
            id: Uuid::new_v4(),
            seq: self.inner.next_seq.fetch_add(1, Ordering::Relaxed),
            name: options.name,
            tags: options.tags,
            schedule,
            task,
            singleton: options.singleton,
            limited_runs: options.limited_runs,
            executing: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(JobState::default()),
            cancel: self.inner.shutdown.child_token(),
            running: self.inner.running.subscribe(),
        });

        // Plan eagerly so the caller sees the next run right away.
        if self.is_running() {
            job.plan_from(Utc::now());
        }

        self.inner.jobs.insert(job.id, Arc::clone(&job));
        tokio::spawn(drive(Arc::clone(&job), Arc::downgrade(&self.inner)));
        info!(job_id = %job.id, name = %job.name, "job added");

        Ok(job as Arc<dyn ScheduledJob>)
    }

    async fn remove_job(&self, id: Uuid) -> Result<()> {
        match self.inner.jobs.remove(&id) {
            Some((_, job)) if !job.cancel.is_cancelled() => {
                job.cancel.cancel();
                info!(job_id = %id, "job removed");
                Ok(())
            }
            _ => Err(SchedulerError::JobNotFound { id: id.to_string() }),
        }
    }

    async fn start(&self) -> Result<()> {
        if self.inner.shutdown.is_cancelled() {
            return Err(SchedulerError::ShutDown);
        }
        if self
            .inner
            .running
            .send_if_modified(|running| !std::mem::replace(running, true))
        {
            info!("scheduler started");
        }
        Ok(())
    }

    async fn stop_jobs(&self) -> Result<()> {
        if self
            .inner
            .running
            .send_if_modified(|running| std::mem::replace(running, false))
        {
            info!("scheduler stopped");
        }
        Ok(())
    }
}

// --- jobs --------------------------------------------------------------------

#[derive(Debug, Default)]
struct JobState {
    next_run: Option<DateTime<Utc>>,
    last_run: Option<DateTime<Utc>>,
    run_count: u32,
}

struct LocalJob {
    id: Uuid,
    /// Creation order, used for enumeration.
    seq: u64,
    name: String,
    tags: Vec<String>,
    schedule: Schedule,
    task: Task,
    singleton: bool,
    limited_runs: Option<u32>,
    /// Set while a singleton job's body is executing.
    executing: Arc<AtomicBool>,
    state: Mutex<JobState>,
    cancel: CancellationToken,
    running: watch::Receiver<bool>,
}

impl LocalJob {
    fn state(&self) -> MutexGuard<'_, JobState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Compute and store the first run after `now`.
    fn plan_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let next = compute_next_run(&self.schedule, now);
        self.state().next_run = next;
        next
    }

    fn clear_next(&self) {
        self.state().next_run = None;
    }

    /// Move the plan past `fired`. A plan that already lies in the past
    /// (the process stalled) restarts from now instead of catching up.
    fn advance(&self, fired: DateTime<Utc>) {
        let now = Utc::now();
        let mut next = compute_next_run(&self.schedule, fired);
        if next.is_some_and(|n| n <= now) {
            next = compute_next_run(&self.schedule, now);
        }
        self.state().next_run = next;
    }

    /// Execute the body once in the background.
    fn fire(&self) {
        // The limit check and the increment share one lock so concurrent
        // run_now calls cannot push run_count past limited_runs.
        let run = {
            let mut state = self.state();
            if self.cancel.is_cancelled()
                || self.limited_runs.is_some_and(|max| state.run_count >= max)
            {
                debug!(job_id = %self.id, run_count = state.run_count, "job exhausted, run skipped");
                return;
            }
            if self.singleton && self.executing.swap(true, Ordering::AcqRel) {
                warn!(job_id = %self.id, name = %self.name, "previous run still executing, skipped");
                return;
            }
            state.last_run = Some(Utc::now());
            state.run_count += 1;
            state.run_count
        };
        info!(job_id = %self.id, name = %self.name, run, "executing job");

        let body = self.task.run();
        let executing = self.singleton.then(|| Arc::clone(&self.executing));
        tokio::spawn(async move {
            body.await;
            if let Some(flag) = executing {
                flag.store(false, Ordering::Release);
            }
        });

        if self.limited_runs.is_some_and(|max| run >= max) {
            info!(job_id = %self.id, run, "run limit reached, removing job");
            self.cancel.cancel();
        }
    }

    fn remaining_runs(&self, run_count: u32) -> Option<usize> {
        self.limited_runs
            .map(|max| max.saturating_sub(run_count) as usize)
    }
}

impl ScheduledJob for LocalJob {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn last_run(&self) -> Option<DateTime<Utc>> {
        self.state().last_run
    }

    fn next_run(&self) -> Option<DateTime<Utc>> {
        self.state().next_run
    }

    fn next_runs(&self, count: usize) -> Vec<DateTime<Utc>> {
        let (first, run_count) = {
            let state = self.state();
            (state.next_run, state.run_count)
        };
        let count = match self.remaining_runs(run_count) {
            Some(remaining) => count.min(remaining),
            None => count,
        };
        upcoming_runs(&self.schedule, first, count)
    }

    fn run_now(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(SchedulerError::JobNotFound {
                id: self.id.to_string(),
            });
        }
        if !*self.running.borrow() {
            return Err(SchedulerError::NotRunning);
        }
        self.fire();
        Ok(())
    }
}

/// Per-job event loop. Exits when the job is removed or the scheduler shuts down.
async fn drive(job: Arc<LocalJob>, inner: Weak<Inner>) {
    let mut running = job.running.clone();

    loop {
        if job.cancel.is_cancelled() {
            break;
        }

        let next = if *running.borrow_and_update() {
            job.next_run().or_else(|| job.plan_from(Utc::now()))
        } else {
            job.clear_next();
            None
        };

        let Some(next) = next else {
            // Stopped, or nothing left to fire: wait for a state change.
            tokio::select! {
                changed = running.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = job.cancel.cancelled() => break,
            }
            continue;
        };

        let delay = (next - Utc::now()).to_std().unwrap_or_default();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                job.advance(next);
                job.fire();
                if matches!(job.schedule, Schedule::Once { .. }) {
                    debug!(job_id = %job.id, "one-time job done");
                    job.cancel.cancel();
                }
            }
            changed = running.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = job.cancel.cancelled() => break,
        }
    }

    if let Some(inner) = inner.upgrade() {
        inner.jobs.remove(&job.id);
    }
    debug!(job_id = %job.id, "job runner exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn noop() -> Task {
        Task::new(|| async {})
    }

    fn counting(counter: Arc<AtomicUsize>) -> Task {
        Task::new(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    fn every(secs: u64) -> JobDefinition {
        JobDefinition::duration(Duration::from_secs(secs))
    }

    #[tokio::test]
    async fn next_run_follows_running_state() {
        let scheduler = LocalScheduler::new();
        let job = scheduler
            .new_job(every(10), noop(), JobOptions::named("report"))
            .await
            .unwrap();
        assert_eq!(job.next_run(), None);

        scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let next = job.next_run().expect("planned after start");
        assert!(next > Utc::now());

        scheduler.stop_jobs().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(job.next_run(), None);
    }

    #[tokio::test]
    async fn created_while_running_is_planned_immediately() {
        let scheduler = LocalScheduler::new();
        scheduler.start().await.unwrap();
        let job = scheduler
            .new_job(every(10), noop(), JobOptions::named("x"))
            .await
            .unwrap();

        let runs = job.next_runs(5);
        assert_eq!(runs.len(), 5);
        assert_eq!(Some(runs[0]), job.next_run());
        assert!(runs.windows(2).all(|w| (w[1] - w[0]).num_seconds() == 10));
    }

    #[tokio::test]
    async fn jobs_enumerate_in_creation_order() {
        let scheduler = LocalScheduler::new();
        for name in ["a", "b", "c"] {
            scheduler
                .new_job(every(5), noop(), JobOptions::named(name).with_tags(["t"]))
                .await
                .unwrap();
        }
        let names: Vec<String> = scheduler.jobs().await.iter().map(|j| j.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(scheduler.jobs().await[0].tags(), vec!["t".to_string()]);
    }

    #[tokio::test]
    async fn remove_twice_reports_not_found() {
        let scheduler = LocalScheduler::new();
        let job = scheduler
            .new_job(every(5), noop(), JobOptions::named("gone"))
            .await
            .unwrap();

        scheduler.remove_job(job.id()).await.unwrap();
        let err = scheduler.remove_job(job.id()).await.unwrap_err();
        assert!(matches!(err, SchedulerError::JobNotFound { .. }));
        assert!(scheduler.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn invalid_definition_is_rejected() {
        let scheduler = LocalScheduler::new();
        let err = scheduler
            .new_job(JobDefinition::cron("nope", false), noop(), JobOptions::named("bad"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SchedulerError::InvalidSchedule(_)));
        assert!(scheduler.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn run_now_requires_running_scheduler() {
        let scheduler = LocalScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let job = scheduler
            .new_job(every(3600), counting(Arc::clone(&counter)), JobOptions::named("manual"))
            .await
            .unwrap();

        assert!(matches!(job.run_now(), Err(SchedulerError::NotRunning)));

        scheduler.start().await.unwrap();
        job.run_now().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(job.last_run().is_some());
    }

    #[tokio::test]
    async fn fire_never_exceeds_run_limit() {
        let scheduler = LocalScheduler::new();
        scheduler.start().await.unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let job = scheduler
            .new_job(
                every(3600),
                counting(Arc::clone(&counter)),
                JobOptions::named("once-only").limited_runs(1),
            )
            .await
            .unwrap();
        let local = scheduler
            .inner
            .jobs
            .get(&job.id())
            .map(|entry| Arc::clone(entry.value()))
            .unwrap();

        // two callers that both passed run_now's checks before either fired
        local.fire();
        local.fire();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(local.state().run_count, 1);
        assert!(matches!(job.run_now(), Err(SchedulerError::JobNotFound { .. })));
    }

    #[tokio::test]
    async fn run_now_on_removed_job_fails() {
        let scheduler = LocalScheduler::new();
        scheduler.start().await.unwrap();
        let job = scheduler
            .new_job(every(60), noop(), JobOptions::named("x"))
            .await
            .unwrap();
        scheduler.remove_job(job.id()).await.unwrap();
        assert!(matches!(job.run_now(), Err(SchedulerError::JobNotFound { .. })));
    }

    #[tokio::test]
    async fn duration_job_fires_on_schedule() {
        let scheduler = LocalScheduler::new();
        let (tx, mut rx) = mpsc::channel::<()>(8);
        let task = Task::new(move || {
            let tx = tx.clone();
            async move {
                let _ = tx.send(()).await;
            }
        });
        scheduler
            .new_job(
                JobDefinition::duration(Duration::from_millis(50)),
                task,
                JobOptions::named("fast"),
            )
            .await
            .unwrap();
        scheduler.start().await.unwrap();

        for _ in 0..2 {
            tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("job fired")
                .expect("channel open");
        }
    }

    #[tokio::test]
    async fn one_time_job_fires_once_then_leaves() {
        let scheduler = LocalScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let at = Utc::now() + chrono::Duration::milliseconds(100);
        let job = scheduler
            .new_job(
                JobDefinition::one_time(at),
                counting(Arc::clone(&counter)),
                JobOptions::named("once"),
            )
            .await
            .unwrap();
        scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(job.next_runs(5), vec![at]);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(scheduler.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn limited_runs_remove_the_job() {
        let scheduler = LocalScheduler::new();
        scheduler.start().await.unwrap();
        let job = scheduler
            .new_job(every(3600), noop(), JobOptions::named("limited").limited_runs(2))
            .await
            .unwrap();

        assert_eq!(job.next_runs(5).len(), 2);
        job.run_now().unwrap();
        assert_eq!(job.next_runs(5).len(), 1);
        job.run_now().unwrap();
        assert!(scheduler.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn singleton_skips_overlapping_runs() {
        let scheduler = LocalScheduler::new();
        scheduler.start().await.unwrap();
        let started = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&started);
        let task = Task::new(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
        });
        let job = scheduler
            .new_job(every(3600), task, JobOptions::named("single").singleton())
            .await
            .unwrap();

        job.run_now().unwrap();
        job.run_now().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_is_terminal() {
        let scheduler = LocalScheduler::new();
        scheduler.start().await.unwrap();
        scheduler
            .new_job(every(5), noop(), JobOptions::named("x"))
            .await
            .unwrap();

        scheduler.shutdown();
        assert!(!scheduler.is_running());
        assert!(scheduler.jobs().await.is_empty());
        assert!(matches!(
            scheduler.start().await,
            Err(SchedulerError::ShutDown)
        ));
        assert!(scheduler
            .new_job(every(5), noop(), JobOptions::named("y"))
            .await
            .is_err());
    }
}
