//! Wake timers
//!
//! One-shot timers that fire a reminder registration at its scheduled time.
//! The timer owns only the registration payload; when it fires it hands that
//! snapshot to a [`TriggerHandler`] and never looks at the note itself.

use crate::database::ReminderRegistration;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

/// A facility that can arm and disarm one-shot timers keyed by request id
#[async_trait]
pub trait WakeTimer: Send + Sync {
    /// Arm a timer for `registration.fire_at`, replacing any timer already
    /// armed under the same request id. Past times fire as soon as possible.
    async fn arm(&self, registration: ReminderRegistration) -> Result<()>;

    /// Disarm the timer for `request_id`. Unknown ids are ignored.
    async fn disarm(&self, request_id: i32) -> Result<()>;
}

/// Invoked when a timer fires
#[async_trait]
pub trait TriggerHandler: Send + Sync {
    async fn on_trigger(&self, registration: ReminderRegistration);
}

/// Wake timer backed by one-shot `tokio-cron-scheduler` jobs
pub struct CronWakeTimer {
    scheduler: Arc<RwLock<JobScheduler>>,
    jobs: Arc<RwLock<HashMap<i32, Uuid>>>,
    handler: Arc<dyn TriggerHandler>,
    running: Arc<AtomicBool>,
}

impl CronWakeTimer {
    /// Create a stopped timer. Nothing fires until [`CronWakeTimer::start`].
    pub async fn new(handler: Arc<dyn TriggerHandler>) -> Result<Self> {
        let scheduler = JobScheduler::new().await.map_err(|e| {
            AppError::SchedulingUnavailable(format!("Failed to create scheduler: {}", e))
        })?;

        Ok(Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
            jobs: Arc::new(RwLock::new(HashMap::new())),
            handler,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<()> {
        let scheduler = self.scheduler.read().await;
        scheduler.start().await.map_err(|e| {
            AppError::SchedulingUnavailable(format!("Failed to start scheduler: {}", e))
        })?;
        self.running.store(true, Ordering::SeqCst);
        tracing::info!("Reminder timer started");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of timers armed and not yet fired
    pub async fn armed_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_armed(&self, request_id: i32) -> bool {
        self.jobs.read().await.contains_key(&request_id)
    }

    /// Shutdown scheduler gracefully. Armed timers are dropped.
    pub async fn shutdown(&self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);

        let mut scheduler = self.scheduler.write().await;
        scheduler.shutdown().await.map_err(|e| {
            AppError::SchedulingUnavailable(format!("Failed to shutdown scheduler: {}", e))
        })?;
        self.jobs.write().await.clear();

        tracing::info!("Reminder timer shutdown");
        Ok(())
    }

    fn build_job(&self, registration: ReminderRegistration) -> Result<Job> {
        let delay_ms = registration
            .fire_at
            .saturating_sub(Utc::now().timestamp_millis())
            .max(0);
        let delay = Duration::from_millis(delay_ms as u64);

        let request_id = registration.request_id;
        let handler = Arc::clone(&self.handler);
        let jobs = Arc::clone(&self.jobs);

        Job::new_one_shot_async(delay, move |job_id, _l| {
            let handler = Arc::clone(&handler);
            let jobs = Arc::clone(&jobs);
            let registration = registration.clone();
            Box::pin(async move {
                {
                    let mut jobs = jobs.write().await;
                    if jobs.get(&request_id) == Some(&job_id) {
                        jobs.remove(&request_id);
                    }
                }

                tracing::info!(
                    "Reminder {} fired for note {}",
                    request_id,
                    registration.note_id
                );
                handler.on_trigger(registration).await;
            })
        })
        .map_err(|e| AppError::SchedulingUnavailable(format!("Failed to create reminder job: {}", e)))
    }
}

#[async_trait]
impl WakeTimer for CronWakeTimer {
    async fn arm(&self, registration: ReminderRegistration) -> Result<()> {
        if !self.is_running() {
            return Err(AppError::SchedulingUnavailable(
                "Reminder timer is not running".to_string(),
            ));
        }

        let request_id = registration.request_id;
        let fire_at = registration.fire_at;
        let job = self.build_job(registration)?;

        let scheduler = self.scheduler.read().await;
        let mut jobs = self.jobs.write().await;

        if let Some(previous) = jobs.remove(&request_id) {
            if let Err(e) = scheduler.remove(&previous).await {
                tracing::warn!("Failed to remove superseded reminder job {}: {}", previous, e);
            }
        }

        let job_id = scheduler
            .add(job)
            .await
            .map_err(|e| AppError::SchedulingUnavailable(format!("Failed to schedule reminder: {}", e)))?;
        jobs.insert(request_id, job_id);

        tracing::info!("Reminder {} armed for {}", request_id, fire_at);
        Ok(())
    }

    async fn disarm(&self, request_id: i32) -> Result<()> {
        let removed = self.jobs.write().await.remove(&request_id);

        if let Some(job_id) = removed {
            let scheduler = self.scheduler.read().await;
            if let Err(e) = scheduler.remove(&job_id).await {
                tracing::warn!("Failed to remove reminder job {}: {}", job_id, e);
            }
            tracing::info!("Reminder {} disarmed", request_id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::NotifyMode;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        fired: Mutex<Vec<ReminderRegistration>>,
    }

    #[async_trait]
    impl TriggerHandler for RecordingHandler {
        async fn on_trigger(&self, registration: ReminderRegistration) {
            self.fired.lock().await.push(registration);
        }
    }

    fn in_future(note_id: i64, hours: i64) -> ReminderRegistration {
        let fire_at = Utc::now().timestamp_millis() + hours * 3_600_000;
        ReminderRegistration::new(note_id, "Later", fire_at, NotifyMode::Sound)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_arm_requires_running_scheduler() {
        let timer = CronWakeTimer::new(Arc::new(RecordingHandler::default()))
            .await
            .unwrap();

        let result = timer.arm(in_future(1, 1)).await;
        assert!(matches!(result, Err(AppError::SchedulingUnavailable(_))));
        assert_eq!(timer.armed_count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rearming_same_request_id_keeps_one_timer() {
        let timer = CronWakeTimer::new(Arc::new(RecordingHandler::default()))
            .await
            .unwrap();
        timer.start().await.unwrap();

        let registration = in_future(1, 1);
        timer.arm(registration.clone()).await.unwrap();
        timer.arm(registration.clone()).await.unwrap();

        assert_eq!(timer.armed_count().await, 1);
        assert!(timer.is_armed(registration.request_id).await);

        timer.disarm(registration.request_id).await.unwrap();
        timer.disarm(registration.request_id).await.unwrap();
        assert_eq!(timer.armed_count().await, 0);

        timer.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_past_reminder_fires() {
        let handler = Arc::new(RecordingHandler::default());
        let timer = CronWakeTimer::new(handler.clone()).await.unwrap();
        timer.start().await.unwrap();

        let fire_at = Utc::now().timestamp_millis() - 60_000;
        let registration = ReminderRegistration::new(7, "Overdue", fire_at, NotifyMode::Default);
        timer.arm(registration.clone()).await.unwrap();

        for _ in 0..100 {
            if !handler.fired.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let fired = handler.fired.lock().await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0], registration);
        drop(fired);

        assert!(!timer.is_armed(registration.request_id).await);
        timer.shutdown().await.unwrap();
    }
}
