//! Polling loop and dedup guard for due reminders.
//!
//! One repeating timer samples the wall clock, re-fetches the owner's
//! reminder definitions, matches them against the current minute, and hands
//! each due reminder to speech delivery. Matching granularity is a minute
//! but the clock is sampled every few seconds, so a sample is only acted on
//! inside the leading seconds of its minute; with evenly spaced ticks that
//! leaves at most one acting sample per minute. The guard keeps no record
//! across cycles — two samples landing inside the window double-fire.

use async_trait::async_trait;
use chrono::{DateTime, Local, Timelike, Utc};
use reminder_types::ReminderDefinition;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::announce::announcement_text;
use crate::api::ApiClient;
use crate::matcher::find_due;
use crate::speech::SpeechDelivery;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Leading seconds of each minute inside which matching may run. Equal to
/// the polling interval, so only one evenly spaced sample per minute can
/// land inside it.
pub const EARLY_WINDOW_SECS: u32 = 10;

/// Where the poller currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Sampling,
    Matching,
    Dispatching,
    Stopped,
}

impl PollerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollerState::Idle => "idle",
            PollerState::Sampling => "sampling",
            PollerState::Matching => "matching",
            PollerState::Dispatching => "dispatching",
            PollerState::Stopped => "stopped",
        }
    }
}

/// Fresh reminder definitions, re-fetched every cycle.
#[async_trait]
pub trait ReminderSource: Send + Sync {
    async fn fetch_definitions(&self) -> Result<Vec<ReminderDefinition>, String>;
}

#[async_trait]
impl ReminderSource for ApiClient {
    async fn fetch_definitions(&self) -> Result<Vec<ReminderDefinition>, String> {
        ApiClient::fetch_definitions(self).await
    }
}

/// Handle owned by whoever started the poller; queries its state and stops
/// it on teardown.
#[derive(Clone)]
pub struct PollerHandle {
    state: Arc<Mutex<PollerState>>,
    last_tick_at: Arc<Mutex<Option<String>>>,
    cancel: CancellationToken,
}

impl PollerHandle {
    fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PollerState::Idle)),
            last_tick_at: Arc::new(Mutex::new(None)),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn state(&self) -> PollerState {
        *self.state.lock().await
    }

    pub async fn last_tick_at(&self) -> Option<String> {
        self.last_tick_at.lock().await.clone()
    }

    /// Prevents all future cycles. An in-flight cycle's fetch or dispatch is
    /// not aborted.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

pub fn spawn_poller(
    source: Arc<dyn ReminderSource>,
    speaker: Arc<dyn SpeechDelivery>,
    voice_id: Option<String>,
    poll_interval_secs: u64,
) -> PollerHandle {
    spawn_with_clock(source, speaker, voice_id, poll_interval_secs, Local::now)
}

fn spawn_with_clock<F>(
    source: Arc<dyn ReminderSource>,
    speaker: Arc<dyn SpeechDelivery>,
    voice_id: Option<String>,
    poll_interval_secs: u64,
    now_fn: F,
) -> PollerHandle
where
    F: Fn() -> DateTime<Local> + Send + 'static,
{
    let handle = PollerHandle::new();
    let task_handle = handle.clone();
    tokio::spawn(async move {
        run_poller(
            source,
            speaker,
            voice_id,
            poll_interval_secs,
            task_handle,
            now_fn,
        )
        .await;
    });
    handle
}

async fn run_poller<F>(
    source: Arc<dyn ReminderSource>,
    speaker: Arc<dyn SpeechDelivery>,
    voice_id: Option<String>,
    poll_interval_secs: u64,
    handle: PollerHandle,
    now_fn: F,
) where
    F: Fn() -> DateTime<Local> + Send + 'static,
{
    log::info!(
        "[REMINDER] Poller started (poll interval: {}s, early window: {}s)",
        poll_interval_secs,
        EARLY_WINDOW_SECS
    );

    // The first tick fires immediately; after that the cadence is fixed.
    // Cycles are spawned, not awaited, so a slow dispatch never delays the
    // next sample (overlapping dispatch is acceptable — speech enqueues).
    let mut ticker = tokio::time::interval(Duration::from_secs(poll_interval_secs));

    loop {
        tokio::select! {
            // Cancellation wins over a simultaneously ready tick, so stop()
            // guarantees no further cycles.
            biased;
            _ = handle.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let source = source.clone();
        let speaker = speaker.clone();
        let voice_id = voice_id.clone();
        let cycle_handle = handle.clone();
        let now = now_fn();
        tokio::spawn(async move {
            match run_cycle(
                source.as_ref(),
                speaker.as_ref(),
                voice_id.as_deref(),
                &cycle_handle.state,
                now,
            )
            .await
            {
                Ok(()) => {
                    *cycle_handle.last_tick_at.lock().await = Some(Utc::now().to_rfc3339());
                }
                Err(e) => {
                    log::error!("[REMINDER] Tick error: {}", e);
                }
            }
        });
    }

    *handle.state.lock().await = PollerState::Stopped;
    log::info!("[REMINDER] Poller stopped");
}

/// One cycle: sample, fetch, match, dispatch. A fetch failure aborts the
/// cycle; a per-reminder delivery failure never blocks the remaining due
/// reminders.
async fn run_cycle(
    source: &dyn ReminderSource,
    speaker: &dyn SpeechDelivery,
    voice_id: Option<&str>,
    state: &Mutex<PollerState>,
    now: DateTime<Local>,
) -> Result<(), String> {
    *state.lock().await = PollerState::Sampling;

    // Samples past the early window are discarded before any fetch. This is
    // an early-exit optimization, not a correctness guarantee.
    if now.second() >= EARLY_WINDOW_SECS {
        *state.lock().await = PollerState::Idle;
        return Ok(());
    }

    log::debug!("[REMINDER] Checking reminders at {}", now.format("%H:%M:%S"));

    let definitions = match source.fetch_definitions().await {
        Ok(defs) => defs,
        Err(e) => {
            *state.lock().await = PollerState::Idle;
            return Err(e);
        }
    };

    *state.lock().await = PollerState::Matching;
    let due: Vec<ReminderDefinition> = find_due(&definitions, &now).into_iter().cloned().collect();

    if !due.is_empty() {
        *state.lock().await = PollerState::Dispatching;
        for def in &due {
            let message = announcement_text(def);
            log::info!("[REMINDER] Announcing {} ({})", def.id, def.scheduled_time);
            if let Err(e) = speaker.speak(&message, voice_id).await {
                log::error!("[REMINDER] Failed to announce {}: {}", def.id, e);
            }
        }
    }

    *state.lock().await = PollerState::Idle;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reminder_types::{ReminderKind, Weekday};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn def(label: &str, time: &str, days: Vec<Weekday>) -> ReminderDefinition {
        ReminderDefinition {
            id: format!("medicine-{}", label),
            label: label.to_string(),
            scheduled_time: time.to_string(),
            active_days: days,
            is_active: true,
            notes: None,
            kind: ReminderKind::Medicine,
        }
    }

    // 2025-06-03 is a Tuesday; second 5 is inside the early window.
    fn tuesday_nine_oh_five() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 3, 9, 0, 5).unwrap()
    }

    struct MockSource {
        definitions: Vec<ReminderDefinition>,
        fetches: AtomicUsize,
    }

    impl MockSource {
        fn new(definitions: Vec<ReminderDefinition>) -> Self {
            Self {
                definitions,
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReminderSource for MockSource {
        async fn fetch_definitions(&self) -> Result<Vec<ReminderDefinition>, String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.definitions.clone())
        }
    }

    /// Records every attempted announcement; fails those containing
    /// `fail_substring`.
    struct RecordingSpeaker {
        attempts: StdMutex<Vec<String>>,
        fail_substring: Option<String>,
    }

    impl RecordingSpeaker {
        fn new(fail_substring: Option<&str>) -> Self {
            Self {
                attempts: StdMutex::new(Vec::new()),
                fail_substring: fail_substring.map(|s| s.to_string()),
            }
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpeechDelivery for RecordingSpeaker {
        async fn speak(&self, text: &str, _voice_id: Option<&str>) -> Result<(), String> {
            self.attempts.lock().unwrap().push(text.to_string());
            match &self.fail_substring {
                Some(marker) if text.contains(marker) => Err("scripted failure".to_string()),
                _ => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn cycle_dispatches_due_reminders_in_order() {
        let source = MockSource::new(vec![
            def("everyday", "09:00", vec![]),
            def("later", "10:00", vec![]),
            def("tuesdays", "09:00", vec![Weekday::Tue]),
        ]);
        let speaker = RecordingSpeaker::new(None);
        let state = Mutex::new(PollerState::Idle);

        run_cycle(&source, &speaker, None, &state, tuesday_nine_oh_five())
            .await
            .unwrap();

        let attempts = speaker.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[0].contains("everyday"));
        assert!(attempts[1].contains("tuesdays"));
        assert_eq!(*state.lock().await, PollerState::Idle);
    }

    #[tokio::test]
    async fn delivery_failure_does_not_block_siblings() {
        let source = MockSource::new(vec![
            def("first", "09:00", vec![]),
            def("second", "09:00", vec![]),
        ]);
        let speaker = RecordingSpeaker::new(Some("first"));
        let state = Mutex::new(PollerState::Idle);

        run_cycle(&source, &speaker, None, &state, tuesday_nine_oh_five())
            .await
            .unwrap();

        let attempts = speaker.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[1].contains("second"));
    }

    #[tokio::test]
    async fn samples_outside_the_early_window_are_discarded() {
        let source = MockSource::new(vec![def("everyday", "09:00", vec![])]);
        let speaker = RecordingSpeaker::new(None);
        let state = Mutex::new(PollerState::Idle);

        let late_sample = Local.with_ymd_and_hms(2025, 6, 3, 9, 0, 30).unwrap();
        run_cycle(&source, &speaker, None, &state, late_sample)
            .await
            .unwrap();

        assert_eq!(source.fetch_count(), 0);
        assert!(speaker.attempts().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_aborts_the_cycle_without_dispatch() {
        struct FailingSource;

        #[async_trait]
        impl ReminderSource for FailingSource {
            async fn fetch_definitions(&self) -> Result<Vec<ReminderDefinition>, String> {
                Err("store unreachable".to_string())
            }
        }

        let speaker = RecordingSpeaker::new(None);
        let state = Mutex::new(PollerState::Idle);

        let result = run_cycle(
            &FailingSource,
            &speaker,
            None,
            &state,
            tuesday_nine_oh_five(),
        )
        .await;

        assert!(result.is_err());
        assert!(speaker.attempts().is_empty());
        assert_eq!(*state.lock().await, PollerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_the_poller_prevents_all_further_cycles() {
        let source = Arc::new(MockSource::new(vec![def("everyday", "09:00", vec![])]));
        let speaker = Arc::new(RecordingSpeaker::new(None));

        // Fixed in-window clock: every tick samples Tuesday 09:00:05, so the
        // stateless guard fires every cycle (the documented double-fire).
        let handle = spawn_with_clock(
            source.clone(),
            speaker.clone(),
            None,
            DEFAULT_POLL_INTERVAL_SECS,
            tuesday_nine_oh_five,
        );

        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)).await;
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }

        let fetches_before = source.fetch_count();
        let attempts_before = speaker.attempts().len();
        assert!(fetches_before >= 2, "poller should have completed cycles");
        assert!(attempts_before >= 2, "in-window samples re-fire every cycle");

        handle.stop();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        for _ in 0..6 {
            tokio::time::advance(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)).await;
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }

        assert_eq!(source.fetch_count(), fetches_before);
        assert_eq!(speaker.attempts().len(), attempts_before);
        assert_eq!(handle.state().await, PollerState::Stopped);
    }
}
