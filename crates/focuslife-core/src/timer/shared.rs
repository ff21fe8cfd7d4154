//! Shared, observable timer handle.
//!
//! Several UI surfaces (dashboard widget, fullscreen focus view, CLI watch
//! loop) act on the same timer. `SharedTimer` is the single authoritative
//! owner: every surface clones the handle, issues the same mutations, and
//! observes the same snapshot. There is no per-view timer.
//!
//! Each mutation is applied under one lock, written through to the store,
//! and fanned out to subscribers. Completion alerts are dispatched to the
//! notification sink best-effort.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::events::Event;
use crate::notify::{completion_alert, NotificationSink, ALERT_ICON};
use crate::storage::SnapshotStore;

use super::engine::{now_ms, EngineMode, FocusEngine};
use super::persist;
use super::preset::Preset;

type Subscriber = Box<dyn Fn(&Event) + Send>;

struct Inner<S> {
    engine: FocusEngine,
    store: S,
    sink: Box<dyn NotificationSink + Send>,
    subscribers: Vec<Subscriber>,
}

/// Clonable handle to the process-wide timer state.
pub struct SharedTimer<S: SnapshotStore> {
    inner: Arc<Mutex<Inner<S>>>,
}

impl<S: SnapshotStore> Clone for SharedTimer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SnapshotStore> SharedTimer<S> {
    /// Reconstruct the timer from the store and wrap it in a handle.
    pub fn open(store: S, sink: Box<dyn NotificationSink + Send>, default_preset: Preset) -> Self {
        Self::open_at(store, sink, default_preset, now_ms())
    }

    pub fn open_at(
        store: S,
        sink: Box<dyn NotificationSink + Send>,
        default_preset: Preset,
        now_epoch_ms: u64,
    ) -> Self {
        let engine = persist::load(&store, default_preset, now_epoch_ms);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                engine,
                store,
                sink,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register an observer called after every state change.
    pub fn subscribe(&self, f: impl Fn(&Event) + Send + 'static) {
        self.lock().subscribers.push(Box::new(f));
    }

    pub fn toggle(&self) -> Option<Event> {
        self.toggle_at(now_ms())
    }

    pub fn toggle_at(&self, now_epoch_ms: u64) -> Option<Event> {
        let mut inner = self.lock();
        let event = inner.engine.toggle_at(now_epoch_ms);
        inner.after_mutation(event)
    }

    pub fn reset(&self) -> Option<Event> {
        self.reset_at(now_ms())
    }

    pub fn reset_at(&self, now_epoch_ms: u64) -> Option<Event> {
        let mut inner = self.lock();
        let event = inner.engine.reset_at(now_epoch_ms);
        inner.after_mutation(event)
    }

    pub fn select_preset(&self, preset: Preset) -> Option<Event> {
        self.select_preset_at(preset, now_ms())
    }

    pub fn select_preset_at(&self, preset: Preset, now_epoch_ms: u64) -> Option<Event> {
        let mut inner = self.lock();
        let event = inner.engine.select_preset_at(preset, now_epoch_ms);
        inner.after_mutation(event)
    }

    pub fn start_custom(&self, minutes: u64) -> Option<Event> {
        self.start_custom_at(minutes, now_ms())
    }

    pub fn start_custom_at(&self, minutes: u64, now_epoch_ms: u64) -> Option<Event> {
        let mut inner = self.lock();
        let event = inner.engine.start_custom_at(minutes, now_epoch_ms);
        inner.after_mutation(event)
    }

    pub fn switch_engine_mode(&self, mode: EngineMode) -> Option<Event> {
        self.switch_engine_mode_at(mode, now_ms())
    }

    pub fn switch_engine_mode_at(&self, mode: EngineMode, now_epoch_ms: u64) -> Option<Event> {
        let mut inner = self.lock();
        let event = inner.engine.switch_engine_mode_at(mode, now_epoch_ms);
        inner.after_mutation(event)
    }

    pub fn tick(&self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&self, now_epoch_ms: u64) -> Option<Event> {
        let mut inner = self.lock();
        let event = inner.engine.tick_at(now_epoch_ms);
        inner.after_mutation(event)
    }

    /// Current snapshot with a freshly recomputed value. Read-only.
    pub fn snapshot(&self) -> Event {
        self.snapshot_at(now_ms())
    }

    pub fn snapshot_at(&self, now_epoch_ms: u64) -> Event {
        self.lock().engine.snapshot_at(now_epoch_ms)
    }

    /// The active preset.
    pub fn preset(&self) -> Preset {
        self.lock().engine.preset().clone()
    }

    /// Run a closure against the underlying store (e.g. to query session
    /// history while holding the same handle).
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().store)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<S: SnapshotStore> Inner<S> {
    /// Write-through, alert, fan-out. Persistence failures are logged and
    /// never propagate; the in-memory snapshot stays authoritative.
    fn after_mutation(&mut self, event: Option<Event>) -> Option<Event> {
        let event = event?;

        if let Err(e) = persist::save(&self.engine, &mut self.store) {
            eprintln!("Warning: failed to persist timer snapshot: {e}");
        }

        if let Event::PhaseCompleted { finished_phase, .. } = event {
            let (title, body) = completion_alert(finished_phase, self.engine.preset());
            if let Err(e) = self.sink.notify(&title, &body, Some(ALERT_ICON)) {
                eprintln!("Warning: failed to deliver alert: {e}");
            }
        }

        for subscriber in &self.subscribers {
            subscriber(&event);
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NotifyError, StorageError};
    use crate::notify::NullSink;
    use crate::storage::MemoryStore;
    use crate::timer::{Phase, TimerStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const T0: u64 = 1_700_000_000_000;

    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    impl NotificationSink for RecordingSink {
        fn notify(&self, title: &str, _body: &str, _icon: Option<&str>) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(title.to_string());
            Ok(())
        }
    }

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn notify(&self, _: &str, _: &str, _: Option<&str>) -> Result<(), NotifyError> {
            Err(NotifyError::Unavailable("permission denied".into()))
        }
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::QueryFailed("disk full".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::QueryFailed("disk full".into()))
        }
    }

    fn timer() -> SharedTimer<MemoryStore> {
        SharedTimer::open_at(MemoryStore::new(), Box::new(NullSink), Preset::default(), T0)
    }

    #[test]
    fn clones_share_one_snapshot() {
        let a = timer();
        let b = a.clone();
        a.toggle_at(T0);
        match b.snapshot_at(T0) {
            Event::StateSnapshot { status, .. } => assert_eq!(status, TimerStatus::Running),
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let timer = timer();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        timer.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        timer.toggle_at(T0);
        timer.toggle_at(T0 + 1_000);
        timer.reset_at(T0 + 2_000);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn no_op_mutations_do_not_notify() {
        let timer = timer();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        timer.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(timer.switch_engine_mode_at(EngineMode::Timer, T0).is_none());
        assert!(timer.start_custom_at(0, T0).is_none());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn completion_dispatches_one_alert() {
        let titles = Arc::new(Mutex::new(Vec::new()));
        let timer = SharedTimer::open_at(
            MemoryStore::new(),
            Box::new(RecordingSink(Arc::clone(&titles))),
            Preset::default(),
            T0,
        );
        timer.start_custom_at(1, T0);
        timer.tick_at(T0 + 61_000);
        timer.tick_at(T0 + 62_000);

        let titles = titles.lock().unwrap();
        assert_eq!(titles.len(), 1);
        assert!(titles[0].contains("complete"));
    }

    #[test]
    fn failed_alert_does_not_block_the_transition() {
        let timer = SharedTimer::open_at(
            MemoryStore::new(),
            Box::new(FailingSink),
            Preset::default(),
            T0,
        );
        timer.start_custom_at(1, T0);
        let event = timer.tick_at(T0 + 61_000);
        assert!(matches!(event, Some(Event::PhaseCompleted { .. })));
        match timer.snapshot_at(T0 + 61_000) {
            Event::StateSnapshot { status, phase, .. } => {
                assert_eq!(status, TimerStatus::Idle);
                assert_eq!(phase, Phase::Break);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn failed_persistence_does_not_block_the_mutation() {
        let timer =
            SharedTimer::open_at(BrokenStore, Box::new(NullSink), Preset::default(), T0);
        let event = timer.toggle_at(T0);
        assert!(matches!(event, Some(Event::TimerStarted { .. })));
    }
}
