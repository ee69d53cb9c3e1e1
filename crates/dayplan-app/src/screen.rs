// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::catalog::LoadFailure;
use crate::keyboard::{KeyboardNotifier, KeyboardVisibilityTracker};
use crate::model::{Activity, ScreenPhase, ScreenView};
use crate::services::{ActivitySource, Navigator, SelectionSink};
use crate::state::{ScreenCommand, ScreenEvent, ScreenState};
use crate::submission::{DEFAULT_NEXT_ROUTE, SubmissionCoordinator, SubmissionOutcome};

pub const DEFAULT_MAX_LOAD_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_LOAD_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenOptions {
    pub next_route: String,
    pub load_policy: LoadPolicy,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            next_route: DEFAULT_NEXT_ROUTE.to_owned(),
            load_policy: LoadPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct LoadMessage {
    pub generation: u64,
    pub result: Result<Vec<Activity>, LoadFailure>,
}

pub struct ScreenController<S, N> {
    state: ScreenState,
    source: Arc<dyn ActivitySource>,
    sink: S,
    navigator: N,
    coordinator: SubmissionCoordinator,
    load_policy: LoadPolicy,
    keyboard: Option<KeyboardVisibilityTracker>,
    alive: Arc<AtomicBool>,
    tx: Sender<LoadMessage>,
    rx: Receiver<LoadMessage>,
}

impl<S, N> ScreenController<S, N>
where
    S: SelectionSink,
    N: Navigator,
{
    pub fn mount(
        source: Arc<dyn ActivitySource>,
        sink: S,
        navigator: N,
        keyboard: Arc<dyn KeyboardNotifier>,
        options: ScreenOptions,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut controller = Self {
            state: ScreenState::default(),
            source,
            sink,
            navigator,
            coordinator: SubmissionCoordinator::new(options.next_route),
            load_policy: options.load_policy,
            keyboard: Some(KeyboardVisibilityTracker::subscribe(keyboard)),
            alive: Arc::new(AtomicBool::new(true)),
            tx,
            rx,
        };
        controller.start_load();
        controller
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn phase(&self) -> ScreenPhase {
        self.state.phase()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn keyboard_visible(&self) -> bool {
        self.keyboard
            .as_ref()
            .is_some_and(KeyboardVisibilityTracker::is_visible)
    }

    pub fn view(&self) -> ScreenView {
        self.state.view(self.keyboard_visible())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn dispatch(&mut self, command: ScreenCommand) -> Vec<ScreenEvent> {
        if !self.is_alive() {
            debug!(?command, "screen already left; ignoring command");
            return Vec::new();
        }
        self.state.dispatch(command)
    }

    pub fn pump(&mut self) -> Vec<ScreenEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            events.extend(self.apply_load_message(message));
        }
        events
    }

    pub fn pump_blocking(&mut self, timeout: Duration) -> Vec<ScreenEvent> {
        let mut events = match self.rx.recv_timeout(timeout) {
            Ok(message) => self.apply_load_message(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Vec::new(),
        };
        events.extend(self.pump());
        events
    }

    pub fn retry_load(&mut self) -> Vec<ScreenEvent> {
        if !self.is_alive() || self.phase() != ScreenPhase::Failed {
            return Vec::new();
        }
        self.start_load()
    }

    pub fn advance(&mut self) -> Vec<ScreenEvent> {
        if !self.is_alive() || self.phase() != ScreenPhase::Ready {
            return Vec::new();
        }

        let outcome = self
            .coordinator
            .advance(&self.state.selection, &self.sink, &mut self.navigator);
        let mut events = Vec::new();
        match outcome {
            SubmissionOutcome::Skipped => {}
            SubmissionOutcome::Delivered { count } => {
                events.push(ScreenEvent::Submitted { count });
            }
            SubmissionOutcome::Failed { error } => {
                events.push(ScreenEvent::SubmissionFailed { error });
            }
        }
        events.push(ScreenEvent::NavigatedForward {
            route: self.coordinator.next_route().to_owned(),
        });
        self.teardown();
        events
    }

    pub fn back(&mut self) -> Vec<ScreenEvent> {
        if !self.is_alive() {
            return Vec::new();
        }
        self.coordinator.back(&mut self.navigator);
        self.teardown();
        vec![ScreenEvent::NavigatedBack]
    }

    /// Leaves the screen without navigating. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            debug!("activity selection screen torn down");
        }
        self.keyboard.take();
    }

    fn start_load(&mut self) -> Vec<ScreenEvent> {
        let Some(generation) = self.state.catalog.begin_load() else {
            return Vec::new();
        };

        let source = Arc::clone(&self.source);
        let alive = Arc::clone(&self.alive);
        let tx = self.tx.clone();
        let policy = self.load_policy;
        thread::spawn(move || {
            let result = fetch_with_retry(source.as_ref(), policy, &alive);
            if !alive.load(Ordering::SeqCst) {
                debug!(generation, "catalog fetch finished after teardown; discarding");
                return;
            }
            if tx.send(LoadMessage { generation, result }).is_err() {
                debug!(generation, "screen receiver gone; catalog result dropped");
            }
        });

        vec![ScreenEvent::LoadStarted { generation }]
    }

    fn apply_load_message(&mut self, message: LoadMessage) -> Vec<ScreenEvent> {
        if !self.is_alive() {
            return Vec::new();
        }
        let change = self
            .state
            .catalog
            .finish_load(message.generation, message.result);
        debug!(phase = self.phase().as_str(), "catalog load settled");
        ScreenEvent::from_catalog_change(change).into_iter().collect()
    }
}

impl<S, N> Drop for ScreenController<S, N> {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

fn fetch_with_retry(
    source: &dyn ActivitySource,
    policy: LoadPolicy,
    alive: &AtomicBool,
) -> Result<Vec<Activity>, LoadFailure> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;
    loop {
        attempts += 1;
        match source.fetch_activities() {
            Ok(activities) => return Ok(activities),
            Err(error) => {
                let error = format!("{error:#}");
                if attempts >= max_attempts || !alive.load(Ordering::SeqCst) {
                    return Err(LoadFailure { error, attempts });
                }
                warn!(%error, attempts, max_attempts, "catalog fetch failed; retrying");
                thread::sleep(policy.retry_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadPolicy, ScreenController, ScreenOptions, fetch_with_retry};
    use crate::ids::ActivityId;
    use crate::keyboard::{KeyboardHub, KeyboardNotice};
    use crate::model::{Activity, ScreenPhase};
    use crate::services::{ActivitySource, Navigator, SelectionSink};
    use crate::state::{ScreenCommand, ScreenEvent};
    use anyhow::{Result, bail};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    struct FlakySource {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakySource {
        fn failing(times: u32) -> Arc<Self> {
            Arc::new(Self {
                failures_left: AtomicU32::new(times),
                calls: AtomicU32::new(0),
            })
        }
    }

    impl ActivitySource for FlakySource {
        fn fetch_activities(&self) -> Result<Vec<Activity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                bail!("catalog offline");
            }
            Ok(vec![Activity::new(1, "Hiking"), Activity::new(2, "Museum Tour")])
        }
    }

    #[derive(Default)]
    struct Sink(Mutex<Vec<Vec<ActivityId>>>);

    impl SelectionSink for Sink {
        fn submit_essential_activities(&self, ids: &[ActivityId]) -> Result<()> {
            match self.0.lock() {
                Ok(mut calls) => calls.push(ids.to_vec()),
                Err(poisoned) => poisoned.into_inner().push(ids.to_vec()),
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Nav(Vec<String>);

    impl Navigator for Nav {
        fn go_forward(&mut self, route: &str) {
            self.0.push(route.to_owned());
        }

        fn go_back(&mut self) {
            self.0.push("<back>".to_owned());
        }
    }

    fn fast_options(max_attempts: u32) -> ScreenOptions {
        ScreenOptions {
            load_policy: LoadPolicy {
                max_attempts,
                retry_delay: Duration::from_millis(1),
            },
            ..ScreenOptions::default()
        }
    }

    fn mount(
        source: Arc<FlakySource>,
        hub: &Arc<KeyboardHub>,
        max_attempts: u32,
    ) -> ScreenController<Sink, Nav> {
        ScreenController::mount(
            source,
            Sink::default(),
            Nav::default(),
            hub.clone(),
            fast_options(max_attempts),
        )
    }

    #[test]
    fn fetch_retries_up_to_the_limit() {
        let source = FlakySource::failing(5);
        let alive = AtomicBool::new(true);
        let policy = LoadPolicy {
            max_attempts: 3,
            retry_delay: Duration::ZERO,
        };
        let failure = fetch_with_retry(source.as_ref(), policy, &alive)
            .expect_err("every attempt fails");
        assert_eq!(failure.attempts, 3);
        assert!(failure.error.contains("catalog offline"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn load_recovers_within_retry_budget() {
        let hub = Arc::new(KeyboardHub::new());
        let source = FlakySource::failing(2);
        let mut screen = mount(source.clone(), &hub, 3);
        assert_eq!(screen.phase(), ScreenPhase::Loading);

        let events = screen.pump_blocking(WAIT);
        assert_eq!(events, vec![ScreenEvent::CatalogLoaded { count: 2 }]);
        assert_eq!(screen.phase(), ScreenPhase::Ready);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn exhausted_load_fails_then_manual_retry_succeeds() {
        let hub = Arc::new(KeyboardHub::new());
        let source = FlakySource::failing(1);
        let mut screen = mount(source, &hub, 1);

        let events = screen.pump_blocking(WAIT);
        assert!(matches!(
            events.as_slice(),
            [ScreenEvent::CatalogFailed { attempts: 1, .. }]
        ));
        assert_eq!(screen.phase(), ScreenPhase::Failed);
        assert!(screen.view().load_error.is_some());
        assert!(screen.advance().is_empty());

        let started = screen.retry_load();
        assert!(matches!(
            started.as_slice(),
            [ScreenEvent::LoadStarted { generation: 2 }]
        ));
        assert!(screen.retry_load().is_empty());
        assert_eq!(
            screen.pump_blocking(WAIT),
            vec![ScreenEvent::CatalogLoaded { count: 2 }]
        );
    }

    #[test]
    fn keyboard_signal_reaches_view_and_is_released_on_exit() {
        let hub = Arc::new(KeyboardHub::new());
        let mut screen = mount(FlakySource::failing(0), &hub, 1);
        screen.pump_blocking(WAIT);
        assert_eq!(hub.listener_count(), 2);

        hub.emit(KeyboardNotice::Shown);
        assert!(screen.view().keyboard_visible);
        assert!(!screen.view().footer_visible());
        hub.emit(KeyboardNotice::Hidden);
        assert!(!screen.keyboard_visible());

        screen.back();
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(screen.navigator().0, vec!["<back>".to_owned()]);
        assert!(screen.back().is_empty());
    }

    #[test]
    fn advance_submits_in_order_and_ends_the_visit() {
        let hub = Arc::new(KeyboardHub::new());
        let mut screen = mount(FlakySource::failing(0), &hub, 1);
        screen.pump_blocking(WAIT);

        screen.dispatch(ScreenCommand::Toggle(ActivityId::new(2)));
        screen.dispatch(ScreenCommand::Toggle(ActivityId::new(1)));
        let events = screen.advance();
        assert_eq!(
            events,
            vec![
                ScreenEvent::Submitted { count: 2 },
                ScreenEvent::NavigatedForward {
                    route: "/pre-swipes".to_owned(),
                },
            ]
        );
        assert!(!screen.is_alive());
        assert_eq!(hub.listener_count(), 0);
        assert!(
            screen
                .dispatch(ScreenCommand::Toggle(ActivityId::new(1)))
                .is_empty()
        );
        assert!(screen.advance().is_empty());

        let calls = screen.sink().0.lock().map(|calls| calls.clone()).unwrap_or_default();
        assert_eq!(calls, vec![vec![ActivityId::new(2), ActivityId::new(1)]]);
    }

    #[test]
    fn late_fetch_result_is_discarded_after_teardown() {
        let hub = Arc::new(KeyboardHub::new());
        let mut screen = mount(FlakySource::failing(0), &hub, 1);
        screen.teardown();
        assert!(screen.pump_blocking(Duration::from_millis(200)).is_empty());
        assert_eq!(screen.phase(), ScreenPhase::Loading);
        assert!(screen.state().catalog.activities().is_empty());
    }
}
