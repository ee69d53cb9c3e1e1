// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use dayplan_app::{
    Activity, ActivityId, ActivitySource, KeyboardHub, KeyboardListener, KeyboardNotice,
    KeyboardNotifier, ListenerId, Navigator, SelectionSink,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

const ACTIVITY_NOUNS: [&str; 16] = [
    "Hike",
    "Museum Tour",
    "Beach Day",
    "Food Market",
    "Bike Ride",
    "Gallery Walk",
    "Boat Trip",
    "Cooking Class",
    "Wine Tasting",
    "Botanical Garden",
    "Climbing Gym",
    "Jazz Club",
    "Castle Visit",
    "Street Art Walk",
    "Hot Springs",
    "Night Market",
];

const ACTIVITY_ADJECTIVES: [&str; 10] = [
    "Sunrise", "Guided", "Old Town", "Harbor", "Evening", "Riverside", "Hidden", "Family",
    "Coastal", "Local",
];

const CATEGORIES: [&str; 6] = ["outdoors", "culture", "food", "nightlife", "wellness", "sport"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct ActivityFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl ActivityFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn activity(&mut self) -> Activity {
        let adjective = ACTIVITY_ADJECTIVES[self.rng.int_n(ACTIVITY_ADJECTIVES.len())];
        let noun = ACTIVITY_NOUNS[self.rng.int_n(ACTIVITY_NOUNS.len())];
        let category = CATEGORIES[self.rng.int_n(CATEGORIES.len())];
        let duration = 30 + 15 * self.rng.int_n(12) as i64;

        let mut activity = Activity::new(self.next_id, format!("{adjective} {noun}"));
        activity
            .details
            .insert("category".to_owned(), serde_json::json!(category));
        activity
            .details
            .insert("duration_minutes".to_owned(), serde_json::json!(duration));
        self.next_id += 1;
        activity
    }

    pub fn catalog(&mut self, count: usize) -> Vec<Activity> {
        (0..count).map(|_| self.activity()).collect()
    }
}

pub fn sample_catalog() -> Vec<Activity> {
    vec![
        Activity::new(1, "Hiking"),
        Activity::new(2, "Museum Tour"),
        Activity::new(3, "Beach Day"),
    ]
}

pub fn ids(values: &[i64]) -> Vec<ActivityId> {
    values.iter().copied().map(ActivityId::new).collect()
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<Activity>, String>>>,
    last: Mutex<Option<Result<Vec<Activity>, String>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Vec<Activity>, String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn ok(activities: Vec<Activity>) -> Arc<Self> {
        Self::new(vec![Ok(activities)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ActivitySource for ScriptedSource {
    fn fetch_activities(&self) -> Result<Vec<Activity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = lock(&self.script).pop_front();
        let entry = match next {
            Some(entry) => {
                *lock(&self.last) = Some(entry.clone());
                entry
            }
            None => lock(&self.last)
                .clone()
                .ok_or_else(|| anyhow!("scripted source has no results"))?,
        };
        entry.map_err(|message| anyhow!(message))
    }
}

#[derive(Debug)]
pub struct GatedSource {
    gate: Mutex<Receiver<Vec<Activity>>>,
}

impl GatedSource {
    pub fn pair() -> (Arc<Self>, Sender<Vec<Activity>>) {
        let (tx, rx) = mpsc::channel();
        (
            Arc::new(Self {
                gate: Mutex::new(rx),
            }),
            tx,
        )
    }
}

impl ActivitySource for GatedSource {
    fn fetch_activities(&self) -> Result<Vec<Activity>> {
        lock(&self.gate)
            .recv()
            .map_err(|_| anyhow!("gate closed before release"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<Vec<ActivityId>>>>,
    failure: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Arc::default(),
            failure: Some(message.to_owned()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ActivityId>> {
        lock(&self.calls).clone()
    }
}

impl SelectionSink for RecordingSink {
    fn submit_essential_activities(&self, ids: &[ActivityId]) -> Result<()> {
        lock(&self.calls).push(ids.to_vec());
        match &self.failure {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRecord {
    Forward(String),
    Back,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    log: Arc<Mutex<Vec<NavigationRecord>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<NavigationRecord> {
        lock(&self.log).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go_forward(&mut self, route: &str) {
        lock(&self.log).push(NavigationRecord::Forward(route.to_owned()));
    }

    fn go_back(&mut self) {
        lock(&self.log).push(NavigationRecord::Back);
    }
}

#[derive(Debug, Default)]
pub struct CountingKeyboard {
    hub: KeyboardHub,
    added: AtomicUsize,
    removed: AtomicUsize,
    missed_removals: AtomicUsize,
}

impl CountingKeyboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn emit(&self, notice: KeyboardNotice) -> usize {
        self.hub.emit(notice)
    }

    pub fn active(&self) -> usize {
        self.hub.listener_count()
    }

    pub fn added(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }

    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }

    pub fn missed_removals(&self) -> usize {
        self.missed_removals.load(Ordering::SeqCst)
    }
}

impl KeyboardNotifier for CountingKeyboard {
    fn add_listener(&self, notice: KeyboardNotice, listener: KeyboardListener) -> ListenerId {
        self.added.fetch_add(1, Ordering::SeqCst);
        self.hub.add_listener(notice, listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.hub.remove_listener(id);
        if removed {
            self.removed.fetch_add(1, Ordering::SeqCst);
        } else {
            self.missed_removals.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }
}
