// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, warn};

use crate::ids::ActivityId;
use crate::model::Activity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    Failed { error: String, attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogChange {
    Loaded { count: usize },
    Failed { error: String, attempts: u32 },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub error: String,
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct CatalogStore {
    activities: Vec<Activity>,
    status: CatalogStatus,
    generation: u64,
    in_flight: bool,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            activities: Vec::new(),
            status: CatalogStatus::Loading,
            generation: 0,
            in_flight: false,
        }
    }

    pub fn status(&self) -> &CatalogStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == CatalogStatus::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.status == CatalogStatus::Ready
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn find(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == id)
    }

    /// Marks a new load as started and returns its generation, or `None` when
    /// the catalog is already loaded or a load is still in flight.
    pub fn begin_load(&mut self) -> Option<u64> {
        if self.is_ready() || self.in_flight {
            return None;
        }
        self.generation = self.generation.saturating_add(1);
        self.in_flight = true;
        self.status = CatalogStatus::Loading;
        debug!(generation = self.generation, "catalog load started");
        Some(self.generation)
    }

    pub fn finish_load(
        &mut self,
        generation: u64,
        result: Result<Vec<Activity>, LoadFailure>,
    ) -> CatalogChange {
        if generation != self.generation || !self.in_flight {
            debug!(
                generation,
                current = self.generation,
                "dropping stale catalog result"
            );
            return CatalogChange::Ignored;
        }
        self.in_flight = false;

        match result {
            Ok(activities) => {
                let count = activities.len();
                self.activities = activities;
                self.status = CatalogStatus::Ready;
                debug!(count, "catalog loaded");
                CatalogChange::Loaded { count }
            }
            Err(LoadFailure { error, attempts }) => {
                warn!(%error, attempts, "catalog load failed");
                self.status = CatalogStatus::Failed {
                    error: error.clone(),
                    attempts,
                };
                CatalogChange::Failed { error, attempts }
            }
        }
    }
}
