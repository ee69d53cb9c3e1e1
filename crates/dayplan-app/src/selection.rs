// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::catalog::CatalogStore;
use crate::ids::ActivityId;
use crate::model::{Activity, SelectionPill};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<ActivityId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` if absent, otherwise removes it. Returns whether `id` is
    /// selected afterwards.
    pub fn toggle(&mut self, id: ActivityId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn remove(&mut self, id: ActivityId) -> bool {
        match self.ids.iter().position(|selected| *selected == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ActivityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[ActivityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn resolve<'a>(&self, catalog: &'a CatalogStore, id: ActivityId) -> Option<&'a Activity> {
        if !self.contains(id) {
            return None;
        }
        catalog.find(id)
    }

    pub fn pills(&self, catalog: &CatalogStore) -> Vec<SelectionPill> {
        self.ids
            .iter()
            .map(|id| SelectionPill {
                id: *id,
                label: catalog
                    .find(*id)
                    .map(|activity| activity.title.clone())
                    .unwrap_or_default(),
            })
            .collect()
    }
}
