// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::catalog::{CatalogChange, CatalogStatus, CatalogStore};
use crate::ids::ActivityId;
use crate::model::{ActivityRow, ScreenPhase, ScreenView};
use crate::search::filter_activities;
use crate::selection::SelectionSet;

#[derive(Debug, Clone, Default)]
pub struct ScreenState {
    pub catalog: CatalogStore,
    pub query: String,
    /// Latches on the first search focus and stays set for the visit.
    pub search_active: bool,
    pub selection: SelectionSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenCommand {
    SetQuery(String),
    ClearQuery,
    FocusSearch,
    Toggle(ActivityId),
    Remove(ActivityId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    QueryChanged(String),
    SearchActivated,
    SelectionChanged(Vec<ActivityId>),
    CatalogLoaded { count: usize },
    CatalogFailed { error: String, attempts: u32 },
    LoadStarted { generation: u64 },
    Submitted { count: usize },
    SubmissionFailed { error: String },
    NavigatedForward { route: String },
    NavigatedBack,
}

impl ScreenEvent {
    pub fn from_catalog_change(change: CatalogChange) -> Option<Self> {
        match change {
            CatalogChange::Loaded { count } => Some(Self::CatalogLoaded { count }),
            CatalogChange::Failed { error, attempts } => {
                Some(Self::CatalogFailed { error, attempts })
            }
            CatalogChange::Ignored => None,
        }
    }
}

impl ScreenState {
    pub fn phase(&self) -> ScreenPhase {
        match self.catalog.status() {
            CatalogStatus::Loading => ScreenPhase::Loading,
            CatalogStatus::Ready => ScreenPhase::Ready,
            CatalogStatus::Failed { .. } => ScreenPhase::Failed,
        }
    }

    pub fn dispatch(&mut self, command: ScreenCommand) -> Vec<ScreenEvent> {
        match command {
            ScreenCommand::SetQuery(query) => self.set_query(query),
            ScreenCommand::ClearQuery => self.set_query(String::new()),
            ScreenCommand::FocusSearch => {
                if self.search_active {
                    return Vec::new();
                }
                self.search_active = true;
                vec![ScreenEvent::SearchActivated]
            }
            ScreenCommand::Toggle(id) => {
                if !self.catalog.is_ready() {
                    debug!(%id, "toggle ignored until the catalog is loaded");
                    return Vec::new();
                }
                if self.catalog.find(id).is_none() && !self.selection.contains(id) {
                    debug!(%id, "toggle ignored for unknown activity");
                    return Vec::new();
                }
                self.selection.toggle(id);
                vec![self.selection_changed()]
            }
            ScreenCommand::Remove(id) => {
                if self.selection.remove(id) {
                    vec![self.selection_changed()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn view(&self, keyboard_visible: bool) -> ScreenView {
        let rows = filter_activities(self.catalog.activities(), &self.query)
            .into_iter()
            .map(|activity| ActivityRow {
                activity: activity.clone(),
                selected: self.selection.contains(activity.id),
            })
            .collect::<Vec<_>>();
        let phase = self.phase();
        let load_error = match self.catalog.status() {
            CatalogStatus::Failed { error, .. } => Some(error.clone()),
            _ => None,
        };

        ScreenView {
            phase,
            load_error,
            has_query: !self.query.is_empty(),
            query: self.query.clone(),
            search_active: self.search_active,
            keyboard_visible,
            no_results: phase == ScreenPhase::Ready && rows.is_empty(),
            rows,
            pills: self.selection.pills(&self.catalog),
        }
    }

    fn set_query(&mut self, query: String) -> Vec<ScreenEvent> {
        if self.query == query {
            return Vec::new();
        }
        self.query = query;
        vec![ScreenEvent::QueryChanged(self.query.clone())]
    }

    fn selection_changed(&self) -> ScreenEvent {
        ScreenEvent::SelectionChanged(self.selection.ids().to_vec())
    }
}
