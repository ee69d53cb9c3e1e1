// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::ActivityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    #[serde(flatten)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl Activity {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id: ActivityId::new(id),
            title: title.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenPhase {
    Loading,
    Ready,
    Failed,
}

impl ScreenPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPill {
    pub id: ActivityId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRow {
    pub activity: Activity,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub phase: ScreenPhase,
    pub load_error: Option<String>,
    pub query: String,
    pub has_query: bool,
    pub search_active: bool,
    pub keyboard_visible: bool,
    pub rows: Vec<ActivityRow>,
    pub no_results: bool,
    pub pills: Vec<SelectionPill>,
}

impl ScreenView {
    pub const fn footer_visible(&self) -> bool {
        !self.keyboard_visible
    }
}
