// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use dayplan_app::{Activity, ActivityId, ActivitySource, Navigator, SelectionSink};
use std::sync::Arc;
use tracing::info;

const DEMO_ACTIVITIES: [&str; 12] = [
    "Hiking",
    "Museum Tour",
    "Beach Day",
    "Food Market",
    "Sunset Boat Trip",
    "Old Town Walking Tour",
    "Cooking Class",
    "Botanical Garden",
    "Street Art Walk",
    "Jazz Club Night",
    "Castle Visit",
    "Hot Springs",
];

#[derive(Debug, Clone, Default)]
pub struct DemoCatalog;

impl ActivitySource for DemoCatalog {
    fn fetch_activities(&self) -> Result<Vec<Activity>> {
        Ok(DEMO_ACTIVITIES
            .iter()
            .zip(1..)
            .map(|(title, id)| Activity::new(id, *title))
            .collect())
    }
}

#[derive(Debug, Clone)]
pub enum FlowRuntime {
    Demo,
    Api(dayplan_api::Client),
}

impl FlowRuntime {
    pub fn catalog_source(&self) -> Arc<dyn ActivitySource> {
        match self {
            Self::Demo => Arc::new(DemoCatalog),
            Self::Api(client) => Arc::new(client.clone()),
        }
    }
}

impl SelectionSink for FlowRuntime {
    fn submit_essential_activities(&self, ids: &[ActivityId]) -> Result<()> {
        match self {
            Self::Demo => {
                info!(?ids, "demo mode: essential activities accepted");
                Ok(())
            }
            Self::Api(client) => client.submit_essential_activities(ids),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Forward(String),
    Back,
}

#[derive(Debug, Clone, Default)]
pub struct ShellNavigator {
    exit: Option<Exit>,
}

impl ShellNavigator {
    pub fn exit(&self) -> Option<&Exit> {
        self.exit.as_ref()
    }
}

impl Navigator for ShellNavigator {
    fn go_forward(&mut self, route: &str) {
        self.exit = Some(Exit::Forward(route.to_owned()));
    }

    fn go_back(&mut self) {
        self.exit = Some(Exit::Back);
    }
}
