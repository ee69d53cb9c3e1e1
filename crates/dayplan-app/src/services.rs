// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::ids::ActivityId;
use crate::model::Activity;

pub trait ActivitySource: Send + Sync {
    fn fetch_activities(&self) -> Result<Vec<Activity>>;
}

pub trait SelectionSink {
    fn submit_essential_activities(&self, ids: &[ActivityId]) -> Result<()>;
}

pub trait Navigator {
    fn go_forward(&mut self, route: &str);
    fn go_back(&mut self);
}
