// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod catalog;
pub mod ids;
pub mod keyboard;
pub mod model;
pub mod screen;
pub mod search;
pub mod selection;
pub mod services;
pub mod state;
pub mod submission;

pub use catalog::*;
pub use ids::*;
pub use keyboard::*;
pub use model::*;
pub use screen::*;
pub use search::*;
pub use selection::*;
pub use services::*;
pub use state::*;
pub use submission::*;
