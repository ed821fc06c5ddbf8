//! Procedural bathroom-showroom walkthrough.
//!
//! A room description is resolved once into a `ScenePlan` (`engine`), a
//! time-looped `Scheduler` turns the clock into camera poses and scripted
//! events every frame (`scheduler`), and any `RenderBackend` can present the
//! result (`renderer`, `player`).

pub mod engine;
pub mod player;
pub mod renderer;
pub mod scheduler;
pub mod types;
