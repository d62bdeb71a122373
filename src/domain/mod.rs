// Simulation core. Nothing in here touches tokio, axum, or the wire format;
// the world is a synchronous state machine driven by the match task.

pub mod buffs;
pub mod content;
pub mod entities;
pub mod math;
pub mod pathfind;
pub mod store;
pub mod systems;
pub mod world;
