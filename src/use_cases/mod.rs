// Use cases layer: application workflows for the match server.

pub mod game;
pub mod room;
pub mod types;

pub use room::{RoomError, RoomHandle, RoomRegistry, RoomSettings, TeamFeed};
pub use types::WorldSnapshot;
