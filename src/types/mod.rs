// DriveDesk shared types
// Plain data carried between the managers, the engines and the UI layer.

pub mod download;
pub mod errors;
pub mod events;
pub mod ipc;
pub mod navigation;
pub mod settings;
pub mod snapshot;
pub mod tab;
