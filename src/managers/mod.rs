// DriveDesk state managers
// Managers own the observable state: tabs and their navigation lifecycle,
// downloads and the registry of live transfers.

pub mod download_manager;
pub mod navigation_controller;
pub mod response_policy;
pub mod session_registry;
pub mod tab_manager;
