// DriveDesk services
// Stateless-ish helpers the shell consults at startup.

pub mod settings_engine;
