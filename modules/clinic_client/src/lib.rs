// === PUBLIC CONTRACT ===
// Models, errors and the per-entity API traits consumers program against.
pub mod contract;

pub use contract::{client, error, model};

// === WIRING ===
pub mod config;
pub mod module;
pub use config::ClientConfig;
pub use module::ClinicClient;

// === IMPLEMENTATION ===
// Public so binaries and integration tests can compose their own stacks
// (custom storage, recording event publishers, preconfigured reqwest clients).
pub mod domain;
pub mod gateways;
pub mod infra;
