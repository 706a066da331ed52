pub mod dashboard;
pub mod events;
pub mod ports;
pub mod query;
pub mod session;
