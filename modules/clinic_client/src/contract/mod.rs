pub mod client;
pub mod datetime;
pub mod error;
pub mod model;

pub use client::{AppointmentsApi, ClinicalHistoryApi, PatientsApi};
pub use error::ClientError;
