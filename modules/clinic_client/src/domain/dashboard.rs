use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::contract::client::{AppointmentsApi, ClinicalHistoryApi, PatientsApi};
use crate::contract::error::ClientError;
use crate::contract::model::{Appointment, ClinicalRecord, Patient};
use crate::domain::query::{select_appointments, AppointmentWindow};

pub const UPCOMING_LIMIT: usize = 5;
pub const RECENT_PATIENTS_LIMIT: usize = 6;

/// Front-page overview of the clinic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_patients: usize,
    pub total_appointments: usize,
    pub pregnant_patients: usize,
    pub total_consultations: usize,
    /// Next appointments, earliest first.
    pub upcoming: Vec<Appointment>,
    /// Most recently listed patients, newest first.
    pub recent_patients: Vec<Patient>,
}

impl DashboardSummary {
    pub fn compute(
        patients: &[Patient],
        appointments: &[Appointment],
        history: &[ClinicalRecord],
        now: NaiveDateTime,
    ) -> Self {
        let mut upcoming = select_appointments(appointments, AppointmentWindow::Upcoming, now);
        upcoming.truncate(UPCOMING_LIMIT);

        Self {
            total_patients: patients.len(),
            total_appointments: appointments.len(),
            pregnant_patients: patients.iter().filter(|p| p.is_pregnant()).count(),
            total_consultations: history.len(),
            upcoming,
            recent_patients: patients
                .iter()
                .rev()
                .take(RECENT_PATIENTS_LIMIT)
                .cloned()
                .collect(),
        }
    }
}

/// Fetch the three lists concurrently and summarise them.
///
/// Patients are mandatory. Appointments and history are best-effort: a
/// recoverable failure yields an empty list, session expiry still propagates.
#[instrument(name = "clinic_client.dashboard.load", skip_all)]
pub async fn load_dashboard(
    patients: &dyn PatientsApi,
    appointments: &dyn AppointmentsApi,
    history: &dyn ClinicalHistoryApi,
    now: NaiveDateTime,
) -> Result<DashboardSummary, ClientError> {
    let (p, a, h) = tokio::join!(
        patients.list_patients(),
        appointments.list_appointments(),
        history.list_records(),
    );

    let patients = p?;
    let appointments = best_effort("appointments", a)?;
    let history = best_effort("history", h)?;

    Ok(DashboardSummary::compute(
        &patients,
        &appointments,
        &history,
        now,
    ))
}

fn best_effort<T>(what: &str, result: Result<Vec<T>, ClientError>) -> Result<Vec<T>, ClientError> {
    match result {
        Ok(items) => Ok(items),
        Err(e) if e.is_recoverable() => {
            warn!("Could not load {} for dashboard (showing none): {}", what, e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
