//! Subcommand handlers. Each one calls into the client and prints the result.

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand};
use clinic_client::client::{AppointmentsApi, ClinicalHistoryApi, PatientsApi};
use clinic_client::contract::datetime;
use clinic_client::domain::query::{
    filter_patients, select_appointments, sort_history_newest_first, AppointmentWindow,
};
use clinic_client::error::ClientError;
use clinic_client::model::{
    AppointmentId, AppointmentInput, AppointmentStatus, ClinicalRecordId, ClinicalRecordInput,
    PatientId, PatientInput, Role,
};
use clinic_client::ClinicClient;
use serde_json::json;
use tracing::debug;

use crate::output::{print_deleted, print_json};

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    datetime::parse(raw).map_err(|e| format!("expected YYYY-MM-DDTHH:MM[:SS] ({e})"))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub async fn login(client: &ClinicClient, username: &str, password: Option<&str>) -> Result<()> {
    let password =
        password.ok_or_else(|| anyhow!("Password required: pass --password or set CLINIC_PASSWORD"))?;

    match client.session().login(username, password).await {
        Ok(user) => {
            println!("Logged in as {} ({})", user.username, user.role);
            Ok(())
        }
        // Rejected credentials get a single coarse message.
        Err(ClientError::SessionExpired) | Err(ClientError::Api { status: 400..=499, .. }) => {
            Err(anyhow!("Invalid credentials"))
        }
        Err(e) => Err(anyhow::Error::new(e).context("Login failed")),
    }
}

pub async fn register(
    client: &ClinicClient,
    username: &str,
    password: &str,
    role: Role,
) -> Result<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(anyhow!("Username and password are required"));
    }
    client
        .session()
        .register(username.trim(), password, role)
        .await?;
    println!("Registered {} as {}", username.trim(), role);
    Ok(())
}

pub fn logout(client: &ClinicClient) -> Result<()> {
    client.session().logout();
    println!("Logged out");
    Ok(())
}

pub fn whoami(client: &ClinicClient) -> Result<()> {
    let session = client.session();
    print_json(&json!({
        "authenticated": session.is_authenticated(),
        "user": session.current_user(),
    }))
}

/// Data commands need a session before touching the API.
fn require_session(client: &ClinicClient) -> Result<()> {
    if client.session().is_authenticated() {
        Ok(())
    } else {
        Err(ClientError::SessionExpired.into())
    }
}

pub async fn dashboard(client: &ClinicClient) -> Result<()> {
    require_session(client)?;
    let summary = client.dashboard(now()).await?;
    print_json(&summary)
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PatientsCmd {
    /// List patients, optionally filtered by name, DNI or code
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one patient
    Get { id: PatientId },
    /// Find a patient by code (e.g. GIN-001)
    ByCode { code: String },
    /// Find a patient by DNI
    ByDni { dni: String },
    /// Server-side search by name
    Search { name: String },
    /// Register a patient
    Create(PatientFields),
    /// Edit a patient; only the given fields change
    Update {
        id: PatientId,
        #[command(flatten)]
        fields: PatientFields,
    },
    /// Delete a patient
    Delete { id: PatientId },
}

#[derive(Args, Debug, Default)]
pub struct PatientFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub dni: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub birth_date: Option<NaiveDate>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub gestation_weeks: Option<u32>,
    /// Last menstrual period, YYYY-MM-DD
    #[arg(long)]
    pub last_menstruation: Option<NaiveDate>,
    #[arg(long)]
    pub blood_type: Option<String>,
    #[arg(long)]
    pub allergies: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl PatientFields {
    fn apply(self, input: &mut PatientInput) {
        overlay(&mut input.full_name, self.name);
        overlay(&mut input.national_id, self.dni);
        overlay(&mut input.code, self.code);
        overlay_opt(&mut input.birth_date, self.birth_date);
        overlay_opt(&mut input.phone, self.phone);
        overlay_opt(&mut input.email, self.email);
        overlay_opt(&mut input.address, self.address);
        overlay_opt(&mut input.gestation_weeks, self.gestation_weeks);
        overlay_opt(&mut input.last_menstruation, self.last_menstruation);
        overlay_opt(&mut input.blood_type, self.blood_type);
        overlay_opt(&mut input.allergies, self.allergies);
        overlay_opt(&mut input.notes, self.notes);
    }
}

pub async fn patients(client: &ClinicClient, cmd: PatientsCmd) -> Result<()> {
    require_session(client)?;
    let api = client.patients();

    match cmd {
        PatientsCmd::List { search } => {
            let all = api.list_patients().await?;
            let shown = filter_patients(&all, search.as_deref().unwrap_or_default());
            debug!(total = all.len(), shown = shown.len(), "patients listed");
            print_json(&shown)
        }
        PatientsCmd::Get { id } => print_json(&api.get_patient(id).await?),
        PatientsCmd::ByCode { code } => print_json(&api.find_patient_by_code(&code).await?),
        PatientsCmd::ByDni { dni } => print_json(&api.find_patient_by_dni(&dni).await?),
        PatientsCmd::Search { name } => print_json(&api.search_patients_by_name(&name).await?),
        PatientsCmd::Create(fields) => {
            let mut input = PatientInput::default();
            fields.apply(&mut input);
            let input = input.normalized();
            input.validate()?;
            print_json(&api.create_patient(&input).await?)
        }
        PatientsCmd::Update { id, fields } => {
            let current = api.get_patient(id).await?;
            let mut input = PatientInput::from(&current);
            fields.apply(&mut input);
            let input = input.normalized();
            input.validate()?;
            print_json(&api.update_patient(id, &input).await?)
        }
        PatientsCmd::Delete { id } => {
            api.delete_patient(id).await?;
            print_deleted("patient", id);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum AppointmentsCmd {
    /// List appointments, earliest first
    List {
        /// all, upcoming or past
        #[arg(short, long, default_value = "all")]
        window: AppointmentWindow,
    },
    /// Show one appointment
    Get { id: AppointmentId },
    /// Schedule an appointment (requires --patient and --at)
    Create(AppointmentFields),
    /// Edit an appointment; only the given fields change
    Update {
        id: AppointmentId,
        #[command(flatten)]
        fields: AppointmentFields,
    },
    /// Delete an appointment
    Delete { id: AppointmentId },
}

#[derive(Args, Debug, Default)]
pub struct AppointmentFields {
    /// Patient id
    #[arg(long)]
    pub patient: Option<PatientId>,
    /// YYYY-MM-DDTHH:MM
    #[arg(long, value_parser = parse_datetime)]
    pub at: Option<NaiveDateTime>,
    #[arg(long)]
    pub reason: Option<String>,
    /// PROGRAMADA, CONFIRMADA, CANCELADA or COMPLETADA
    #[arg(long)]
    pub status: Option<AppointmentStatus>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl AppointmentFields {
    fn apply(self, input: &mut AppointmentInput) {
        if let Some(id) = self.patient {
            input.patient.id = id;
        }
        overlay(&mut input.scheduled_at, self.at);
        overlay(&mut input.status, self.status);
        overlay_opt(&mut input.reason, self.reason);
        overlay_opt(&mut input.notes, self.notes);
    }
}

pub async fn appointments(client: &ClinicClient, cmd: AppointmentsCmd) -> Result<()> {
    require_session(client)?;
    let api = client.appointments();

    match cmd {
        AppointmentsCmd::List { window } => {
            let all = api.list_appointments().await?;
            print_json(&select_appointments(&all, window, now()))
        }
        AppointmentsCmd::Get { id } => print_json(&api.get_appointment(id).await?),
        AppointmentsCmd::Create(fields) => {
            let patient = fields.patient.unwrap_or_default();
            let at = fields
                .at
                .ok_or_else(|| ClientError::validation("fechaHora", "is required"))?;
            let mut input = AppointmentInput::new(patient, at);
            fields.apply(&mut input);
            let input = input.normalized();
            input.validate()?;
            print_json(&api.create_appointment(&input).await?)
        }
        AppointmentsCmd::Update { id, fields } => {
            let current = api.get_appointment(id).await?;
            let mut input = AppointmentInput::from_existing(&current)?;
            fields.apply(&mut input);
            let input = input.normalized();
            input.validate()?;
            print_json(&api.update_appointment(id, &input).await?)
        }
        AppointmentsCmd::Delete { id } => {
            api.delete_appointment(id).await?;
            print_deleted("appointment", id);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Clinical history
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum HistoryCmd {
    /// List consultations, newest first
    List {
        /// Only this patient's records
        #[arg(short, long)]
        patient: Option<PatientId>,
    },
    /// Show one consultation
    Get { id: ClinicalRecordId },
    /// Log a consultation (requires --patient)
    Create(RecordFields),
    /// Edit a consultation; only the given fields change
    Update {
        id: ClinicalRecordId,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Delete a consultation
    Delete { id: ClinicalRecordId },
}

#[derive(Args, Debug, Default)]
pub struct RecordFields {
    /// Patient id
    #[arg(long)]
    pub patient: Option<PatientId>,
    #[arg(long)]
    pub gestation_weeks: Option<u32>,
    /// Weight in kg
    #[arg(long)]
    pub weight: Option<f64>,
    /// e.g. 110/70
    #[arg(long)]
    pub blood_pressure: Option<String>,
    #[arg(long)]
    pub symptoms: Option<String>,
    #[arg(long)]
    pub diagnosis: Option<String>,
    #[arg(long)]
    pub treatment: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl RecordFields {
    fn apply(self, input: &mut ClinicalRecordInput) {
        if let Some(id) = self.patient {
            input.patient.id = id;
        }
        overlay_opt(&mut input.gestation_weeks, self.gestation_weeks);
        overlay_opt(&mut input.weight, self.weight);
        overlay_opt(&mut input.blood_pressure, self.blood_pressure);
        overlay_opt(&mut input.symptoms, self.symptoms);
        overlay_opt(&mut input.diagnosis, self.diagnosis);
        overlay_opt(&mut input.treatment, self.treatment);
        overlay_opt(&mut input.notes, self.notes);
    }
}

pub async fn history(client: &ClinicClient, cmd: HistoryCmd) -> Result<()> {
    require_session(client)?;
    let api = client.history();

    match cmd {
        HistoryCmd::List { patient } => {
            let mut records = match patient {
                Some(id) => api
                    .list_records_for_patient(id)
                    .await
                    .with_context(|| format!("Failed to load history of patient {id}"))?,
                None => api.list_records().await?,
            };
            sort_history_newest_first(&mut records);
            print_json(&records)
        }
        HistoryCmd::Get { id } => print_json(&api.get_record(id).await?),
        HistoryCmd::Create(fields) => {
            let mut input = ClinicalRecordInput::new(fields.patient.unwrap_or_default());
            fields.apply(&mut input);
            let input = input.normalized();
            input.validate()?;
            print_json(&api.create_record(&input).await?)
        }
        HistoryCmd::Update { id, fields } => {
            let current = api.get_record(id).await?;
            let mut input = ClinicalRecordInput::from_existing(&current)?;
            fields.apply(&mut input);
            let input = input.normalized();
            input.validate()?;
            print_json(&api.update_record(id, &input).await?)
        }
        HistoryCmd::Delete { id } => {
            api.delete_record(id).await?;
            print_deleted("record", id);
            Ok(())
        }
    }
}

fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn overlay_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_fields_overlay_only_what_was_given() {
        let mut input = PatientInput {
            phone: Some("999".into()),
            ..PatientInput::new("Ana", "1", "GIN-1")
        };
        PatientFields {
            name: Some("Ana Quispe".into()),
            gestation_weeks: Some(12),
            ..Default::default()
        }
        .apply(&mut input);

        assert_eq!(input.full_name, "Ana Quispe");
        assert_eq!(input.national_id, "1");
        assert_eq!(input.phone.as_deref(), Some("999"));
        assert_eq!(input.gestation_weeks, Some(12));
    }

    #[test]
    fn appointment_fields_can_change_status_and_time() {
        let at = parse_datetime("2025-06-02T10:00").unwrap();
        let mut input = AppointmentInput::new(3, at);
        AppointmentFields {
            at: Some(parse_datetime("2025-06-03 11:30").unwrap()),
            status: Some(AppointmentStatus::Cancelada),
            ..Default::default()
        }
        .apply(&mut input);

        assert_eq!(input.patient.id, 3);
        assert_eq!(input.status, AppointmentStatus::Cancelada);
        assert_eq!(datetime::format(&input.scheduled_at), "2025-06-03T11:30:00");
    }

    #[test]
    fn missing_patient_on_record_fails_validation() {
        let mut input = ClinicalRecordInput::new(0);
        RecordFields {
            weight: Some(60.0),
            ..Default::default()
        }
        .apply(&mut input);
        assert!(input.validate().is_err());
    }

    #[test]
    fn bad_datetime_is_explained() {
        let err = parse_datetime("mañana").unwrap_err();
        assert!(err.contains("YYYY-MM-DD"));
    }
}
