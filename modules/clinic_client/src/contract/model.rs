//! Typed records exchanged with the clinic API.
//!
//! Field names follow the server's JSON (`nombreCompleto`, `fechaHora`, ...)
//! through explicit renames; unknown response fields are ignored.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::contract::datetime;
use crate::contract::error::ClientError;

pub type PatientId = i64;
pub type AppointmentId = i64;
pub type ClinicalRecordId = i64;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Medico,
    Admin,
    Recepcionista,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Medico, Role::Admin, Role::Recepcionista];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Medico => "MEDICO",
            Role::Admin => "ADMIN",
            Role::Recepcionista => "RECEPCIONISTA",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::validation("rol", format!("unknown role '{}'", s)))
    }
}

/// Identity of the logged-in staff member, persisted as `currentUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(rename = "rol")]
    pub role: Role,
}

/// Authenticated context: bearer token plus identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(rename = "rol")]
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(rename = "rol")]
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    #[serde(rename = "nombreCompleto", default, deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(rename = "dni", default, deserialize_with = "null_as_empty")]
    pub national_id: String,
    #[serde(rename = "codigoFacil", default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(rename = "fechaNacimiento", default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "semanasGestacion", default)]
    pub gestation_weeks: Option<u32>,
    #[serde(rename = "fechaUltimaMenstruacion", default)]
    pub last_menstruation: Option<NaiveDate>,
    #[serde(rename = "grupoSanguineo", default)]
    pub blood_type: Option<String>,
    #[serde(rename = "alergias", default)]
    pub allergies: Option<String>,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
    #[serde(rename = "fechaRegistro", default, with = "datetime::optional")]
    pub registered_at: Option<NaiveDateTime>,
}

impl Patient {
    pub fn is_pregnant(&self) -> bool {
        self.gestation_weeks.is_some_and(|w| w > 0)
    }
}

/// Create/update payload for a patient. Blank optional fields go out as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PatientInput {
    #[serde(rename = "nombreCompleto")]
    pub full_name: String,
    #[serde(rename = "dni")]
    pub national_id: String,
    #[serde(rename = "codigoFacil")]
    pub code: String,
    #[serde(rename = "fechaNacimiento")]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    #[serde(rename = "semanasGestacion")]
    pub gestation_weeks: Option<u32>,
    #[serde(rename = "fechaUltimaMenstruacion")]
    pub last_menstruation: Option<NaiveDate>,
    #[serde(rename = "grupoSanguineo")]
    pub blood_type: Option<String>,
    #[serde(rename = "alergias")]
    pub allergies: Option<String>,
    #[serde(rename = "observaciones")]
    pub notes: Option<String>,
}

impl PatientInput {
    pub fn new(
        full_name: impl Into<String>,
        national_id: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            national_id: national_id.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    /// Trim required fields and turn blank optional text into `None`.
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.national_id = self.national_id.trim().to_string();
        self.code = self.code.trim().to_string();
        for field in [
            &mut self.phone,
            &mut self.email,
            &mut self.address,
            &mut self.blood_type,
            &mut self.allergies,
            &mut self.notes,
        ] {
            blank_to_none(field);
        }
        self
    }

    /// Full name, national ID and code are mandatory.
    pub fn validate(&self) -> Result<(), ClientError> {
        require("nombreCompleto", &self.full_name)?;
        require("dni", &self.national_id)?;
        require("codigoFacil", &self.code)?;
        Ok(())
    }
}

impl From<&Patient> for PatientInput {
    fn from(p: &Patient) -> Self {
        Self {
            full_name: p.full_name.clone(),
            national_id: p.national_id.clone(),
            code: p.code.clone(),
            birth_date: p.birth_date,
            phone: p.phone.clone(),
            email: p.email.clone(),
            address: p.address.clone(),
            gestation_weeks: p.gestation_weeks,
            last_menstruation: p.last_menstruation,
            blood_type: p.blood_type.clone(),
            allergies: p.allergies.clone(),
            notes: p.notes.clone(),
        }
    }
}

/// Weak back-reference to a patient. Outgoing payloads carry only the id;
/// responses may echo the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRef {
    pub id: PatientId,
    #[serde(
        rename = "nombreCompleto",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub full_name: Option<String>,
}

impl PatientRef {
    pub fn id(id: PatientId) -> Self {
        Self {
            id,
            full_name: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Programada,
    Confirmada,
    Cancelada,
    Completada,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Programada,
        AppointmentStatus::Confirmada,
        AppointmentStatus::Cancelada,
        AppointmentStatus::Completada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Programada => "PROGRAMADA",
            AppointmentStatus::Confirmada => "CONFIRMADA",
            AppointmentStatus::Cancelada => "CANCELADA",
            AppointmentStatus::Completada => "COMPLETADA",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::validation("estado", format!("unknown status '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(rename = "paciente", default)]
    pub patient: Option<PatientRef>,
    #[serde(rename = "fechaHora", with = "datetime::required")]
    pub scheduled_at: NaiveDateTime,
    #[serde(rename = "motivo", default)]
    pub reason: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: AppointmentStatus,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
}

impl Appointment {
    pub fn patient_id(&self) -> Option<PatientId> {
        self.patient.as_ref().map(|p| p.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentInput {
    #[serde(rename = "paciente")]
    pub patient: PatientRef,
    #[serde(rename = "fechaHora", with = "datetime::required")]
    pub scheduled_at: NaiveDateTime,
    #[serde(rename = "motivo")]
    pub reason: Option<String>,
    #[serde(rename = "estado")]
    pub status: AppointmentStatus,
    #[serde(rename = "observaciones")]
    pub notes: Option<String>,
}

impl AppointmentInput {
    pub fn new(patient_id: PatientId, scheduled_at: NaiveDateTime) -> Self {
        Self {
            patient: PatientRef::id(patient_id),
            scheduled_at,
            reason: None,
            status: AppointmentStatus::default(),
            notes: None,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.patient.full_name = None;
        blank_to_none(&mut self.reason);
        blank_to_none(&mut self.notes);
        self
    }

    /// Owning patient is mandatory; the date-time is enforced by the type.
    pub fn validate(&self) -> Result<(), ClientError> {
        require_patient(self.patient.id)
    }

    /// Rebuild the payload of an existing appointment, e.g. to change its status.
    pub fn from_existing(a: &Appointment) -> Result<Self, ClientError> {
        let patient_id = a
            .patient_id()
            .ok_or_else(|| ClientError::validation("paciente", "appointment has no patient"))?;
        Ok(Self {
            patient: PatientRef::id(patient_id),
            scheduled_at: a.scheduled_at,
            reason: a.reason.clone(),
            status: a.status,
            notes: a.notes.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Clinical history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub id: ClinicalRecordId,
    #[serde(rename = "paciente", default)]
    pub patient: Option<PatientRef>,
    #[serde(rename = "fechaConsulta", default, with = "datetime::optional")]
    pub consulted_at: Option<NaiveDateTime>,
    #[serde(rename = "semanasGestacion", default)]
    pub gestation_weeks: Option<u32>,
    #[serde(rename = "peso", default)]
    pub weight: Option<f64>,
    #[serde(rename = "presionArterial", default)]
    pub blood_pressure: Option<String>,
    #[serde(rename = "sintomas", default)]
    pub symptoms: Option<String>,
    #[serde(rename = "diagnostico", default)]
    pub diagnosis: Option<String>,
    #[serde(rename = "tratamiento", default)]
    pub treatment: Option<String>,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
}

impl ClinicalRecord {
    pub fn patient_id(&self) -> Option<PatientId> {
        self.patient.as_ref().map(|p| p.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalRecordInput {
    #[serde(rename = "paciente")]
    pub patient: PatientRef,
    #[serde(rename = "semanasGestacion")]
    pub gestation_weeks: Option<u32>,
    #[serde(rename = "peso")]
    pub weight: Option<f64>,
    #[serde(rename = "presionArterial")]
    pub blood_pressure: Option<String>,
    #[serde(rename = "sintomas")]
    pub symptoms: Option<String>,
    #[serde(rename = "diagnostico")]
    pub diagnosis: Option<String>,
    #[serde(rename = "tratamiento")]
    pub treatment: Option<String>,
    #[serde(rename = "observaciones")]
    pub notes: Option<String>,
}

impl ClinicalRecordInput {
    pub fn new(patient_id: PatientId) -> Self {
        Self {
            patient: PatientRef::id(patient_id),
            gestation_weeks: None,
            weight: None,
            blood_pressure: None,
            symptoms: None,
            diagnosis: None,
            treatment: None,
            notes: None,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.patient.full_name = None;
        for field in [
            &mut self.blood_pressure,
            &mut self.symptoms,
            &mut self.diagnosis,
            &mut self.treatment,
            &mut self.notes,
        ] {
            blank_to_none(field);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        require_patient(self.patient.id)?;
        match self.weight {
            Some(w) if !(w.is_finite() && w > 0.0) => {
                Err(ClientError::validation("peso", "weight must be a positive number"))
            }
            _ => Ok(()),
        }
    }

    pub fn from_existing(r: &ClinicalRecord) -> Result<Self, ClientError> {
        let patient_id = r
            .patient_id()
            .ok_or_else(|| ClientError::validation("paciente", "record has no patient"))?;
        Ok(Self {
            patient: PatientRef::id(patient_id),
            gestation_weeks: r.gestation_weeks,
            weight: r.weight,
            blood_pressure: r.blood_pressure.clone(),
            symptoms: r.symptoms.clone(),
            diagnosis: r.diagnosis.clone(),
            treatment: r.treatment.clone(),
            notes: r.notes.clone(),
        })
    }
}

// ---------------------------------------------------------------------------

/// Older rows may hold null in columns that are required today.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_to_none(field: &mut Option<String>) {
    if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *field = None;
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::validation(field, "is required"));
    }
    Ok(())
}

fn require_patient(id: PatientId) -> Result<(), ClientError> {
    if id <= 0 {
        return Err(ClientError::validation("paciente", "a patient must be selected"));
    }
    Ok(())
}
