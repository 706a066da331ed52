use async_trait::async_trait;

use crate::contract::{
    error::ClientError,
    model::{
        Appointment, AppointmentId, AppointmentInput, ClinicalRecord, ClinicalRecordId,
        ClinicalRecordInput, Patient, PatientId, PatientInput,
    },
};

/// Patient records on the remote API.
#[async_trait]
pub trait PatientsApi: Send + Sync {
    async fn list_patients(&self) -> Result<Vec<Patient>, ClientError>;

    async fn get_patient(&self, id: PatientId) -> Result<Patient, ClientError>;

    async fn create_patient(&self, input: &PatientInput) -> Result<Patient, ClientError>;

    async fn update_patient(
        &self,
        id: PatientId,
        input: &PatientInput,
    ) -> Result<Patient, ClientError>;

    async fn delete_patient(&self, id: PatientId) -> Result<(), ClientError>;

    /// Lookup by the human-friendly code (e.g. `GIN-001`).
    async fn find_patient_by_code(&self, code: &str) -> Result<Patient, ClientError>;

    /// Lookup by national ID.
    async fn find_patient_by_dni(&self, dni: &str) -> Result<Patient, ClientError>;

    /// Server-side substring match on the full name.
    async fn search_patients_by_name(&self, name: &str) -> Result<Vec<Patient>, ClientError>;
}

/// Appointment scheduling on the remote API.
#[async_trait]
pub trait AppointmentsApi: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError>;

    async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment, ClientError>;

    async fn create_appointment(
        &self,
        input: &AppointmentInput,
    ) -> Result<Appointment, ClientError>;

    async fn update_appointment(
        &self,
        id: AppointmentId,
        input: &AppointmentInput,
    ) -> Result<Appointment, ClientError>;

    async fn delete_appointment(&self, id: AppointmentId) -> Result<(), ClientError>;
}

/// Clinical visit history on the remote API.
#[async_trait]
pub trait ClinicalHistoryApi: Send + Sync {
    async fn list_records(&self) -> Result<Vec<ClinicalRecord>, ClientError>;

    async fn get_record(&self, id: ClinicalRecordId) -> Result<ClinicalRecord, ClientError>;

    async fn create_record(
        &self,
        input: &ClinicalRecordInput,
    ) -> Result<ClinicalRecord, ClientError>;

    async fn update_record(
        &self,
        id: ClinicalRecordId,
        input: &ClinicalRecordInput,
    ) -> Result<ClinicalRecord, ClientError>;

    async fn delete_record(&self, id: ClinicalRecordId) -> Result<(), ClientError>;

    async fn list_records_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ClinicalRecord>, ClientError>;
}
