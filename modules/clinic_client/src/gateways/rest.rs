use async_trait::async_trait;
use tracing::instrument;
use urlencoding::encode;

use crate::contract::{
    client::{AppointmentsApi, ClinicalHistoryApi, PatientsApi},
    error::ClientError,
    model::{
        Appointment, AppointmentId, AppointmentInput, ClinicalRecord, ClinicalRecordId,
        ClinicalRecordInput, LoginRequest, LoginResponse, Patient, PatientId, PatientInput,
        RegisterRequest, Role,
    },
};
use crate::domain::ports::AuthPort;
use crate::infra::http::ApiClient;

/// REST implementation of every domain API, routed through the access layer.
#[derive(Clone)]
pub struct RestGateway {
    api: ApiClient,
}

impl RestGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl AuthPort for RestGateway {
    #[instrument(name = "clinic_client.rest.auth.login", skip_all, fields(username = %username))]
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        self.api
            .post("/auth/login", &LoginRequest { username, password })
            .await
    }

    #[instrument(name = "clinic_client.rest.auth.register", skip_all, fields(username = %username, role = %role))]
    async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<(), ClientError> {
        self.api
            .post_discard(
                "/auth/registro",
                &RegisterRequest {
                    username,
                    password,
                    role,
                },
            )
            .await
    }
}

#[async_trait]
impl PatientsApi for RestGateway {
    #[instrument(name = "clinic_client.rest.patients.list", skip(self))]
    async fn list_patients(&self) -> Result<Vec<Patient>, ClientError> {
        self.api.get("/pacientes").await
    }

    #[instrument(name = "clinic_client.rest.patients.get", skip(self))]
    async fn get_patient(&self, id: PatientId) -> Result<Patient, ClientError> {
        self.api.get(&format!("/pacientes/{}", id)).await
    }

    #[instrument(name = "clinic_client.rest.patients.create", skip_all, fields(code = %input.code))]
    async fn create_patient(&self, input: &PatientInput) -> Result<Patient, ClientError> {
        self.api.post("/pacientes", input).await
    }

    #[instrument(name = "clinic_client.rest.patients.update", skip(self, input))]
    async fn update_patient(
        &self,
        id: PatientId,
        input: &PatientInput,
    ) -> Result<Patient, ClientError> {
        self.api.put(&format!("/pacientes/{}", id), input).await
    }

    #[instrument(name = "clinic_client.rest.patients.delete", skip(self))]
    async fn delete_patient(&self, id: PatientId) -> Result<(), ClientError> {
        self.api.delete(&format!("/pacientes/{}", id)).await
    }

    #[instrument(name = "clinic_client.rest.patients.by_code", skip(self))]
    async fn find_patient_by_code(&self, code: &str) -> Result<Patient, ClientError> {
        self.api
            .get(&format!("/pacientes/buscar/codigo/{}", encode(code)))
            .await
    }

    #[instrument(name = "clinic_client.rest.patients.by_dni", skip_all)]
    async fn find_patient_by_dni(&self, dni: &str) -> Result<Patient, ClientError> {
        self.api
            .get(&format!("/pacientes/buscar/dni/{}", encode(dni)))
            .await
    }

    #[instrument(name = "clinic_client.rest.patients.search_name", skip_all)]
    async fn search_patients_by_name(&self, name: &str) -> Result<Vec<Patient>, ClientError> {
        self.api
            .get(&format!("/pacientes/buscar/nombre?nombre={}", encode(name)))
            .await
    }
}

#[async_trait]
impl AppointmentsApi for RestGateway {
    #[instrument(name = "clinic_client.rest.appointments.list", skip(self))]
    async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        self.api.get("/citas").await
    }

    #[instrument(name = "clinic_client.rest.appointments.get", skip(self))]
    async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment, ClientError> {
        self.api.get(&format!("/citas/{}", id)).await
    }

    #[instrument(
        name = "clinic_client.rest.appointments.create",
        skip_all,
        fields(patient_id = input.patient.id)
    )]
    async fn create_appointment(
        &self,
        input: &AppointmentInput,
    ) -> Result<Appointment, ClientError> {
        self.api.post("/citas", input).await
    }

    #[instrument(name = "clinic_client.rest.appointments.update", skip(self, input))]
    async fn update_appointment(
        &self,
        id: AppointmentId,
        input: &AppointmentInput,
    ) -> Result<Appointment, ClientError> {
        self.api.put(&format!("/citas/{}", id), input).await
    }

    #[instrument(name = "clinic_client.rest.appointments.delete", skip(self))]
    async fn delete_appointment(&self, id: AppointmentId) -> Result<(), ClientError> {
        self.api.delete(&format!("/citas/{}", id)).await
    }
}

#[async_trait]
impl ClinicalHistoryApi for RestGateway {
    #[instrument(name = "clinic_client.rest.history.list", skip(self))]
    async fn list_records(&self) -> Result<Vec<ClinicalRecord>, ClientError> {
        self.api.get("/historial").await
    }

    #[instrument(name = "clinic_client.rest.history.get", skip(self))]
    async fn get_record(&self, id: ClinicalRecordId) -> Result<ClinicalRecord, ClientError> {
        self.api.get(&format!("/historial/{}", id)).await
    }

    #[instrument(
        name = "clinic_client.rest.history.create",
        skip_all,
        fields(patient_id = input.patient.id)
    )]
    async fn create_record(
        &self,
        input: &ClinicalRecordInput,
    ) -> Result<ClinicalRecord, ClientError> {
        self.api.post("/historial", input).await
    }

    #[instrument(name = "clinic_client.rest.history.update", skip(self, input))]
    async fn update_record(
        &self,
        id: ClinicalRecordId,
        input: &ClinicalRecordInput,
    ) -> Result<ClinicalRecord, ClientError> {
        self.api.put(&format!("/historial/{}", id), input).await
    }

    #[instrument(name = "clinic_client.rest.history.delete", skip(self))]
    async fn delete_record(&self, id: ClinicalRecordId) -> Result<(), ClientError> {
        self.api.delete(&format!("/historial/{}", id)).await
    }

    #[instrument(name = "clinic_client.rest.history.for_patient", skip(self))]
    async fn list_records_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ClinicalRecord>, ClientError> {
        self.api
            .get(&format!("/historial/paciente/{}", patient_id))
            .await
    }
}
