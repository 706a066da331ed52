//! Client-side list helpers used for display: search filtering and
//! chronological ordering. Pure functions over fetched records; `now` is
//! always passed in.

use std::cmp::Reverse;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::contract::error::ClientError;
use crate::contract::model::{Appointment, ClinicalRecord, Patient};

/// Case-insensitive substring match on full name, national ID or code.
/// A blank query keeps every patient.
pub fn filter_patients<'a>(patients: &'a [Patient], query: &str) -> Vec<&'a Patient> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return patients.iter().collect();
    }
    patients
        .iter()
        .filter(|p| {
            [&p.full_name, &p.national_id, &p.code]
                .iter()
                .any(|field| field.to_lowercase().contains(&q))
        })
        .collect()
}

/// Which appointments to show relative to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentWindow {
    #[default]
    All,
    /// Scheduled at or after `now`.
    Upcoming,
    /// Scheduled strictly before `now`.
    Past,
}

impl FromStr for AppointmentWindow {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "upcoming" => Ok(Self::Upcoming),
            "past" => Ok(Self::Past),
            other => Err(ClientError::validation(
                "window",
                format!("expected all, upcoming or past, got '{}'", other),
            )),
        }
    }
}

impl AppointmentWindow {
    fn admits(&self, a: &Appointment, now: NaiveDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => a.scheduled_at >= now,
            Self::Past => a.scheduled_at < now,
        }
    }
}

/// Sort in place by scheduled time, earliest first. Stable for equal times.
pub fn sort_chronologically(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|a| a.scheduled_at);
}

/// Appointments in `window`, earliest first.
pub fn select_appointments(
    appointments: &[Appointment],
    window: AppointmentWindow,
    now: NaiveDateTime,
) -> Vec<Appointment> {
    let mut selected: Vec<Appointment> = appointments
        .iter()
        .filter(|a| window.admits(a, now))
        .cloned()
        .collect();
    sort_chronologically(&mut selected);
    selected
}

/// Split into `(past, upcoming)`, each earliest first.
pub fn partition_appointments(
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> (Vec<Appointment>, Vec<Appointment>) {
    let (mut past, mut upcoming): (Vec<_>, Vec<_>) = appointments
        .iter()
        .cloned()
        .partition(|a| a.scheduled_at < now);
    sort_chronologically(&mut past);
    sort_chronologically(&mut upcoming);
    (past, upcoming)
}

/// Newest consultation first; records without a timestamp go last.
pub fn sort_history_newest_first(records: &mut [ClinicalRecord]) {
    records.sort_by_key(|r| (r.consulted_at.is_none(), Reverse(r.consulted_at)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{AppointmentStatus, PatientRef};
    use chrono::NaiveDate;

    fn dt(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn patient(id: i64, name: &str, dni: &str, code: &str) -> Patient {
        Patient {
            id,
            full_name: name.into(),
            national_id: dni.into(),
            code: code.into(),
            birth_date: None,
            phone: None,
            email: None,
            address: None,
            gestation_weeks: None,
            last_menstruation: None,
            blood_type: None,
            allergies: None,
            notes: None,
            registered_at: None,
        }
    }

    fn appointment(id: i64, at: NaiveDateTime) -> Appointment {
        Appointment {
            id,
            patient: Some(PatientRef::id(1)),
            scheduled_at: at,
            reason: None,
            status: AppointmentStatus::Programada,
            notes: None,
        }
    }

    fn record(id: i64, at: Option<NaiveDateTime>) -> ClinicalRecord {
        ClinicalRecord {
            id,
            patient: Some(PatientRef::id(1)),
            consulted_at: at,
            gestation_weeks: None,
            weight: None,
            blood_pressure: None,
            symptoms: None,
            diagnosis: None,
            treatment: None,
            notes: None,
        }
    }

    #[test]
    fn filter_matches_name_dni_or_code_ignoring_case() {
        let patients = vec![
            patient(1, "Ana Quispe", "45879632", "GIN-001"),
            patient(2, "María Torres", "70112233", "GIN-002"),
            patient(3, "Lucía Ana Ramos", "11223344", "OBS-010"),
        ];

        let ids = |q: &str| {
            filter_patients(&patients, q)
                .iter()
                .map(|p| p.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids("ana"), vec![1, 3]);
        assert_eq!(ids("7011"), vec![2]);
        assert_eq!(ids("obs"), vec![3]);
        assert_eq!(ids("MARÍA"), vec![2]);
        assert_eq!(ids("  "), vec![1, 2, 3]);
        assert!(ids("zzz").is_empty());
    }

    #[test]
    fn upcoming_includes_now_and_past_excludes_it() {
        let now = dt(10, 9);
        let items = vec![
            appointment(1, dt(12, 9)),
            appointment(2, now),
            appointment(3, dt(8, 15)),
        ];

        let upcoming = select_appointments(&items, AppointmentWindow::Upcoming, now);
        assert_eq!(upcoming.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 1]);

        let past = select_appointments(&items, AppointmentWindow::Past, now);
        assert_eq!(past.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3]);

        let all = select_appointments(&items, AppointmentWindow::All, now);
        assert_eq!(all.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn partition_covers_every_appointment_once() {
        let now = dt(10, 9);
        let items = vec![
            appointment(1, dt(11, 9)),
            appointment(2, dt(1, 9)),
            appointment(3, dt(9, 9)),
        ];
        let (past, upcoming) = partition_appointments(&items, now);
        assert_eq!(past.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(upcoming.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn history_sorted_newest_first_with_undated_last() {
        let mut records = vec![
            record(1, Some(dt(3, 10))),
            record(2, None),
            record(3, Some(dt(20, 8))),
        ];
        sort_history_newest_first(&mut records);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn window_parses_from_cli_words() {
        assert_eq!(
            "Upcoming".parse::<AppointmentWindow>().unwrap(),
            AppointmentWindow::Upcoming
        );
        assert!("future".parse::<AppointmentWindow>().is_err());
    }
}
