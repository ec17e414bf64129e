/// Data models for the clinic front desk.
///
/// This module defines the core data structures used throughout the system:
/// - QueueType: the three competing patient classes
/// - ConsultationStatus: lifecycle of a consultation record
/// - Patient / Doctor: the parties to a consultation
/// - Consultation: one admitted patient, owned by the queue store
/// - AdmissionRequest: what the intake desk submits for a new patient
use crate::error::{ClinicError, ClinicResult};
use crate::slots::Slot;
use std::fmt;

/// Identifiers are compared case-insensitively everywhere in the clinic.
pub fn ids_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Patient classes competing for the doctors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueType {
    Emergency,
    WalkIn,
    Scheduled,
}

impl QueueType {
    pub const ALL: [QueueType; 3] = [QueueType::Emergency, QueueType::WalkIn, QueueType::Scheduled];

    /// Convert a string to a QueueType.
    pub fn from_string(value: &str) -> ClinicResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "emergency" => Ok(QueueType::Emergency),
            "walk_in" | "walk-in" | "walkin" => Ok(QueueType::WalkIn),
            "scheduled" => Ok(QueueType::Scheduled),
            _ => Err(ClinicError::InvalidInput(format!(
                "invalid queue type: '{}'. Must be one of: emergency, walk_in, scheduled",
                value
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QueueType::Emergency => "EMERGENCY",
            QueueType::WalkIn => "WALK_IN",
            QueueType::Scheduled => "SCHEDULED",
        }
    }

    /// Walk-ins and emergencies live in the arrival-ordered partition.
    pub fn is_live(&self) -> bool {
        !matches!(self, QueueType::Scheduled)
    }
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsultationStatus {
    Waiting,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl ConsultationStatus {
    pub fn from_string(value: &str) -> ClinicResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "waiting" => Ok(ConsultationStatus::Waiting),
            "in_progress" | "in-progress" => Ok(ConsultationStatus::InProgress),
            "completed" => Ok(ConsultationStatus::Completed),
            "cancelled" | "canceled" => Ok(ConsultationStatus::Cancelled),
            "no_show" | "no-show" => Ok(ConsultationStatus::NoShow),
            _ => Err(ClinicError::InvalidInput(format!(
                "invalid consultation status: '{}'",
                value
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConsultationStatus::Waiting => "WAITING",
            ConsultationStatus::InProgress => "IN_PROGRESS",
            ConsultationStatus::Completed => "COMPLETED",
            ConsultationStatus::Cancelled => "CANCELLED",
            ConsultationStatus::NoShow => "NO_SHOW",
        }
    }

    /// Counts against the doctor's concurrent-patient capacity.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConsultationStatus::Waiting | ConsultationStatus::InProgress
        )
    }

    /// Everything except a cancellation keeps its slot booked.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, ConsultationStatus::Cancelled)
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a patient at the front desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
}

impl Patient {
    /// Create a new patient with validation.
    pub fn new(patient_id: String, name: String) -> ClinicResult<Self> {
        if patient_id.trim().is_empty() {
            return Err(ClinicError::InvalidInput(
                "patient ID cannot be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(ClinicError::InvalidInput(
                "patient name cannot be empty".to_string(),
            ));
        }

        Ok(Patient { patient_id, name })
    }
}

/// A doctor on the clinic roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id: String,
    pub name: String,
}

impl Doctor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Doctor {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One admitted patient.
///
/// Records are owned by [`crate::queue::QueueStore`]; slot and status only
/// change through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consultation {
    pub consultation_id: String,
    pub patient: Patient,
    pub doctor_id: String,
    pub doctor_name: String,
    pub slot: Slot,
    pub symptoms: String,
    pub diagnosis: String,
    pub queue_type: QueueType,
    pub status: ConsultationStatus,
    pub estimated_wait_minutes: u32,
}

impl Consultation {
    pub fn new(
        consultation_id: String,
        patient: Patient,
        doctor: &Doctor,
        slot: Slot,
        symptoms: String,
        queue_type: QueueType,
    ) -> Self {
        Consultation {
            consultation_id,
            patient,
            doctor_id: doctor.id.clone(),
            doctor_name: doctor.name.clone(),
            slot,
            symptoms,
            diagnosis: "Pending".to_string(),
            queue_type,
            status: ConsultationStatus::Waiting,
            estimated_wait_minutes: 0,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == ConsultationStatus::Waiting
    }

    pub fn belongs_to(&self, doctor_id: &str) -> bool {
        ids_match(&self.doctor_id, doctor_id)
    }
}

impl fmt::Display for Consultation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Patient: {} ({}) | Doctor: {} | Time: {} | Type: {} | Status: {} | Symptoms: {} | Diagnosis: {}",
            self.consultation_id,
            self.patient.name,
            self.patient.patient_id,
            self.doctor_name,
            self.slot,
            self.queue_type,
            self.status,
            self.symptoms,
            self.diagnosis
        )
    }
}

/// A patient's request to be seen, as captured by the intake desk.
#[derive(Debug, Clone)]
pub struct AdmissionRequest {
    pub patient: Patient,
    pub symptoms: String,
    pub queue_type: QueueType,
    /// Only honoured for scheduled appointments.
    pub preferred_slot: Option<Slot>,
}

impl AdmissionRequest {
    /// Create a new admission request with validation.
    pub fn new(
        patient: Patient,
        symptoms: String,
        queue_type: QueueType,
        preferred_slot: Option<Slot>,
    ) -> ClinicResult<Self> {
        if symptoms.trim().is_empty() {
            return Err(ClinicError::InvalidInput(
                "symptoms cannot be empty".to_string(),
            ));
        }

        Ok(AdmissionRequest {
            patient,
            symptoms,
            queue_type,
            preferred_slot,
        })
    }
}

/// Factory function to create an admission request from raw intake fields.
pub fn create_admission_request(
    patient_id: String,
    patient_name: String,
    symptoms: String,
    queue_type: &str,
    preferred_slot: Option<&str>,
) -> ClinicResult<AdmissionRequest> {
    let patient = Patient::new(patient_id, patient_name)?;
    let queue_type = QueueType::from_string(queue_type)?;
    let preferred_slot = preferred_slot
        .filter(|label| !label.trim().is_empty())
        .map(Slot::parse)
        .transpose()?;

    AdmissionRequest::new(patient, symptoms, queue_type, preferred_slot)
}
