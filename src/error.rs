/// Error types for the clinic scheduler.
///
/// Not-found conditions on removal and status updates are reported as plain
/// `bool`/empty results by the store; these enums only cover refusals the
/// front desk has to act on and configuration problems.
use crate::slots::Slot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClinicError {
    #[error("all doctors are at full capacity ({capacity} patients each)")]
    DoctorsAtCapacity { capacity: usize },
    #[error("no available time slots today for doctor {doctor_id}")]
    NoSlotsAvailable { doctor_id: String },
    #[error("time slot {slot} is not available for doctor {doctor_id}")]
    SlotUnavailable { doctor_id: String, slot: Slot },
    #[error("consultation {0} already exists")]
    DuplicateConsultation(String),
    #[error("consultation {0} not found")]
    ConsultationNotFound(String),
    #[error("unknown doctor: {0}")]
    UnknownDoctor(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
