pub mod allocator;
pub mod balancer;
pub mod clinic;
pub mod config;
pub mod diagnosis;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod queue;
pub mod report;
pub mod slots;

// Re-export key types
pub use allocator::SlotAllocator;
pub use balancer::DoctorLoadBalancer;
pub use clinic::{Admission, Clinic, SharedClinic};
pub use config::ClinicConfig;
pub use dispatch::{ClinicClock, DispatchEngine};
pub use error::{ClinicError, ClinicResult, ConfigError};
pub use models::{
    create_admission_request, AdmissionRequest, Consultation, ConsultationStatus, Doctor, Patient,
    QueueType,
};
pub use queue::QueueStore;
pub use report::{QueueReport, WaitEstimator};
pub use slots::{Slot, SlotGrid};
