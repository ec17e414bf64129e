/// Doctor selection for new patients.
///
/// Loads are always recounted from the queue store so they can never drift
/// from the stored consultations.
use crate::error::{ClinicError, ClinicResult};
use crate::models::{ids_match, Doctor};
use crate::queue::QueueStore;

pub const DEFAULT_DOCTOR_CAPACITY: usize = 2;

#[derive(Debug, Clone)]
pub struct DoctorLoadBalancer {
    doctors: Vec<Doctor>,
    capacity: usize,
    last_assigned: Option<usize>,
}

impl DoctorLoadBalancer {
    /// The roster order is the round-robin order. An empty roster is refused,
    /// so `assign` always has someone to return.
    pub fn new(doctors: Vec<Doctor>, capacity: usize) -> ClinicResult<Self> {
        if doctors.is_empty() {
            return Err(ClinicError::InvalidInput(
                "at least one doctor is required".to_string(),
            ));
        }
        Ok(DoctorLoadBalancer {
            doctors,
            capacity,
            last_assigned: None,
        })
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn doctor(&self, doctor_id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|d| ids_match(&d.id, doctor_id))
    }

    /// Consultations currently occupying the doctor.
    pub fn active_count(&self, store: &QueueStore, doctor_id: &str) -> usize {
        store
            .iter()
            .filter(|c| c.belongs_to(doctor_id) && c.status.is_active())
            .count()
    }

    pub fn is_available(&self, store: &QueueStore, doctor_id: &str) -> bool {
        self.active_count(store, doctor_id) < self.capacity
    }

    pub fn any_available(&self, store: &QueueStore) -> bool {
        self.doctors
            .iter()
            .any(|d| self.is_available(store, &d.id))
    }

    /// Pick the least-loaded doctor.
    ///
    /// Ties go to the first tied doctor after the previous assignment in
    /// roster order, so consecutive ties never pick the same doctor twice.
    /// Capacity is not checked here.
    pub fn assign(&mut self, store: &QueueStore) -> &Doctor {
        let loads: Vec<usize> = self
            .doctors
            .iter()
            .map(|d| self.active_count(store, &d.id))
            .collect();
        let lowest = loads.iter().copied().min().unwrap_or(0);

        let count = self.doctors.len();
        let start = self.last_assigned.map_or(0, |last| last + 1);
        let chosen = (0..count)
            .map(|offset| (start + offset) % count)
            .find(|&i| loads[i] == lowest)
            .unwrap_or(0);

        self.last_assigned = Some(chosen);
        &self.doctors[chosen]
    }
}

impl Default for DoctorLoadBalancer {
    fn default() -> Self {
        DoctorLoadBalancer {
            doctors: vec![
                Doctor::new("D001", "Dr. Smith"),
                Doctor::new("D002", "Dr. Johnson"),
            ],
            capacity: DEFAULT_DOCTOR_CAPACITY,
            last_assigned: None,
        }
    }
}
