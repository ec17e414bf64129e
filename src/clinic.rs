/// The front-desk entry point.
///
/// `Clinic` wires the queue store, load balancer, slot allocator and dispatch
/// engine together. Components are passed in rather than created here, so
/// tests and the CLI can assemble a clinic from any configuration.
use crate::allocator::SlotAllocator;
use crate::balancer::DoctorLoadBalancer;
use crate::config::ClinicConfig;
use crate::diagnosis;
use crate::dispatch::DispatchEngine;
use crate::error::{ClinicError, ClinicResult, ConfigError};
use crate::models::{AdmissionRequest, Consultation, ConsultationStatus, Doctor, QueueType};
use crate::queue::QueueStore;
use crate::report::{QueueReport, WaitEstimator};
use crate::slots::{Slot, SlotGrid};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// What the intake desk gets back for an admitted patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub consultation_id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub slot: Slot,
    pub queue_type: QueueType,
    pub diagnosis: String,
    pub estimated_wait_minutes: u32,
}

#[derive(Debug, Clone)]
pub struct Clinic {
    store: QueueStore,
    balancer: DoctorLoadBalancer,
    allocator: SlotAllocator,
    dispatcher: DispatchEngine,
    estimator: WaitEstimator,
    next_consultation_id: u32,
}

impl Clinic {
    pub fn new(
        store: QueueStore,
        balancer: DoctorLoadBalancer,
        allocator: SlotAllocator,
        dispatcher: DispatchEngine,
        estimator: WaitEstimator,
    ) -> Self {
        Clinic {
            store,
            balancer,
            allocator,
            dispatcher,
            estimator,
            next_consultation_id: 1,
        }
    }

    pub fn from_config(config: &ClinicConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Clinic::new(
            QueueStore::new(),
            config.balancer()?,
            SlotAllocator::new(config.grid()?),
            DispatchEngine::new(config.clock()?),
            WaitEstimator {
                consultation_minutes: config.consultation_minutes,
                emergency_minutes: config.emergency_minutes,
                emergency_floor_minutes: config.emergency_floor_minutes,
            },
        ))
    }

    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    pub fn balancer(&self) -> &DoctorLoadBalancer {
        &self.balancer
    }

    pub fn grid(&self) -> &SlotGrid {
        self.allocator.grid()
    }

    fn peek_consultation_id(&self) -> String {
        format!("C{:03}", self.next_consultation_id)
    }

    /// Admit a new patient.
    ///
    /// Refuses with `DoctorsAtCapacity` when no doctor can take another
    /// patient, and with `NoSlotsAvailable`/`SlotUnavailable` when the
    /// assigned doctor has no suitable slot left today.
    pub fn admit(&mut self, request: AdmissionRequest) -> ClinicResult<Admission> {
        if !self.balancer.any_available(&self.store) {
            warn!(
                "Refusing {} for patient {}: all doctors at capacity",
                request.queue_type, request.patient.patient_id
            );
            return Err(ClinicError::DoctorsAtCapacity {
                capacity: self.balancer.capacity(),
            });
        }

        let doctor = self.balancer.assign(&self.store).clone();
        let queue_type = request.queue_type;
        let consultation_id = self.peek_consultation_id();

        let mut consultation = Consultation::new(
            consultation_id.clone(),
            request.patient,
            &doctor,
            self.grid().first(),
            request.symptoms,
            queue_type,
        );
        consultation.diagnosis = diagnosis::classify(&consultation.symptoms).to_string();
        consultation.estimated_wait_minutes = self
            .estimator
            .estimate(queue_type, self.store.waiting_count(queue_type));
        let diagnosis = consultation.diagnosis.clone();
        let estimated_wait_minutes = consultation.estimated_wait_minutes;

        let slot = self
            .place(consultation, request.preferred_slot)
            .map_err(|e| {
                warn!("Refusing {} for doctor {}: {}", queue_type, doctor.id, e);
                e
            })?;
        self.next_consultation_id += 1;

        info!(
            "Admitted {} ({}) with {} at {}",
            consultation_id, queue_type, doctor.id, slot
        );
        Ok(Admission {
            consultation_id,
            doctor_id: doctor.id,
            doctor_name: doctor.name,
            slot,
            queue_type,
            diagnosis,
            estimated_wait_minutes,
        })
    }

    /// Choose a slot for `consultation` according to its queue type and
    /// store it.
    fn place(&mut self, mut consultation: Consultation, preferred: Option<Slot>) -> ClinicResult<Slot> {
        let doctor_id = consultation.doctor_id.clone();
        match consultation.queue_type {
            QueueType::Emergency => self.allocator.admit_emergency(&mut self.store, consultation),
            QueueType::WalkIn => {
                let slot = self
                    .allocator
                    .assign_walk_in_slot(&self.store, &doctor_id)
                    .ok_or(ClinicError::NoSlotsAvailable { doctor_id })?;
                consultation.slot = slot;
                self.store.add_live(consultation)?;
                Ok(slot)
            }
            QueueType::Scheduled => {
                let slot = self
                    .allocator
                    .assign_scheduled_slot(&self.store, &doctor_id, preferred)?;
                consultation.slot = slot;
                self.store.add_scheduled(consultation)?;
                Ok(slot)
            }
        }
    }

    pub fn available_slots(&self, doctor_id: &str, queue_type: QueueType) -> ClinicResult<Vec<Slot>> {
        let doctor = self.doctor(doctor_id)?;
        Ok(self
            .allocator
            .available_slots(&self.store, &doctor.id, queue_type))
    }

    fn doctor(&self, doctor_id: &str) -> ClinicResult<&Doctor> {
        self.balancer
            .doctor(doctor_id)
            .ok_or_else(|| ClinicError::UnknownDoctor(doctor_id.to_string()))
    }

    pub fn next_patient(&self) -> Option<&Consultation> {
        self.dispatcher.next_patient(&self.store, self.grid())
    }

    /// Mark a waiting or in-progress consultation as seen.
    ///
    /// Returns `false` for unknown ids and for records that are already
    /// completed or cancelled.
    pub fn complete(&mut self, consultation_id: &str) -> bool {
        self.finish(consultation_id, ConsultationStatus::Completed)
    }

    /// Cancel a waiting or in-progress consultation, freeing its slot.
    pub fn cancel(&mut self, consultation_id: &str) -> bool {
        self.finish(consultation_id, ConsultationStatus::Cancelled)
    }

    fn finish(&mut self, consultation_id: &str, status: ConsultationStatus) -> bool {
        match self.store.get(consultation_id) {
            Some(c) if c.status.is_active() => {}
            Some(c) => {
                warn!(
                    "Cannot mark {} as {}: already {}",
                    consultation_id, status, c.status
                );
                return false;
            }
            None => return false,
        }
        let updated = self.store.update_status(consultation_id, status);
        if updated {
            info!("{} is now {}", consultation_id, status);
        }
        updated
    }

    /// Mark whoever is next as seen. Returns their consultation id.
    pub fn complete_next(&mut self) -> Option<String> {
        let next = self.next_patient()?.consultation_id.clone();
        self.complete(&next);
        Some(next)
    }

    pub fn remove(&mut self, consultation_id: &str) -> bool {
        let removed = self.store.remove(consultation_id);
        if removed {
            info!("Removed {}", consultation_id);
        }
        removed
    }

    /// Move a waiting consultation to another queue type.
    ///
    /// The record is taken out of the store and re-placed with the same
    /// doctor under the new type's slot rules. Slot assignment runs even when
    /// the type does not change. If no slot fits, the original record is put
    /// back untouched and the error is returned. Completed and cancelled
    /// records are refused.
    pub fn reclassify(&mut self, consultation_id: &str, queue_type: QueueType) -> ClinicResult<Slot> {
        match self.store.get(consultation_id) {
            Some(c) if c.is_waiting() => {}
            Some(c) => {
                return Err(ClinicError::InvalidInput(format!(
                    "cannot reclassify {}: consultation is {}",
                    c.consultation_id, c.status
                )))
            }
            None => {
                return Err(ClinicError::ConsultationNotFound(
                    consultation_id.to_string(),
                ))
            }
        }
        let original = self
            .store
            .take(consultation_id)
            .ok_or_else(|| ClinicError::ConsultationNotFound(consultation_id.to_string()))?;

        let mut updated = original.clone();
        updated.queue_type = queue_type;
        match self.place(updated, None) {
            Ok(slot) => {
                info!(
                    "Reclassified {} from {} to {} at {}",
                    original.consultation_id, original.queue_type, queue_type, slot
                );
                Ok(slot)
            }
            Err(e) => {
                warn!(
                    "Could not reclassify {} to {}: {}",
                    original.consultation_id, queue_type, e
                );
                self.store.add(original)?;
                Err(e)
            }
        }
    }

    pub fn report(&self) -> QueueReport {
        QueueReport::build(&self.store, &self.balancer, &self.estimator)
    }
}

impl Default for Clinic {
    fn default() -> Self {
        Clinic::new(
            QueueStore::new(),
            DoctorLoadBalancer::default(),
            SlotAllocator::default(),
            DispatchEngine::default(),
            WaitEstimator::default(),
        )
    }
}

/// A clinic shared between threads.
///
/// Every operation runs under one lock, so an emergency swap or a dispatch
/// scan always sees both queue partitions in a consistent state.
#[derive(Debug, Clone)]
pub struct SharedClinic {
    inner: Arc<Mutex<Clinic>>,
}

impl SharedClinic {
    pub fn new(clinic: Clinic) -> Self {
        SharedClinic {
            inner: Arc::new(Mutex::new(clinic)),
        }
    }

    /// Run `f` with exclusive access to the clinic.
    pub fn with<R>(&self, f: impl FnOnce(&mut Clinic) -> R) -> R {
        let mut clinic = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *clinic)
    }

    pub fn admit(&self, request: AdmissionRequest) -> ClinicResult<Admission> {
        self.with(|clinic| clinic.admit(request))
    }

    /// A copy of the next patient, taken under the lock.
    pub fn next_patient(&self) -> Option<Consultation> {
        self.with(|clinic| clinic.next_patient().cloned())
    }

    pub fn complete(&self, consultation_id: &str) -> bool {
        self.with(|clinic| clinic.complete(consultation_id))
    }

    pub fn complete_next(&self) -> Option<String> {
        self.with(|clinic| clinic.complete_next())
    }

    pub fn report(&self) -> QueueReport {
        self.with(|clinic| clinic.report())
    }
}
