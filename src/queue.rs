/// Storage for every consultation admitted today.
///
/// Records are split into two partitions: `scheduled` holds time-anchored
/// appointments, `live` holds walk-ins and emergencies in arrival order.
/// Every lookup walks scheduled first, then live; reports rely on that order.
use crate::error::{ClinicError, ClinicResult};
use crate::models::{ids_match, Consultation, ConsultationStatus, QueueType};
use crate::slots::Slot;

#[derive(Debug, Clone, Default)]
pub struct QueueStore {
    scheduled: Vec<Consultation>,
    live: Vec<Consultation>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scheduled appointment.
    pub fn add_scheduled(&mut self, consultation: Consultation) -> ClinicResult<()> {
        if consultation.queue_type != QueueType::Scheduled {
            return Err(ClinicError::InvalidInput(format!(
                "{} is a {} consultation, not SCHEDULED",
                consultation.consultation_id, consultation.queue_type
            )));
        }
        self.check_insert(&consultation)?;
        self.scheduled.push(consultation);
        Ok(())
    }

    /// Append a walk-in or emergency in arrival order.
    pub fn add_live(&mut self, consultation: Consultation) -> ClinicResult<()> {
        if !consultation.queue_type.is_live() {
            return Err(ClinicError::InvalidInput(format!(
                "{} is a SCHEDULED consultation and belongs in the scheduled queue",
                consultation.consultation_id
            )));
        }
        self.check_insert(&consultation)?;
        self.live.push(consultation);
        Ok(())
    }

    /// Route a consultation to the partition matching its queue type.
    pub fn add(&mut self, consultation: Consultation) -> ClinicResult<()> {
        if consultation.queue_type.is_live() {
            self.add_live(consultation)
        } else {
            self.add_scheduled(consultation)
        }
    }

    fn check_insert(&self, consultation: &Consultation) -> ClinicResult<()> {
        if self.get(&consultation.consultation_id).is_some() {
            return Err(ClinicError::DuplicateConsultation(
                consultation.consultation_id.clone(),
            ));
        }
        if consultation.status.holds_slot() {
            self.assert_slot_free(&consultation.doctor_id, consultation.slot, None);
        }
        Ok(())
    }

    /// Double-booking a doctor means the allocator is broken.
    fn assert_slot_free(&self, doctor_id: &str, slot: Slot, except_id: Option<&str>) {
        let holder = self.iter().find(|c| {
            c.belongs_to(doctor_id)
                && c.slot == slot
                && c.status.holds_slot()
                && except_id.map_or(true, |id| !ids_match(&c.consultation_id, id))
        });
        assert!(
            holder.is_none(),
            "slot {} for doctor {} is already held by {}",
            slot,
            doctor_id,
            holder.map(|c| c.consultation_id.as_str()).unwrap_or_default()
        );
    }

    /// Remove a consultation from whichever partition holds it.
    pub fn remove(&mut self, consultation_id: &str) -> bool {
        self.take(consultation_id).is_some()
    }

    /// Remove and hand back a consultation.
    pub fn take(&mut self, consultation_id: &str) -> Option<Consultation> {
        for partition in [&mut self.scheduled, &mut self.live] {
            if let Some(index) = partition
                .iter()
                .position(|c| ids_match(&c.consultation_id, consultation_id))
            {
                return Some(partition.remove(index));
            }
        }
        None
    }

    pub fn update_status(&mut self, consultation_id: &str, status: ConsultationStatus) -> bool {
        match self.get_mut(consultation_id) {
            Some(consultation) => {
                consultation.status = status;
                true
            }
            None => false,
        }
    }

    /// Move a consultation to another slot of the same doctor.
    ///
    /// Panics if the target slot is already held by another of that doctor's
    /// consultations.
    pub fn reassign_slot(&mut self, consultation_id: &str, slot: Slot) -> bool {
        let doctor_id = match self.get(consultation_id) {
            Some(c) => c.doctor_id.clone(),
            None => return false,
        };
        self.assert_slot_free(&doctor_id, slot, Some(consultation_id));
        match self.get_mut(consultation_id) {
            Some(consultation) => {
                consultation.slot = slot;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, consultation_id: &str) -> Option<&Consultation> {
        self.iter()
            .find(|c| ids_match(&c.consultation_id, consultation_id))
    }

    fn get_mut(&mut self, consultation_id: &str) -> Option<&mut Consultation> {
        self.scheduled
            .iter_mut()
            .chain(self.live.iter_mut())
            .find(|c| ids_match(&c.consultation_id, consultation_id))
    }

    pub fn scheduled(&self) -> &[Consultation] {
        &self.scheduled
    }

    pub fn live(&self) -> &[Consultation] {
        &self.live
    }

    /// All consultations, scheduled partition first.
    pub fn iter(&self) -> impl Iterator<Item = &Consultation> {
        self.scheduled.iter().chain(self.live.iter())
    }

    pub fn len(&self) -> usize {
        self.scheduled.len() + self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn by_patient(&self, patient_id: &str) -> Vec<&Consultation> {
        self.iter()
            .filter(|c| ids_match(&c.patient.patient_id, patient_id))
            .collect()
    }

    pub fn by_doctor(&self, doctor_id: &str) -> Vec<&Consultation> {
        self.iter().filter(|c| c.belongs_to(doctor_id)).collect()
    }

    pub fn by_symptom(&self, text: &str) -> Vec<&Consultation> {
        let needle = text.to_lowercase();
        self.iter()
            .filter(|c| c.symptoms.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn by_queue_type(&self, queue_type: QueueType) -> Vec<&Consultation> {
        self.iter().filter(|c| c.queue_type == queue_type).collect()
    }

    /// The consultation currently holding `slot` for `doctor_id`, if any.
    pub fn slot_holder(&self, doctor_id: &str, slot: Slot) -> Option<&Consultation> {
        self.iter()
            .find(|c| c.belongs_to(doctor_id) && c.slot == slot && c.status.holds_slot())
    }

    /// Number of WAITING consultations of one queue type.
    pub fn waiting_count(&self, queue_type: QueueType) -> usize {
        self.iter()
            .filter(|c| c.queue_type == queue_type && c.is_waiting())
            .count()
    }
}
