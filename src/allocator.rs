/// Slot allocation for each doctor's day.
///
/// The allocator owns no consultation state: every answer is computed from
/// the queue store, and every change is made through it.
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Consultation, QueueType};
use crate::queue::QueueStore;
use crate::slots::{Slot, SlotGrid};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SlotAllocator {
    grid: SlotGrid,
}

impl SlotAllocator {
    pub fn new(grid: SlotGrid) -> Self {
        SlotAllocator { grid }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn is_free(&self, store: &QueueStore, doctor_id: &str, slot: Slot) -> bool {
        store.slot_holder(doctor_id, slot).is_none()
    }

    /// Slots a new booking of `queue_type` may take with this doctor.
    ///
    /// Walk-ins and emergencies only need the slot itself to be free. A new
    /// scheduled appointment additionally has to land after the doctor's
    /// latest scheduled appointment: the scheduled sequence is append-only.
    pub fn available_slots(
        &self,
        store: &QueueStore,
        doctor_id: &str,
        queue_type: QueueType,
    ) -> Vec<Slot> {
        let floor = match queue_type {
            QueueType::Scheduled => self.latest_scheduled_slot(store, doctor_id),
            QueueType::WalkIn | QueueType::Emergency => None,
        };

        self.grid
            .all_labels()
            .iter()
            .copied()
            .filter(|slot| floor.map_or(true, |floor| *slot > floor))
            .filter(|slot| self.is_free(store, doctor_id, *slot))
            .collect()
    }

    /// Latest slot held by one of the doctor's scheduled appointments.
    pub fn latest_scheduled_slot(&self, store: &QueueStore, doctor_id: &str) -> Option<Slot> {
        store
            .scheduled()
            .iter()
            .filter(|c| c.belongs_to(doctor_id) && c.status.holds_slot())
            .map(|c| c.slot)
            .max()
    }

    /// Latest slot held by any of the doctor's consultations.
    pub fn latest_occupied_slot(&self, store: &QueueStore, doctor_id: &str) -> Option<Slot> {
        store
            .iter()
            .filter(|c| c.belongs_to(doctor_id) && c.status.holds_slot())
            .map(|c| c.slot)
            .max()
    }

    pub fn earliest_free(&self, store: &QueueStore, doctor_id: &str) -> Option<Slot> {
        self.grid
            .all_labels()
            .iter()
            .copied()
            .find(|slot| self.is_free(store, doctor_id, *slot))
    }

    /// First free slot strictly after `after`.
    pub fn first_free_after(&self, store: &QueueStore, doctor_id: &str, after: Slot) -> Option<Slot> {
        self.grid
            .all_labels()
            .iter()
            .copied()
            .filter(|slot| *slot > after)
            .find(|slot| self.is_free(store, doctor_id, *slot))
    }

    /// Slot for a new walk-in: the first free slot after the doctor's latest
    /// booking, or the earliest free slot of the day when nothing is left
    /// after it. `None` means the doctor's day is full.
    pub fn assign_walk_in_slot(&self, store: &QueueStore, doctor_id: &str) -> Option<Slot> {
        self.latest_occupied_slot(store, doctor_id)
            .and_then(|latest| self.first_free_after(store, doctor_id, latest))
            .or_else(|| self.earliest_free(store, doctor_id))
    }

    /// Slot for a new scheduled appointment, honouring `preferred` if given.
    pub fn assign_scheduled_slot(
        &self,
        store: &QueueStore,
        doctor_id: &str,
        preferred: Option<Slot>,
    ) -> ClinicResult<Slot> {
        let available = self.available_slots(store, doctor_id, QueueType::Scheduled);

        match preferred {
            Some(slot) if available.contains(&slot) => Ok(slot),
            Some(slot) => Err(ClinicError::SlotUnavailable {
                doctor_id: doctor_id.to_string(),
                slot,
            }),
            None => available
                .first()
                .copied()
                .ok_or_else(|| ClinicError::NoSlotsAvailable {
                    doctor_id: doctor_id.to_string(),
                }),
        }
    }

    /// Admit an emergency by swapping it in front of the doctor's earliest
    /// waiting walk-in.
    ///
    /// The emergency takes that walk-in's slot and the walk-in moves to the
    /// next free slot after its old one. Without a waiting walk-in (or with
    /// nothing free after it) the emergency takes the doctor's earliest free
    /// slot instead. The consultation is stored on success and its slot is
    /// returned.
    pub fn admit_emergency(
        &self,
        store: &mut QueueStore,
        mut emergency: Consultation,
    ) -> ClinicResult<Slot> {
        if emergency.queue_type != QueueType::Emergency {
            return Err(ClinicError::InvalidInput(format!(
                "{} is not an emergency consultation",
                emergency.consultation_id
            )));
        }
        if store.get(&emergency.consultation_id).is_some() {
            return Err(ClinicError::DuplicateConsultation(
                emergency.consultation_id.clone(),
            ));
        }

        let doctor_id = emergency.doctor_id.clone();
        let earliest_walk_in = store
            .live()
            .iter()
            .filter(|c| {
                c.belongs_to(&doctor_id) && c.queue_type == QueueType::WalkIn && c.is_waiting()
            })
            .min_by_key(|c| c.slot)
            .map(|c| (c.consultation_id.clone(), c.slot));

        let swap = match earliest_walk_in {
            Some((walk_in_id, walk_in_slot)) => self
                .first_free_after(store, &doctor_id, walk_in_slot)
                .map(|moved_to| (walk_in_id, walk_in_slot, moved_to)),
            None => None,
        };

        let slot = match swap {
            Some((walk_in_id, walk_in_slot, moved_to)) => {
                debug!(
                    "Emergency {} displaces walk-in {} from {} to {}",
                    emergency.consultation_id, walk_in_id, walk_in_slot, moved_to
                );
                store.reassign_slot(&walk_in_id, moved_to);
                walk_in_slot
            }
            None => self
                .earliest_free(store, &doctor_id)
                .ok_or_else(|| ClinicError::NoSlotsAvailable {
                    doctor_id: doctor_id.clone(),
                })?,
        };

        emergency.slot = slot;
        store.add_live(emergency)?;
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsultationStatus, Doctor, Patient};

    fn slot(label: &str) -> Slot {
        Slot::parse(label).unwrap()
    }

    fn consultation(id: &str, doctor: &str, at: &str, queue_type: QueueType) -> Consultation {
        Consultation::new(
            id.to_string(),
            Patient::new(format!("P-{}", id), "Morgan Tan".to_string()).unwrap(),
            &Doctor::new(doctor, "Dr. Test"),
            slot(at),
            "fever".to_string(),
            queue_type,
        )
    }

    fn labels(slots: &[Slot]) -> Vec<String> {
        slots.iter().map(Slot::label).collect()
    }

    #[test]
    fn test_available_slots_are_per_doctor() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        store.add(consultation("C001", "D001", "09:00", QueueType::WalkIn)).unwrap();

        let smith = allocator.available_slots(&store, "D001", QueueType::WalkIn);
        let johnson = allocator.available_slots(&store, "D002", QueueType::WalkIn);
        assert_eq!(smith.len(), 16);
        assert_eq!(smith[0], slot("09:30"));
        assert_eq!(johnson.len(), 17);
    }

    #[test]
    fn test_cancelled_consultation_frees_slot() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        store.add(consultation("C001", "D001", "09:00", QueueType::WalkIn)).unwrap();
        store.update_status("C001", ConsultationStatus::Cancelled);
        assert_eq!(allocator.earliest_free(&store, "D001"), Some(slot("09:00")));

        store.add(consultation("C002", "D001", "09:30", QueueType::WalkIn)).unwrap();
        store.update_status("C002", ConsultationStatus::Completed);
        assert!(!allocator.is_free(&store, "D001", slot("09:30")));
    }

    #[test]
    fn test_scheduled_bookings_cannot_go_earlier() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        store.add(consultation("C001", "D001", "13:00", QueueType::Scheduled)).unwrap();
        store.add(consultation("C002", "D001", "14:00", QueueType::WalkIn)).unwrap();

        let scheduled = allocator.available_slots(&store, "D001", QueueType::Scheduled);
        assert_eq!(scheduled[0], slot("13:30"));
        assert!(!scheduled.contains(&slot("14:00")));
        assert!(!scheduled.contains(&slot("10:00")));

        // Walk-ins still see the morning.
        let walk_in = allocator.available_slots(&store, "D001", QueueType::WalkIn);
        assert_eq!(walk_in[0], slot("09:00"));

        assert_eq!(
            allocator.assign_scheduled_slot(&store, "D001", Some(slot("10:00"))),
            Err(ClinicError::SlotUnavailable {
                doctor_id: "D001".to_string(),
                slot: slot("10:00"),
            })
        );
        assert_eq!(
            allocator.assign_scheduled_slot(&store, "D001", Some(slot("15:00"))),
            Ok(slot("15:00"))
        );
        assert_eq!(
            allocator.assign_scheduled_slot(&store, "D001", None),
            Ok(slot("13:30"))
        );
    }

    #[test]
    fn test_walk_in_goes_after_latest_booking() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        assert_eq!(allocator.assign_walk_in_slot(&store, "D001"), Some(slot("09:00")));

        store.add(consultation("C001", "D001", "09:00", QueueType::WalkIn)).unwrap();
        store.add(consultation("C002", "D001", "11:00", QueueType::Scheduled)).unwrap();
        assert_eq!(allocator.assign_walk_in_slot(&store, "D001"), Some(slot("11:30")));
    }

    #[test]
    fn test_walk_in_falls_back_to_earlier_gap() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        store.add(consultation("C001", "D001", "17:00", QueueType::Scheduled)).unwrap();
        assert_eq!(allocator.assign_walk_in_slot(&store, "D001"), Some(slot("09:00")));
    }

    #[test]
    fn test_full_day_has_no_walk_in_slot() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        for (i, label) in allocator.grid().all_labels().to_vec().iter().enumerate() {
            store
                .add(consultation(&format!("C{:03}", i), "D001", &label.label(), QueueType::WalkIn))
                .unwrap();
        }
        assert_eq!(allocator.assign_walk_in_slot(&store, "D001"), None);
        assert!(allocator.available_slots(&store, "D001", QueueType::WalkIn).is_empty());

        let emergency = consultation("C900", "D001", "09:00", QueueType::Emergency);
        assert_eq!(
            allocator.admit_emergency(&mut store, emergency),
            Err(ClinicError::NoSlotsAvailable {
                doctor_id: "D001".to_string()
            })
        );
        assert_eq!(store.len(), 17);
    }

    #[test]
    fn test_emergency_swaps_with_earliest_walk_in() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        store.add(consultation("C001", "D001", "09:00", QueueType::WalkIn)).unwrap();
        store.add(consultation("C002", "D001", "09:30", QueueType::WalkIn)).unwrap();

        let emergency = consultation("C003", "D001", "09:00", QueueType::Emergency);
        let taken = allocator.admit_emergency(&mut store, emergency).unwrap();

        assert_eq!(taken, slot("09:00"));
        assert_eq!(store.get("C003").unwrap().slot, slot("09:00"));
        assert_eq!(store.get("C001").unwrap().slot, slot("10:00"));
        assert_eq!(store.get("C002").unwrap().slot, slot("09:30"));
        assert_eq!(labels(&allocator.available_slots(&store, "D001", QueueType::WalkIn))[0], "10:30");
    }

    #[test]
    fn test_emergency_ignores_other_doctors_and_finished_walk_ins() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        store.add(consultation("C001", "D002", "09:00", QueueType::WalkIn)).unwrap();
        store.add(consultation("C002", "D001", "09:00", QueueType::WalkIn)).unwrap();
        store.update_status("C002", ConsultationStatus::Completed);
        store.add(consultation("C003", "D001", "09:30", QueueType::Scheduled)).unwrap();

        let emergency = consultation("C004", "D001", "09:00", QueueType::Emergency);
        let taken = allocator.admit_emergency(&mut store, emergency).unwrap();

        assert_eq!(taken, slot("10:00"));
        assert_eq!(store.get("C001").unwrap().slot, slot("09:00"));
        assert_eq!(store.get("C003").unwrap().slot, slot("09:30"));
    }

    #[test]
    fn test_emergency_without_room_after_walk_in_takes_earliest_gap() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        let labels = allocator.grid().all_labels().to_vec();
        // Everything from 10:00 on is booked; the walk-in sits at 10:00.
        for (i, label) in labels.iter().enumerate().skip(2) {
            let queue_type = if i == 2 { QueueType::WalkIn } else { QueueType::Scheduled };
            store
                .add(consultation(&format!("C{:03}", i), "D001", &label.label(), queue_type))
                .unwrap();
        }

        let emergency = consultation("C900", "D001", "09:00", QueueType::Emergency);
        let taken = allocator.admit_emergency(&mut store, emergency).unwrap();
        assert_eq!(taken, slot("09:00"));
        assert_eq!(store.get("C002").unwrap().slot, slot("10:00"));
    }

    #[test]
    fn test_emergency_rejects_duplicate_without_moving_walk_in() {
        let allocator = SlotAllocator::default();
        let mut store = QueueStore::new();
        store.add(consultation("C001", "D001", "09:00", QueueType::WalkIn)).unwrap();

        let emergency = consultation("c001", "D001", "09:00", QueueType::Emergency);
        assert!(matches!(
            allocator.admit_emergency(&mut store, emergency),
            Err(ClinicError::DuplicateConsultation(_))
        ));
        assert_eq!(store.get("C001").unwrap().slot, slot("09:00"));

        let not_emergency = consultation("C002", "D001", "09:00", QueueType::WalkIn);
        assert!(allocator.admit_emergency(&mut store, not_emergency).is_err());
    }
}
