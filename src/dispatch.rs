/// Picks the next patient to be seen.
///
/// Priority is strict: waiting emergencies first, then scheduled
/// appointments that are due, then the earliest-slotted walk-in. A scheduled
/// appointment does not jump the walk-in queue just because it is scheduled;
/// it has to wait until the clinic clock reaches its slot.
use crate::error::{ClinicError, ClinicResult};
use crate::models::{ids_match, Consultation, ConsultationStatus, QueueType};
use crate::queue::QueueStore;
use crate::slots::{Slot, SlotGrid};
use tracing::debug;

/// Source of the clinic's notion of "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClinicClock {
    /// The earliest slot among waiting walk-ins and emergencies, or the
    /// opening slot when nobody is waiting.
    #[default]
    Inferred,
    /// A fixed time of day.
    Fixed(Slot),
}

impl ClinicClock {
    /// `inferred` or an `HH:MM` time.
    pub fn from_string(value: &str) -> ClinicResult<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("inferred") {
            return Ok(ClinicClock::Inferred);
        }
        Slot::parse(value).map(ClinicClock::Fixed).map_err(|_| {
            ClinicError::InvalidInput(format!(
                "clock must be 'inferred' or an HH:MM time, got '{}'",
                value
            ))
        })
    }

    pub fn now(&self, store: &QueueStore, grid: &SlotGrid) -> Slot {
        match self {
            ClinicClock::Inferred => store
                .live()
                .iter()
                .filter(|c| c.is_waiting())
                .map(|c| c.slot)
                .min()
                .unwrap_or_else(|| grid.first()),
            ClinicClock::Fixed(slot) => *slot,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchEngine {
    clock: ClinicClock,
}

impl DispatchEngine {
    pub fn new(clock: ClinicClock) -> Self {
        DispatchEngine { clock }
    }

    pub fn clock(&self) -> ClinicClock {
        self.clock
    }

    pub fn next_patient<'a>(
        &self,
        store: &'a QueueStore,
        grid: &SlotGrid,
    ) -> Option<&'a Consultation> {
        if let Some(emergency) = store
            .iter()
            .find(|c| c.queue_type == QueueType::Emergency && c.is_waiting())
        {
            debug!("Dispatching emergency {}", emergency.consultation_id);
            return Some(emergency);
        }

        let now = self.clock.now(store, grid);
        if let Some(due) = store
            .scheduled()
            .iter()
            .filter(|c| c.is_waiting())
            .find(|c| Self::is_due_at(store, c, now))
        {
            debug!(
                "Dispatching scheduled {} at {} (clinic time {})",
                due.consultation_id, due.slot, now
            );
            return Some(due);
        }

        let walk_in = store
            .live()
            .iter()
            .filter(|c| c.queue_type == QueueType::WalkIn && c.is_waiting())
            .min_by_key(|c| c.slot);
        if let Some(walk_in) = walk_in {
            debug!("Dispatching walk-in {}", walk_in.consultation_id);
        }
        walk_in
    }

    /// Whether a scheduled appointment's turn has come.
    pub fn is_due(&self, store: &QueueStore, grid: &SlotGrid, consultation: &Consultation) -> bool {
        Self::is_due_at(store, consultation, self.clock.now(store, grid))
    }

    fn is_due_at(store: &QueueStore, consultation: &Consultation, now: Slot) -> bool {
        let previous_done = Self::previous_scheduled(store, consultation)
            .map_or(true, |prev| prev.status == ConsultationStatus::Completed);
        previous_done && now >= consultation.slot
    }

    /// The same doctor's scheduled appointment immediately before this one.
    fn previous_scheduled<'a>(
        store: &'a QueueStore,
        consultation: &Consultation,
    ) -> Option<&'a Consultation> {
        store
            .scheduled()
            .iter()
            .filter(|c| {
                c.belongs_to(&consultation.doctor_id)
                    && c.status.holds_slot()
                    && c.slot < consultation.slot
                    && !ids_match(&c.consultation_id, &consultation.consultation_id)
            })
            .max_by_key(|c| c.slot)
    }
}
