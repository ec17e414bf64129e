/// The fixed daily grid of consultation slots.
///
/// A slot is a start time on a 30-minute grid (09:00 through 17:00 by
/// default). Slots are wall-clock labels only: there is no date component.
use crate::error::{ClinicError, ClinicResult};
use chrono::{Duration, NaiveTime};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const LABEL_FORMAT: &str = "%H:%M";

/// A single slot label, e.g. `10:30`.
///
/// Ordering follows the time of day, which matches lexicographic order of the
/// zero-padded `HH:MM` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(NaiveTime);

impl Slot {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Slot)
    }

    /// Parse an `HH:MM` label.
    pub fn parse(label: &str) -> ClinicResult<Self> {
        NaiveTime::parse_from_str(label.trim(), LABEL_FORMAT)
            .map(Slot)
            .map_err(|_| ClinicError::InvalidInput(format!("'{}' is not an HH:MM time", label)))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn label(&self) -> String {
        self.0.format(LABEL_FORMAT).to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(LABEL_FORMAT))
    }
}

impl FromStr for Slot {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::parse(s)
    }
}

/// Ordered sequence of the day's slot labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    labels: Vec<Slot>,
}

impl SlotGrid {
    /// Build a grid from `opening` to `closing` inclusive.
    pub fn new(opening: Slot, closing: Slot, step_minutes: u32) -> ClinicResult<Self> {
        if step_minutes == 0 {
            return Err(ClinicError::InvalidInput(
                "slot length must be positive".to_string(),
            ));
        }
        if closing < opening {
            return Err(ClinicError::InvalidInput(format!(
                "closing time {} is before opening time {}",
                closing, opening
            )));
        }

        let step = Duration::minutes(i64::from(step_minutes));
        let mut labels = Vec::new();
        let mut current = opening.time();

        while current <= closing.time() {
            labels.push(Slot(current));
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            current = next;
        }

        Ok(SlotGrid { labels })
    }

    /// The canonical 17-slot day: 09:00 to 17:00 every 30 minutes.
    pub fn standard() -> Self {
        let opening = Slot::from_hm(9, 0).expect("09:00 is a valid time");
        let closing = Slot::from_hm(17, 0).expect("17:00 is a valid time");
        SlotGrid::new(opening, closing, 30).expect("standard grid parameters are valid")
    }

    pub fn all_labels(&self) -> &[Slot] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn first(&self) -> Slot {
        self.labels[0]
    }

    pub fn last(&self) -> Slot {
        self.labels[self.labels.len() - 1]
    }

    pub fn compare(a: &Slot, b: &Slot) -> Ordering {
        a.cmp(b)
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.position(slot).is_some()
    }

    pub fn position(&self, slot: &Slot) -> Option<usize> {
        self.labels.binary_search(slot).ok()
    }

    /// The slot after `slot`, clamped to the last slot of the day.
    pub fn next(&self, slot: &Slot) -> Slot {
        match self.position(slot) {
            Some(i) => self.labels[(i + 1).min(self.labels.len() - 1)],
            None => self
                .labels
                .iter()
                .copied()
                .find(|s| s > slot)
                .unwrap_or_else(|| self.last()),
        }
    }

    /// The slot before `slot`, clamped to the first slot of the day.
    pub fn previous(&self, slot: &Slot) -> Slot {
        match self.position(slot) {
            Some(i) => self.labels[i.saturating_sub(1)],
            None => self
                .labels
                .iter()
                .copied()
                .rev()
                .find(|s| s < slot)
                .unwrap_or_else(|| self.first()),
        }
    }

    /// Parse a label and require it to be on this grid.
    pub fn parse(&self, label: &str) -> ClinicResult<Slot> {
        let slot = Slot::parse(label)?;
        if !self.contains(&slot) {
            return Err(ClinicError::InvalidInput(format!(
                "{} is not one of today's slots",
                slot
            )));
        }
        Ok(slot)
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        SlotGrid::standard()
    }
}
