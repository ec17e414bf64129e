/// Read-only front-desk reporting: queue sizes, advisory waits, doctor load.
use crate::balancer::DoctorLoadBalancer;
use crate::models::QueueType;
use crate::queue::QueueStore;
use std::fmt;

/// Advisory waiting-time quotes. These are estimates only and are never
/// kept in sync with the queue after a consultation is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitEstimator {
    pub consultation_minutes: u32,
    pub emergency_minutes: u32,
    pub emergency_floor_minutes: u32,
}

impl WaitEstimator {
    /// Quote for a patient joining behind `queued` patients of the same type.
    pub fn estimate(&self, queue_type: QueueType, queued: usize) -> u32 {
        let queued = u32::try_from(queued).unwrap_or(u32::MAX);
        match queue_type {
            QueueType::Emergency => queued
                .saturating_mul(self.emergency_minutes)
                .max(self.emergency_floor_minutes),
            QueueType::WalkIn | QueueType::Scheduled => {
                queued.saturating_mul(self.consultation_minutes)
            }
        }
    }
}

impl Default for WaitEstimator {
    fn default() -> Self {
        WaitEstimator {
            consultation_minutes: 15,
            emergency_minutes: 10,
            emergency_floor_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorLoad {
    pub doctor_id: String,
    pub doctor_name: String,
    pub active: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueCount {
    pub queue_type: QueueType,
    pub patients: usize,
    pub estimated_wait_minutes: u32,
}

/// Snapshot of the whole queue for the front desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueReport {
    pub queues: Vec<QueueCount>,
    pub total: usize,
    pub doctors: Vec<DoctorLoad>,
}

impl QueueReport {
    pub fn build(
        store: &QueueStore,
        balancer: &DoctorLoadBalancer,
        estimator: &WaitEstimator,
    ) -> Self {
        let queues = QueueType::ALL
            .iter()
            .map(|&queue_type| {
                let patients = store.by_queue_type(queue_type).len();
                QueueCount {
                    queue_type,
                    patients,
                    estimated_wait_minutes: estimator.estimate(queue_type, patients),
                }
            })
            .collect();

        let doctors = balancer
            .doctors()
            .iter()
            .map(|doctor| DoctorLoad {
                doctor_id: doctor.id.clone(),
                doctor_name: doctor.name.clone(),
                active: balancer.active_count(store, &doctor.id),
                capacity: balancer.capacity(),
            })
            .collect();

        QueueReport {
            queues,
            total: store.len(),
            doctors,
        }
    }

    pub fn count(&self, queue_type: QueueType) -> usize {
        self.queues
            .iter()
            .find(|q| q.queue_type == queue_type)
            .map_or(0, |q| q.patients)
    }
}

fn queue_title(queue_type: QueueType) -> &'static str {
    match queue_type {
        QueueType::Emergency => "Emergency",
        QueueType::WalkIn => "Walk-in",
        QueueType::Scheduled => "Scheduled",
    }
}

impl fmt::Display for QueueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Multi-Level Queue Report ===")?;
        if self.total == 0 {
            return writeln!(f, "No consultations in queue.");
        }

        for queue in &self.queues {
            writeln!(f, "{} Queue: {} patients", queue_title(queue.queue_type), queue.patients)?;
        }
        writeln!(f, "Total: {} consultations", self.total)?;
        for queue in self.queues.iter().filter(|q| q.patients > 0) {
            writeln!(
                f,
                "{} waiting time: ~{} minutes",
                queue_title(queue.queue_type),
                queue.estimated_wait_minutes
            )?;
        }

        writeln!(f)?;
        writeln!(f, "=== Doctor Workload ===")?;
        for doctor in &self.doctors {
            writeln!(
                f,
                "{} ({}): {}/{} patients",
                doctor.doctor_name, doctor.doctor_id, doctor.active, doctor.capacity
            )?;
        }
        Ok(())
    }
}
