use clinicq::{
    ClinicClock, Consultation, ConsultationStatus, DispatchEngine, DoctorLoadBalancer, Doctor,
    Patient, QueueStore, QueueType, Slot, SlotAllocator, SlotGrid,
};

fn slot(label: &str) -> Slot {
    Slot::parse(label).unwrap()
}

fn consultation(id: &str, doctor: &str, at: &str, queue_type: QueueType) -> Consultation {
    Consultation::new(
        id.to_string(),
        Patient::new(format!("P-{}", id), "Casey Kumar".to_string()).unwrap(),
        &Doctor::new(doctor, "Dr. Smith"),
        slot(at),
        "dizziness".to_string(),
        queue_type,
    )
}

fn waiting_slots(store: &QueueStore, doctor: &str) -> Vec<Slot> {
    store
        .by_doctor(doctor)
        .into_iter()
        .filter(|c| c.status == ConsultationStatus::Waiting)
        .map(|c| c.slot)
        .collect()
}

fn assert_no_double_booking(store: &QueueStore) {
    for doctor in ["D001", "D002"] {
        let mut slots = waiting_slots(store, doctor);
        let before = slots.len();
        slots.sort();
        slots.dedup();
        assert_eq!(slots.len(), before, "doctor {} is double-booked", doctor);
    }
}

#[test]
fn emergency_swap_scenario() {
    let allocator = SlotAllocator::default();
    let dispatcher = DispatchEngine::default();
    let mut store = QueueStore::new();
    store.add_live(consultation("C001", "D001", "09:00", QueueType::WalkIn)).unwrap();
    store.add_live(consultation("C002", "D001", "09:30", QueueType::WalkIn)).unwrap();

    let waiting_before = waiting_slots(&store, "D001").len();
    let taken = allocator
        .admit_emergency(&mut store, consultation("E001", "D001", "09:00", QueueType::Emergency))
        .unwrap();

    assert_eq!(taken, slot("09:00"));
    assert_eq!(store.get("C001").unwrap().slot, slot("10:00"));
    assert_eq!(store.get("C002").unwrap().slot, slot("09:30"));
    assert_eq!(waiting_slots(&store, "D001").len(), waiting_before + 1);
    assert_no_double_booking(&store);

    let next = dispatcher.next_patient(&store, allocator.grid()).unwrap();
    assert_eq!(next.consultation_id, "E001");
}

#[test]
fn repeated_emergencies_keep_slots_unique() {
    let allocator = SlotAllocator::default();
    let mut store = QueueStore::new();
    store.add_live(consultation("C001", "D001", "09:00", QueueType::WalkIn)).unwrap();
    store.add_live(consultation("C002", "D001", "09:30", QueueType::WalkIn)).unwrap();
    store.add_scheduled(consultation("C003", "D001", "10:30", QueueType::Scheduled)).unwrap();

    let mut previous = store.get("C001").unwrap().slot;
    for n in 0..5 {
        let id = format!("E{:03}", n);
        allocator
            .admit_emergency(&mut store, consultation(&id, "D001", "09:00", QueueType::Emergency))
            .unwrap();
        assert_no_double_booking(&store);

        let displaced = store
            .live()
            .iter()
            .filter(|c| c.queue_type == QueueType::WalkIn)
            .map(|c| c.slot)
            .min()
            .unwrap();
        assert!(displaced >= previous);
        previous = displaced;
    }
    assert_eq!(store.get("C003").unwrap().slot, slot("10:30"));
}

#[test]
fn dispatch_priority_emergency_first() {
    let engine = DispatchEngine::new(ClinicClock::Fixed(slot("12:00")));
    let grid = SlotGrid::standard();
    let mut store = QueueStore::new();
    store.add_scheduled(consultation("C001", "D001", "09:00", QueueType::Scheduled)).unwrap();
    store.add_live(consultation("C002", "D001", "09:30", QueueType::WalkIn)).unwrap();
    store.add_live(consultation("C003", "D001", "10:00", QueueType::Emergency)).unwrap();

    assert_eq!(engine.next_patient(&store, &grid).unwrap().consultation_id, "C003");
    store.update_status("C003", ConsultationStatus::Completed);
    assert_eq!(engine.next_patient(&store, &grid).unwrap().consultation_id, "C001");
    store.update_status("C001", ConsultationStatus::Completed);
    assert_eq!(engine.next_patient(&store, &grid).unwrap().consultation_id, "C002");
    store.update_status("C002", ConsultationStatus::Completed);
    assert!(engine.next_patient(&store, &grid).is_none());
}

#[test]
fn afternoon_appointment_does_not_jump_morning_walk_in() {
    let engine = DispatchEngine::default();
    let grid = SlotGrid::standard();
    let mut store = QueueStore::new();
    store.add_scheduled(consultation("C001", "D002", "15:00", QueueType::Scheduled)).unwrap();
    store.add_live(consultation("C002", "D001", "09:30", QueueType::WalkIn)).unwrap();
    store.add_live(consultation("C003", "D001", "10:00", QueueType::WalkIn)).unwrap();

    for expected in ["C002", "C003"] {
        let next = engine.next_patient(&store, &grid).unwrap();
        assert_ne!(next.consultation_id, "C001");
        assert_eq!(next.consultation_id, expected);
        let id = next.consultation_id.clone();
        store.update_status(&id, ConsultationStatus::Completed);
    }
}

#[test]
fn round_robin_fairness() {
    let mut balancer = DoctorLoadBalancer::default();
    let allocator = SlotAllocator::default();
    let mut store = QueueStore::new();

    let mut sequence = Vec::new();
    for n in 0..4 {
        let doctor = balancer.assign(&store).clone();
        let at = allocator.assign_walk_in_slot(&store, &doctor.id).unwrap();
        store
            .add_live(consultation(&format!("C{:03}", n), &doctor.id, &at.label(), QueueType::WalkIn))
            .unwrap();
        sequence.push(doctor.id);
    }
    assert_eq!(sequence, vec!["D001", "D002", "D001", "D002"]);
    assert!(!balancer.any_available(&store));
}

#[test]
fn removing_unknown_id_is_a_no_op() {
    let mut store = QueueStore::new();
    store.add_live(consultation("C001", "D001", "09:00", QueueType::WalkIn)).unwrap();
    assert!(!store.remove("C999"));
    assert_eq!(store.len(), 1);
}
