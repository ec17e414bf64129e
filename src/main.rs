/// Command-line front desk for the clinic scheduler.
///
/// This binary provides an interactive menu for admitting patients,
/// dispatching the next patient to a doctor, and inspecting the queues.
use clinicq::{
    create_admission_request, Clinic, ClinicConfig, Consultation, ConsultationStatus, QueueType,
};
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FIRST_NAMES: [&str; 8] = ["Alex", "Jordan", "Taylor", "Sam", "Casey", "Jamie", "Morgan", "Dylan"];
const LAST_NAMES: [&str; 8] = ["Lee", "Smith", "Ng", "Tan", "Kumar", "Lim", "Chong", "Ali"];

struct FrontDeskCLI {
    clinic: Clinic,
    next_patient_number: usize,
    running: bool,
}

impl FrontDeskCLI {
    fn new(clinic: Clinic) -> Self {
        FrontDeskCLI {
            clinic,
            next_patient_number: 1,
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       CLINIC FRONT DESK");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. Admit patient");
        println!("2. View all consultations");
        println!("3. Get next patient");
        println!("4. Complete next patient");
        println!("5. View queue by type");
        println!("6. View available slots");
        println!("7. Search by patient ID");
        println!("8. Search by doctor ID");
        println!("9. Search by symptoms");
        println!("10. Cancel consultation");
        println!("11. Remove consultation");
        println!("12. Reclassify consultation");
        println!("13. Queue report");
        println!("14. Run demo");
        println!("0. Exit");
        println!("{}", "-".repeat(20));
    }

    fn get_input(&self, prompt: &str, default: Option<&str>) -> String {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        let input = input.trim();

        if input.is_empty() {
            default.unwrap_or("").to_string()
        } else {
            input.to_string()
        }
    }

    fn get_int_input(&self, prompt: &str, default: Option<i32>) -> i32 {
        loop {
            let default_str = default.map(|d| d.to_string());
            let input = self.get_input(prompt, default_str.as_deref());

            if let Ok(value) = input.parse::<i32>() {
                return value;
            }
            println!("Please enter a valid number");
        }
    }

    fn choose_queue_type(&self) -> QueueType {
        println!("\nQueue types:");
        println!("  1. Emergency");
        println!("  2. Walk-in");
        println!("  3. Scheduled");
        match self.get_int_input("Select queue type", Some(2)) {
            1 => QueueType::Emergency,
            3 => QueueType::Scheduled,
            _ => QueueType::WalkIn,
        }
    }

    fn suggested_patient(&mut self) -> (String, String) {
        let n = self.next_patient_number;
        self.next_patient_number += 1;
        let name = format!(
            "{} {}",
            FIRST_NAMES[n % FIRST_NAMES.len()],
            LAST_NAMES[(n * 3) % LAST_NAMES.len()]
        );
        (format!("P{:03}", n), name)
    }

    fn print_consultations(&self, title: &str, consultations: &[&Consultation]) {
        if consultations.is_empty() {
            println!("\nNo consultations found.");
            return;
        }
        println!("\n=== {} ({}) ===", title, consultations.len());
        for consultation in consultations {
            println!("{}", consultation);
            if consultation.status == ConsultationStatus::Waiting {
                println!(
                    "   Estimated wait: {} minutes",
                    consultation.estimated_wait_minutes
                );
            }
        }
    }

    fn admit_patient(&mut self) {
        println!("\n--- Admit Patient ---");

        let (suggested_id, suggested_name) = self.suggested_patient();
        let patient_name = self.get_input("Patient name", Some(suggested_name.as_str()));
        let patient_id = if patient_name == suggested_name {
            self.get_input("Patient ID", Some(suggested_id.as_str()))
        } else {
            let generated = uuid::Uuid::new_v4().to_string()[..8].to_uppercase();
            self.get_input("Patient ID", Some(generated.as_str()))
        };
        let symptoms = self.get_input("Symptoms", None);
        let queue_type = self.choose_queue_type();

        let preferred = if queue_type == QueueType::Scheduled {
            Some(self.get_input("Preferred time (HH:MM, blank for earliest)", None))
        } else {
            None
        };

        let request = match create_admission_request(
            patient_id,
            patient_name.clone(),
            symptoms,
            queue_type.name(),
            preferred.as_deref(),
        ) {
            Ok(request) => request,
            Err(e) => {
                println!("\nError creating request: {}", e);
                return;
            }
        };

        match self.clinic.admit(request) {
            Ok(admission) => {
                println!("\nAdmitted {}", patient_name);
                println!("  Consultation ID: {}", admission.consultation_id);
                println!("  Doctor: {} ({})", admission.doctor_name, admission.doctor_id);
                println!("  Time slot: {}", admission.slot);
                println!("  Queue: {}", admission.queue_type);
                println!("  Auto-diagnosis: {}", admission.diagnosis);
                println!("  Estimated wait: {} minutes", admission.estimated_wait_minutes);
            }
            Err(e) => println!("\nAdmission refused: {}", e),
        }
    }

    fn view_all(&self) {
        let all: Vec<&Consultation> = self.clinic.store().iter().collect();
        self.print_consultations("All Consultations", &all);
    }

    fn show_next_patient(&self) {
        match self.clinic.next_patient() {
            Some(next) => {
                println!("\nNext patient to see: {}", next);
                println!("Estimated wait time: {} minutes", next.estimated_wait_minutes);
            }
            None => println!("\nNo patients ready to be seen."),
        }
    }

    fn complete_next_patient(&mut self) {
        match self.clinic.complete_next() {
            Some(id) => println!("\nConsultation {} completed", id),
            None => println!("\nNo patients ready to be seen."),
        }
    }

    fn view_queue_by_type(&self) {
        let queue_type = self.choose_queue_type();
        let consultations = self.clinic.store().by_queue_type(queue_type);
        self.print_consultations(&format!("{} Queue", queue_type), &consultations);
    }

    fn view_available_slots(&self) {
        let doctors = self.clinic.balancer().doctors().to_vec();
        let queue_type = self.choose_queue_type();

        for doctor in doctors {
            match self.clinic.available_slots(&doctor.id, queue_type) {
                Ok(slots) if slots.is_empty() => {
                    println!("\n{} ({}): no available time slots", doctor.name, doctor.id)
                }
                Ok(slots) => {
                    let labels: Vec<String> = slots.iter().map(|s| s.label()).collect();
                    println!("\n{} ({}): {}", doctor.name, doctor.id, labels.join(" "));
                }
                Err(e) => println!("\n{}", e),
            }
        }
    }

    fn search_by_patient(&self) {
        let patient_id = self.get_input("Patient ID", None);
        let found = self.clinic.store().by_patient(&patient_id);
        self.print_consultations("Patient Consultations", &found);
    }

    fn search_by_doctor(&self) {
        let doctor_id = self.get_input("Doctor ID", Some("D001"));
        let found = self.clinic.store().by_doctor(&doctor_id);
        self.print_consultations("Doctor Consultations", &found);
    }

    fn search_by_symptoms(&self) {
        let symptom = self.get_input("Symptom to search for", None);
        let found = self.clinic.store().by_symptom(&symptom);
        self.print_consultations(&format!("Consultations with '{}'", symptom), &found);
    }

    fn cancel_consultation(&mut self) {
        let id = self.get_input("Consultation ID to cancel", None);
        if self.clinic.cancel(&id) {
            println!("\nConsultation {} cancelled; its slot is free again", id);
        } else {
            println!("\nNo waiting consultation with that ID.");
        }
    }

    fn remove_consultation(&mut self) {
        let id = self.get_input("Consultation ID to remove", None);
        if self.clinic.remove(&id) {
            println!("\nConsultation removed successfully!");
        } else {
            println!("\nConsultation not found.");
        }
    }

    fn reclassify_consultation(&mut self) {
        let id = self.get_input("Consultation ID to reclassify", None);
        let queue_type = self.choose_queue_type();
        match self.clinic.reclassify(&id, queue_type) {
            Ok(slot) => println!("\n{} is now {} at {}", id, queue_type, slot),
            Err(e) => println!("\nReclassification failed: {}", e),
        }
    }

    fn run_demo(&mut self) {
        println!("\n--- Running Demo ---");

        let mut clinic = Clinic::default();
        let arrivals = [
            ("P101", "Alex Lee", "cough and sore throat", "walk_in"),
            ("P102", "Jordan Ng", "stomach ache", "walk_in"),
            ("P103", "Taylor Tan", "headache", "walk_in"),
            ("P104", "Sam Kumar", "severe chest pain", "emergency"),
        ];

        for (patient_id, name, symptoms, queue_type) in arrivals {
            let admitted = create_admission_request(
                patient_id.to_string(),
                name.to_string(),
                symptoms.to_string(),
                queue_type,
                None,
            )
            .and_then(|request| clinic.admit(request));
            match admitted {
                Ok(a) => println!(
                    "  [{:9}] {:12} -> {} at {} ({})",
                    a.queue_type.name(),
                    name,
                    a.doctor_name,
                    a.slot,
                    a.consultation_id
                ),
                Err(e) => println!("  {:12} refused: {}", name, e),
            }
        }

        println!("\nSchedule after the emergency arrived:");
        for doctor in clinic.balancer().doctors() {
            let mut booked = clinic.store().by_doctor(&doctor.id);
            booked.sort_by_key(|c| c.slot);
            for c in booked {
                println!("  {} {} {:9} {}", doctor.id, c.slot, c.queue_type.name(), c.patient.name);
            }
        }

        println!("\nDispatch order:");
        while let Some(id) = clinic.complete_next() {
            if let Some(c) = clinic.store().get(&id) {
                println!("  {} ({}) with {}", c.patient.name, c.queue_type.name(), c.doctor_name);
            }
        }

        println!("\nNote: Sam Kumar took the earliest walk-in's slot with their doctor,");
        println!("and that walk-in moved to the next free slot.");

        self.clinic = clinic;
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Enter choice", Some(14));

            match choice {
                1 => self.admit_patient(),
                2 => self.view_all(),
                3 => self.show_next_patient(),
                4 => self.complete_next_patient(),
                5 => self.view_queue_by_type(),
                6 => self.view_available_slots(),
                7 => self.search_by_patient(),
                8 => self.search_by_doctor(),
                9 => self.search_by_symptoms(),
                10 => self.cancel_consultation(),
                11 => self.remove_consultation(),
                12 => self.reclassify_consultation(),
                13 => println!("\n{}", self.clinic.report()),
                14 => self.run_demo(),
                0 => {
                    self.running = false;
                    println!("\nGoodbye!");
                }
                _ => println!("Invalid choice"),
            }
        }
    }
}

fn load_config() -> Result<ClinicConfig, clinicq::ConfigError> {
    match std::env::var("CLINIC_CONFIG") {
        Ok(path) => ClinicConfig::from_file(path),
        Err(_) => Ok(ClinicConfig::default()),
    }
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("clinicq=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    let clinic = match Clinic::from_config(&config) {
        Ok(clinic) => clinic,
        Err(e) => {
            eprintln!("Error setting up clinic: {}", e);
            std::process::exit(1);
        }
    };

    let mut cli = FrontDeskCLI::new(clinic);
    cli.run();
}
