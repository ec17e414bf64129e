use crate::balancer::{DoctorLoadBalancer, DEFAULT_DOCTOR_CAPACITY};
use crate::dispatch::ClinicClock;
use crate::error::ConfigError;
use crate::models::{ids_match, Doctor};
use crate::slots::{Slot, SlotGrid};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorConfig {
    pub id: String,
    pub name: String,
}

/// Clinic-wide settings, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    /// First slot of the day, `HH:MM`
    pub opening: String,

    /// Last slot of the day, `HH:MM`
    pub closing: String,

    pub slot_minutes: u32,

    /// Maximum waiting/in-progress patients per doctor
    pub doctor_capacity: usize,

    /// Advisory wait added per queued walk-in or scheduled patient
    pub consultation_minutes: u32,

    /// Advisory wait added per queued emergency
    pub emergency_minutes: u32,

    /// Emergencies are never quoted less than this
    pub emergency_floor_minutes: u32,

    /// "inferred" or a fixed `HH:MM`
    pub clock: String,

    pub doctors: Vec<DoctorConfig>,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        ClinicConfig {
            opening: "09:00".to_string(),
            closing: "17:00".to_string(),
            slot_minutes: 30,
            doctor_capacity: DEFAULT_DOCTOR_CAPACITY,
            consultation_minutes: 15,
            emergency_minutes: 10,
            emergency_floor_minutes: 5,
            clock: "inferred".to_string(),
            doctors: vec![
                DoctorConfig {
                    id: "D001".to_string(),
                    name: "Dr. Smith".to_string(),
                },
                DoctorConfig {
                    id: "D002".to_string(),
                    name: "Dr. Johnson".to_string(),
                },
            ],
        }
    }
}

impl ClinicConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ClinicConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid()?;
        self.clock()?;

        if self.doctor_capacity == 0 {
            return Err(ConfigError::Invalid(
                "doctor_capacity must be positive".to_string(),
            ));
        }
        if self.doctors.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one doctor is required".to_string(),
            ));
        }
        for (i, doctor) in self.doctors.iter().enumerate() {
            if doctor.id.trim().is_empty() {
                return Err(ConfigError::Invalid("doctor id cannot be empty".to_string()));
            }
            if self.doctors[..i].iter().any(|d| ids_match(&d.id, &doctor.id)) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate doctor id: {}",
                    doctor.id
                )));
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<SlotGrid, ConfigError> {
        let opening = Slot::parse(&self.opening).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let closing = Slot::parse(&self.closing).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        SlotGrid::new(opening, closing, self.slot_minutes)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn clock(&self) -> Result<ClinicClock, ConfigError> {
        ClinicClock::from_string(&self.clock).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn balancer(&self) -> Result<DoctorLoadBalancer, ConfigError> {
        let doctors = self
            .doctors
            .iter()
            .map(|d| Doctor::new(d.id.clone(), d.name.clone()))
            .collect();
        DoctorLoadBalancer::new(doctors, self.doctor_capacity)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
