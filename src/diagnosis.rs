/// Keyword-based first-pass diagnosis from free-text symptoms.
const SYMPTOM_DIAGNOSES: [(&str, &str); 10] = [
    ("fever", "Fever"),
    ("cough", "Flu"),
    ("stomach ache", "Gastritis"),
    ("headache", "Migraine"),
    ("vomiting", "Food Poisoning"),
    ("dizziness", "Vertigo"),
    ("chest pain", "Heart Condition"),
    ("back pain", "Muscle Strain"),
    ("sore throat", "Tonsillitis"),
    ("fatigue", "Anemia"),
];

pub const DEFAULT_DIAGNOSIS: &str = "General Check-up";

/// First table entry whose keyword appears in `symptoms` wins.
pub fn classify(symptoms: &str) -> &'static str {
    let lower = symptoms.to_lowercase();
    SYMPTOM_DIAGNOSES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, diagnosis)| *diagnosis)
        .unwrap_or(DEFAULT_DIAGNOSIS)
}
