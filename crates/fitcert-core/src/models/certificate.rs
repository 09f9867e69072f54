//! Certificate data model.
//!
//! The record mirrors the external JSON shape consumed by downstream
//! systems, so the serde names here are load-bearing: `examinationType`
//! and friends are camelCase while `id_number`, `exam_date`,
//! `expiry_date` and `review_date` stay snake_case.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExtractionError, Result};

/// The nine-member medical test battery.
///
/// Each member carries the label variants seen on scanned certificates;
/// detection matches any of them. Serialized keys are camelCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestItem {
    Blood,
    Vision,
    DepthVision,
    NightVision,
    Hearing,
    Heights,
    Lung,
    Xray,
    DrugScreen,
}

impl TestItem {
    /// All members in canonical (serialization) order.
    pub const ALL: [TestItem; 9] = [
        TestItem::Blood,
        TestItem::Vision,
        TestItem::DepthVision,
        TestItem::NightVision,
        TestItem::Hearing,
        TestItem::Heights,
        TestItem::Lung,
        TestItem::Xray,
        TestItem::DrugScreen,
    ];

    /// Canonical key used in the serialized record.
    pub fn key(&self) -> &'static str {
        match self {
            TestItem::Blood => "blood",
            TestItem::Vision => "vision",
            TestItem::DepthVision => "depthVision",
            TestItem::NightVision => "nightVision",
            TestItem::Hearing => "hearing",
            TestItem::Heights => "heights",
            TestItem::Lung => "lung",
            TestItem::Xray => "xray",
            TestItem::DrugScreen => "drugScreen",
        }
    }

    /// Label variants this test appears under in certificate text.
    pub fn alternate_names(&self) -> &'static [&'static str] {
        match self {
            TestItem::Blood => &["BLOODS", "Bloods", "Blood Test", "Blood Tests"],
            TestItem::Vision => &["FAR, NEAR VISION", "Far, Near Vision", "FAR & NEAR VISION"],
            TestItem::DepthVision => &["SIDE & DEPTH", "Side & Depth", "SIDE AND DEPTH"],
            TestItem::NightVision => &["NIGHT VISION", "Night Vision"],
            TestItem::Hearing => &["HEARING", "Hearing"],
            // bare "Heights" belongs to the restriction of the same name
            TestItem::Heights => &["WORKING AT HEIGHTS", "Working at Heights"],
            TestItem::Lung => &["LUNG FUNCTION", "Lung Function"],
            TestItem::Xray => &["X-RAY", "X-Ray", "X Ray", "XRAY"],
            TestItem::DrugScreen => &["DRUG SCREEN", "Drug Screen", "Drug Screening"],
        }
    }

    /// Parse a canonical or legacy snake_case key.
    pub fn from_key(key: &str) -> Option<TestItem> {
        match key {
            "blood" => Some(TestItem::Blood),
            "vision" => Some(TestItem::Vision),
            "depthVision" | "depth_vision" => Some(TestItem::DepthVision),
            "nightVision" | "night_vision" => Some(TestItem::NightVision),
            "hearing" => Some(TestItem::Hearing),
            "heights" => Some(TestItem::Heights),
            "lung" => Some(TestItem::Lung),
            "xray" | "x_ray" => Some(TestItem::Xray),
            "drugScreen" | "drug_screen" => Some(TestItem::DrugScreen),
            _ => None,
        }
    }

    /// Vision-family tests accept Snellen fraction / "Normal" cues as
    /// completion evidence.
    pub fn is_vision_family(&self) -> bool {
        matches!(
            self,
            TestItem::Vision | TestItem::DepthVision | TestItem::NightVision
        )
    }
}

impl fmt::Display for TestItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The eight-member workplace restriction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestrictionItem {
    Heights,
    Dust,
    Motorized,
    HearingProtection,
    ConfinedSpaces,
    Chemical,
    Spectacles,
    Treatment,
}

impl RestrictionItem {
    /// All members in canonical (serialization) order.
    pub const ALL: [RestrictionItem; 8] = [
        RestrictionItem::Heights,
        RestrictionItem::Dust,
        RestrictionItem::Motorized,
        RestrictionItem::HearingProtection,
        RestrictionItem::ConfinedSpaces,
        RestrictionItem::Chemical,
        RestrictionItem::Spectacles,
        RestrictionItem::Treatment,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RestrictionItem::Heights => "heights",
            RestrictionItem::Dust => "dust",
            RestrictionItem::Motorized => "motorized",
            RestrictionItem::HearingProtection => "hearingProtection",
            RestrictionItem::ConfinedSpaces => "confinedSpaces",
            RestrictionItem::Chemical => "chemical",
            RestrictionItem::Spectacles => "spectacles",
            RestrictionItem::Treatment => "treatment",
        }
    }

    pub fn alternate_names(&self) -> &'static [&'static str] {
        match self {
            RestrictionItem::Heights => &["Heights"],
            RestrictionItem::Dust => &["Dust Exposure", "Dust"],
            RestrictionItem::Motorized => &["Motorized Equipment", "Motorised Equipment"],
            RestrictionItem::HearingProtection => {
                &["Wear Hearing Protection", "Hearing Protection"]
            }
            RestrictionItem::ConfinedSpaces => &["Confined Spaces", "Confined Space"],
            RestrictionItem::Chemical => &["Chemical Exposure", "Chemicals"],
            RestrictionItem::Spectacles => &["Wear Spectacles", "Spectacles"],
            RestrictionItem::Treatment => &[
                "Remain on Treatment for Chronic Conditions",
                "Remain on Treatment",
                "Chronic Conditions",
            ],
        }
    }

    pub fn from_key(key: &str) -> Option<RestrictionItem> {
        match key {
            "heights" => Some(RestrictionItem::Heights),
            "dust" => Some(RestrictionItem::Dust),
            "motorized" => Some(RestrictionItem::Motorized),
            "hearingProtection" | "hearing_protection" => Some(RestrictionItem::HearingProtection),
            "confinedSpaces" | "confined_spaces" => Some(RestrictionItem::ConfinedSpaces),
            "chemical" => Some(RestrictionItem::Chemical),
            "spectacles" => Some(RestrictionItem::Spectacles),
            "treatment" => Some(RestrictionItem::Treatment),
            _ => None,
        }
    }
}

impl fmt::Display for RestrictionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Overall fitness verdict. Declaration order is the match order:
/// the first member with positive evidence wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FitnessDeclaration {
    Fit,
    FitWithRestriction,
    FitWithCondition,
    TemporaryUnfit,
    Unfit,
}

impl FitnessDeclaration {
    /// All members in match order.
    pub const ALL: [FitnessDeclaration; 5] = [
        FitnessDeclaration::Fit,
        FitnessDeclaration::FitWithRestriction,
        FitnessDeclaration::FitWithCondition,
        FitnessDeclaration::TemporaryUnfit,
        FitnessDeclaration::Unfit,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FitnessDeclaration::Fit => "fit",
            FitnessDeclaration::FitWithRestriction => "fitWithRestriction",
            FitnessDeclaration::FitWithCondition => "fitWithCondition",
            FitnessDeclaration::TemporaryUnfit => "temporaryUnfit",
            FitnessDeclaration::Unfit => "unfit",
        }
    }

    pub fn from_key(key: &str) -> Option<FitnessDeclaration> {
        match key {
            "fit" => Some(FitnessDeclaration::Fit),
            "fitWithRestriction" | "fit_with_restriction" => {
                Some(FitnessDeclaration::FitWithRestriction)
            }
            "fitWithCondition" | "fit_with_condition" => Some(FitnessDeclaration::FitWithCondition),
            "temporaryUnfit" | "temporary_unfit" => Some(FitnessDeclaration::TemporaryUnfit),
            "unfit" => Some(FitnessDeclaration::Unfit),
            _ => None,
        }
    }

    pub fn alternate_names(&self) -> &'static [&'static str] {
        match self {
            FitnessDeclaration::Fit => &["FIT", "Fit for Work", "Fit for Duty"],
            FitnessDeclaration::FitWithRestriction => {
                &["Fit with Restriction", "FIT WITH RESTRICTION", "Fit with Restrictions"]
            }
            FitnessDeclaration::FitWithCondition => {
                &["Fit with Condition", "FIT WITH CONDITION", "Fit with Conditions"]
            }
            FitnessDeclaration::TemporaryUnfit => {
                &["Temporary Unfit", "TEMPORARY UNFIT", "Temporarily Unfit"]
            }
            FitnessDeclaration::Unfit => &["UNFIT", "Unfit for Work", "Unfit for Duty"],
        }
    }
}

impl fmt::Display for FitnessDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Kind of examination the certificate records. Declaration order is
/// the match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExaminationType {
    #[serde(rename = "pre-employment")]
    PreEmployment,
    #[serde(rename = "periodical")]
    Periodical,
    #[serde(rename = "exit")]
    Exit,
}

impl ExaminationType {
    /// All members in match order.
    pub const ALL: [ExaminationType; 3] = [
        ExaminationType::PreEmployment,
        ExaminationType::Periodical,
        ExaminationType::Exit,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ExaminationType::PreEmployment => "pre-employment",
            ExaminationType::Periodical => "periodical",
            ExaminationType::Exit => "exit",
        }
    }

    pub fn from_key(key: &str) -> Option<ExaminationType> {
        match key {
            "pre-employment" | "preEmployment" | "pre_employment" => {
                Some(ExaminationType::PreEmployment)
            }
            "periodical" => Some(ExaminationType::Periodical),
            "exit" => Some(ExaminationType::Exit),
            _ => None,
        }
    }

    pub fn alternate_names(&self) -> &'static [&'static str] {
        match self {
            ExaminationType::PreEmployment => {
                &["PRE-EMPLOYMENT", "Pre-Employment", "PRE EMPLOYMENT", "Pre Employment"]
            }
            ExaminationType::Periodical => &["PERIODICAL", "Periodical", "PERIODIC", "Periodic"],
            ExaminationType::Exit => &["EXIT", "Exit"],
        }
    }
}

impl fmt::Display for ExaminationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Normalized extraction result for one certificate document.
///
/// Every field is always present. Scalars default to empty strings,
/// the test and restriction maps to the full key set with `false`
/// values. `BTreeMap` keeps serialization order deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub exam_date: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub job: String,
    #[serde(rename = "examinationType", default)]
    pub examination_type: String,
    #[serde(rename = "medicalExams", default)]
    pub medical_exams: BTreeMap<TestItem, bool>,
    #[serde(rename = "medicalResults", default)]
    pub medical_results: BTreeMap<TestItem, String>,
    #[serde(default)]
    pub restrictions: BTreeMap<RestrictionItem, bool>,
    #[serde(rename = "fitnessDeclaration", default)]
    pub fitness_declaration: String,
    #[serde(default)]
    pub referral: String,
    #[serde(default)]
    pub review_date: String,
    #[serde(default)]
    pub comments: String,
}

impl CertificateRecord {
    /// A record with empty scalars and the complete default-false test
    /// and restriction maps.
    pub fn new() -> Self {
        CertificateRecord {
            name: String::new(),
            id_number: String::new(),
            company: String::new(),
            exam_date: String::new(),
            expiry_date: String::new(),
            job: String::new(),
            examination_type: String::new(),
            medical_exams: TestItem::ALL.iter().map(|t| (*t, false)).collect(),
            medical_results: BTreeMap::new(),
            restrictions: RestrictionItem::ALL.iter().map(|r| (*r, false)).collect(),
            fitness_declaration: String::new(),
            referral: String::new(),
            review_date: String::new(),
            comments: String::new(),
        }
    }

    /// Minimal record emitted when extraction fails catastrophically:
    /// today's date as the exam date, a diagnostic in `comments`, and
    /// empty enumerable maps.
    pub fn fallback(diagnostic: &str) -> Self {
        CertificateRecord {
            exam_date: crate::normalize::today_stamp(),
            comments: diagnostic.to_string(),
            medical_exams: BTreeMap::new(),
            restrictions: BTreeMap::new(),
            ..CertificateRecord::new()
        }
    }

    /// Fills in any test or restriction keys a partial record is
    /// missing, with `false`.
    pub fn close_defaults(&mut self) {
        for test in TestItem::ALL {
            self.medical_exams.entry(test).or_insert(false);
        }
        for restriction in RestrictionItem::ALL {
            self.restrictions.entry(restriction).or_insert(false);
        }
    }

    /// Required scalar fields that are still empty. Advisory only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let required: [(&str, &String); 6] = [
            ("name", &self.name),
            ("id_number", &self.id_number),
            ("company", &self.company),
            ("exam_date", &self.exam_date),
            ("expiry_date", &self.expiry_date),
            ("job", &self.job),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                missing.push(label);
            }
        }
        missing
    }
}

impl Default for CertificateRecord {
    fn default() -> Self {
        CertificateRecord::new()
    }
}

/// Top-level aliases accepted by [`map_to_certificate_fields`]:
/// legacy snake_case / camelCase spellings mapped to the canonical
/// serialized names.
const FIELD_ALIASES: [(&str, &str); 9] = [
    ("examination_type", "examinationType"),
    ("medical_exams", "medicalExams"),
    ("medical_results", "medicalResults"),
    ("fitness_declaration", "fitnessDeclaration"),
    ("idNumber", "id_number"),
    ("examDate", "exam_date"),
    ("expiryDate", "expiry_date"),
    ("reviewDate", "review_date"),
    ("jobTitle", "job"),
];

/// Translates an already-shaped record that differs from the canonical
/// shape only in key casing into a [`CertificateRecord`]. A canonical
/// object passes through unchanged. Unknown keys are dropped.
pub fn map_to_certificate_fields(value: Value) -> Result<CertificateRecord> {
    let Value::Object(map) = value else {
        return Err(ExtractionError::Malformed(
            "certificate payload is not a JSON object".to_string(),
        ));
    };

    let mut canonical = serde_json::Map::new();
    for (key, value) in map {
        let key = FIELD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or(key);
        let value = match key.as_str() {
            "medicalExams" | "restrictions" => filter_enum_map(value, false),
            "medicalResults" => filter_enum_map(value, true),
            "fitnessDeclaration" => canonical_fitness_value(value),
            "examinationType" => canonical_examination_value(value),
            other if is_scalar_field(other) => coerce_scalar(value),
            _ => value,
        };
        canonical.insert(key, value);
    }

    let mut record: CertificateRecord = serde_json::from_value(Value::Object(canonical))
        .map_err(|e| ExtractionError::Malformed(e.to_string()))?;
    record.close_defaults();
    Ok(record)
}

fn is_scalar_field(name: &str) -> bool {
    matches!(
        name,
        "name"
            | "id_number"
            | "company"
            | "exam_date"
            | "expiry_date"
            | "job"
            | "referral"
            | "review_date"
            | "comments"
    )
}

/// Drops unknown keys from a test/restriction map and coerces values so
/// that legacy payloads with extra entries still deserialize.
fn filter_enum_map(value: Value, string_values: bool) -> Value {
    let Value::Object(map) = value else {
        return Value::Object(serde_json::Map::new());
    };
    let mut out = serde_json::Map::new();
    for (key, value) in map {
        let canonical = TestItem::from_key(&key)
            .map(|t| t.key().to_string())
            .or_else(|| RestrictionItem::from_key(&key).map(|r| r.key().to_string()));
        let Some(canonical) = canonical else { continue };
        if string_values {
            if let Value::String(_) = value {
                out.insert(canonical, value);
            }
        } else if let Value::Bool(_) = value {
            out.insert(canonical, value);
        }
    }
    Value::Object(out)
}

fn canonical_fitness_value(value: Value) -> Value {
    match value {
        Value::String(s) => match FitnessDeclaration::from_key(&s) {
            Some(decl) => Value::String(decl.key().to_string()),
            None => Value::String(s),
        },
        _ => Value::String(String::new()),
    }
}

fn canonical_examination_value(value: Value) -> Value {
    match value {
        Value::String(s) => match ExaminationType::from_key(&s) {
            Some(kind) => Value::String(kind.key().to_string()),
            None => Value::String(s),
        },
        _ => Value::String(String::new()),
    }
}

fn coerce_scalar(value: Value) -> Value {
    match value {
        Value::String(_) => value,
        Value::Null => Value::String(String::new()),
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_item_keys_are_camel_case() {
        assert_eq!(
            serde_json::to_string(&TestItem::DepthVision).unwrap(),
            "\"depthVision\""
        );
        assert_eq!(serde_json::to_string(&TestItem::Xray).unwrap(), "\"xray\"");
        assert_eq!(
            serde_json::to_string(&TestItem::DrugScreen).unwrap(),
            "\"drugScreen\""
        );
    }

    #[test]
    fn restriction_keys_round_trip() {
        for restriction in RestrictionItem::ALL {
            assert_eq!(RestrictionItem::from_key(restriction.key()), Some(restriction));
        }
    }

    #[test]
    fn new_record_has_full_default_maps() {
        let record = CertificateRecord::new();
        assert_eq!(record.medical_exams.len(), 9);
        assert_eq!(record.restrictions.len(), 8);
        assert!(record.medical_exams.values().all(|done| !done));
        assert!(record.restrictions.values().all(|applied| !applied));
        assert!(record.medical_results.is_empty());
    }

    #[test]
    fn record_serializes_with_external_field_names() {
        let record = CertificateRecord::new();
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        for name in [
            "name",
            "id_number",
            "company",
            "exam_date",
            "expiry_date",
            "job",
            "examinationType",
            "medicalExams",
            "medicalResults",
            "restrictions",
            "fitnessDeclaration",
            "referral",
            "review_date",
            "comments",
        ] {
            assert!(object.contains_key(name), "missing field {name}");
        }
        assert_eq!(object.len(), 14);
    }

    #[test]
    fn serialization_is_deterministic() {
        let mut record = CertificateRecord::new();
        record.medical_exams.insert(TestItem::Hearing, true);
        record.restrictions.insert(RestrictionItem::Dust, true);
        let first = serde_json::to_string(&record).unwrap();
        let second = serde_json::to_string(&record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn maps_legacy_snake_case_shape() {
        let legacy = json!({
            "name": "J. Doe",
            "idNumber": "8501015800085",
            "examination_type": "pre-employment",
            "medical_exams": { "depth_vision": true, "blood": true, "bogus": true },
            "fitness_declaration": "fit_with_restriction",
        });
        let record = map_to_certificate_fields(legacy).unwrap();
        assert_eq!(record.name, "J. Doe");
        assert_eq!(record.id_number, "8501015800085");
        assert_eq!(record.examination_type, "pre-employment");
        assert_eq!(record.fitness_declaration, "fitWithRestriction");
        assert_eq!(record.medical_exams[&TestItem::DepthVision], true);
        assert_eq!(record.medical_exams[&TestItem::Blood], true);
        // unknown map keys dropped, remaining keys closed to false
        assert_eq!(record.medical_exams.len(), 9);
        assert_eq!(record.medical_exams[&TestItem::Hearing], false);
    }

    #[test]
    fn canonical_shape_passes_through_unchanged() {
        let mut record = CertificateRecord::new();
        record.name = "A. Worker".to_string();
        record.fitness_declaration = "fit".to_string();
        record.medical_results.insert(TestItem::Vision, "20/20".to_string());
        let round_tripped =
            map_to_certificate_fields(serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(round_tripped, record);
    }

    #[test]
    fn rejects_non_object_payload() {
        assert!(map_to_certificate_fields(json!("certificate")).is_err());
        assert!(map_to_certificate_fields(json!(42)).is_err());
    }
}
