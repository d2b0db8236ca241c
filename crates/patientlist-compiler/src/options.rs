//! Compiler configuration

use chrono::{Local, NaiveDate};

/// Concept class of coded diagnoses
pub const DIAGNOSIS_CONCEPT_CLASS_UUID: &str = "8d4918b0-c2cc-11de-8d13-0010c6dffd0f";

/// Format of date values in conditions
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Options that affect the compiled query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    today: Option<NaiveDate>,
    diagnosis_class_uuid: String,
    date_format: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            today: None,
            diagnosis_class_uuid: DIAGNOSIS_CONCEPT_CLASS_UUID.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the reference date used for ages and relative ranges
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_diagnosis_class(mut self, uuid: impl Into<String>) -> Self {
        self.diagnosis_class_uuid = uuid.into();
        self
    }

    /// `chrono` format string for date values
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Reference date, the local date unless fixed
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn diagnosis_class(&self) -> &str {
        &self.diagnosis_class_uuid
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), &self.date_format).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::default();
        assert_eq!(options.diagnosis_class(), DIAGNOSIS_CONCEPT_CLASS_UUID);
        assert_eq!(options.date_format(), "%Y-%m-%d");
    }

    #[test]
    fn test_parse_date_with_custom_format() {
        let options = CompilerOptions::new().with_date_format("%d/%m/%Y");
        assert_eq!(
            options.parse_date("14/03/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 14)
        );
        assert_eq!(options.parse_date("2024-03-14"), None);
    }

    #[test]
    fn test_fixed_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        assert_eq!(CompilerOptions::new().with_today(today).today(), today);
    }
}
