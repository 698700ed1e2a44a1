//! Field-level acceptance rules for registration candidates.
//!
//! Every rule runs independently and all violations are reported together,
//! one message per field, keyed by the camelCase wire name.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateEmail;

use crate::contract::model::{NewRegistration, ValidRegistration};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const DATE_OF_BIRTH: &str = "dateOfBirth";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";
pub const CITY: &str = "city";

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 30;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("phone pattern compiles"));

/// Field name → human-readable message, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message; the first message for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.insert(field, message);
        }
        errors
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Validate a candidate against `today` (the service clock's UTC date).
pub fn validate(
    candidate: &NewRegistration,
    today: NaiveDate,
) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let first_name = check_name(&mut errors, FIRST_NAME, "First name", &candidate.first_name);
    let last_name = check_name(&mut errors, LAST_NAME, "Last name", &candidate.last_name);
    let date_of_birth = check_date_of_birth(&mut errors, &candidate.date_of_birth, today);
    let email = check_email(&mut errors, &candidate.email);
    let phone = check_phone(&mut errors, &candidate.phone);
    let city = check_city(&mut errors, &candidate.city);

    match (first_name, last_name, date_of_birth, email, phone, city) {
        (
            Some(first_name),
            Some(last_name),
            Some(date_of_birth),
            Some(email),
            Some(phone),
            Some(city),
        ) if errors.is_empty() => {
            Ok(ValidRegistration {
                first_name,
                last_name,
                date_of_birth,
                email,
                phone,
                city,
            })
        }
        _ => Err(errors),
    }
}

fn required<'a>(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    raw: &'a Option<String>,
) -> Option<&'a str> {
    match raw.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.insert(field, format!("{label} is required"));
            None
        }
    }
}

fn check_name(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    raw: &Option<String>,
) -> Option<String> {
    let value = required(errors, field, label, raw)?;
    let len = value.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        errors.insert(
            field,
            format!("{label} must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"),
        );
        return None;
    }
    Some(value.to_string())
}

fn check_date_of_birth(
    errors: &mut FieldErrors,
    raw: &Option<String>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let value = required(errors, DATE_OF_BIRTH, "Date of birth", raw)?;
    let Some(date) = parse_date(value) else {
        errors.insert(DATE_OF_BIRTH, "Date of birth must be a valid date (YYYY-MM-DD)");
        return None;
    };
    if date >= today {
        errors.insert(DATE_OF_BIRTH, "Date of birth must be in the past");
        return None;
    }
    Some(date)
}

fn check_email(errors: &mut FieldErrors, raw: &Option<String>) -> Option<String> {
    let value = required(errors, EMAIL, "Email", raw)?;
    if !value.validate_email() {
        errors.insert(EMAIL, "Email must be a valid email address");
        return None;
    }
    Some(value.to_string())
}

fn check_phone(errors: &mut FieldErrors, raw: &Option<String>) -> Option<String> {
    let value = required(errors, PHONE, "Phone", raw)?;
    if !PHONE_RE.is_match(value) {
        errors.insert(
            PHONE,
            "Phone must contain 8 to 15 digits, optionally prefixed with '+'",
        );
        return None;
    }
    Some(value.to_string())
}

fn check_city(errors: &mut FieldErrors, raw: &Option<String>) -> Option<String> {
    required(errors, CITY, "City", raw).map(str::to_string)
}

/// Accepts `YYYY-MM-DD`, RFC 3339 date-times and offset-less ISO date-times.
/// Date-times contribute their calendar date as written.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|d| d.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn ana() -> NewRegistration {
        NewRegistration {
            first_name: Some("Ana".into()),
            last_name: Some("Lee".into()),
            date_of_birth: Some("1990-01-01".into()),
            email: Some("ana@x.com".into()),
            phone: Some("+12345678".into()),
            city: Some("Riyadh".into()),
        }
    }

    #[test]
    fn accepts_valid_candidate() {
        let valid = validate(&ana(), today()).unwrap();
        assert_eq!(valid.first_name, "Ana");
        assert_eq!(valid.last_name, "Lee");
        assert_eq!(
            valid.date_of_birth,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
        );
        assert_eq!(valid.phone, "+12345678");
        assert_eq!(valid.city, "Riyadh");
    }

    #[test]
    fn reports_every_missing_field_at_once() {
        let errors = validate(&NewRegistration::default(), today()).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert_eq!(errors.get(FIRST_NAME), Some("First name is required"));
        assert_eq!(errors.get(LAST_NAME), Some("Last name is required"));
        assert_eq!(errors.get(DATE_OF_BIRTH), Some("Date of birth is required"));
        assert_eq!(errors.get(EMAIL), Some("Email is required"));
        assert_eq!(errors.get(PHONE), Some("Phone is required"));
        assert_eq!(errors.get(CITY), Some("City is required"));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let mut c = ana();
        c.city = Some("   ".into());
        let errors = validate(&c, today()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(CITY));
    }

    #[test]
    fn name_length_bounds() {
        for (name, ok) in [
            ("A".to_string(), false),
            ("Al".to_string(), true),
            ("x".repeat(30), true),
            ("x".repeat(31), false),
            ("Ål".to_string(), true),
        ] {
            let mut c = ana();
            c.first_name = Some(name.clone());
            assert_eq!(validate(&c, today()).is_ok(), ok, "first name {name:?}");
        }
    }

    #[test]
    fn date_of_birth_must_be_strictly_in_the_past() {
        let mut c = ana();

        c.date_of_birth = Some("2024-06-15".into());
        let errors = validate(&c, today()).unwrap_err();
        assert_eq!(
            errors.get(DATE_OF_BIRTH),
            Some("Date of birth must be in the past")
        );

        c.date_of_birth = Some("2030-01-01".into());
        assert!(validate(&c, today()).unwrap_err().contains(DATE_OF_BIRTH));

        c.date_of_birth = Some("2024-06-14".into());
        assert!(validate(&c, today()).is_ok());
    }

    #[test]
    fn unparseable_date_is_reported() {
        let mut c = ana();
        c.date_of_birth = Some("01/02/1990".into());
        let errors = validate(&c, today()).unwrap_err();
        assert_eq!(
            errors.get(DATE_OF_BIRTH),
            Some("Date of birth must be a valid date (YYYY-MM-DD)")
        );
    }

    #[test]
    fn date_times_are_accepted() {
        let expected = NaiveDate::from_ymd_opt(1990, 1, 1);
        assert_eq!(parse_date("1990-01-01T00:00:00Z"), expected);
        assert_eq!(parse_date("1990-01-01T00:00:00"), expected);
        assert_eq!(parse_date("1990-01-01T10:30:00.123+03:00"), expected);
        assert_eq!(parse_date("1990-13-01"), None);
    }

    #[test]
    fn email_grammar() {
        for (email, ok) in [
            ("ana@x.com", true),
            ("first.last+tag@example.co.uk", true),
            ("ana", false),
            ("ana@", false),
            ("@x.com", false),
            ("ana x@x.com", false),
        ] {
            let mut c = ana();
            c.email = Some(email.into());
            assert_eq!(validate(&c, today()).is_ok(), ok, "email {email:?}");
        }
    }

    #[test]
    fn phone_pattern() {
        for (phone, ok) in [
            ("12345678", true),
            ("+966501234567", true),
            ("123456789012345", true),
            ("1234567", false),
            ("1234567890123456", false),
            ("++12345678", false),
            ("+1234-5678", false),
            ("phone123", false),
        ] {
            let mut c = ana();
            c.phone = Some(phone.into());
            assert_eq!(validate(&c, today()).is_ok(), ok, "phone {phone:?}");
        }
    }

    #[test]
    fn several_violations_are_reported_together() {
        let mut c = ana();
        c.first_name = Some("A".into());
        c.email = Some("not-an-email".into());
        c.date_of_birth = Some("2999-01-01".into());

        let errors = validate(&c, today()).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(FIRST_NAME));
        assert!(errors.contains(EMAIL));
        assert!(errors.contains(DATE_OF_BIRTH));
        assert!(!errors.contains(PHONE));
    }

    #[test]
    fn values_are_trimmed() {
        let mut c = ana();
        c.first_name = Some("  Ana ".into());
        c.city = Some(" Jeddah".into());
        let valid = validate(&c, today()).unwrap();
        assert_eq!(valid.first_name, "Ana");
        assert_eq!(valid.city, "Jeddah");
    }

    #[test]
    fn display_joins_messages() {
        let errors: FieldErrors = [
            (EMAIL.to_string(), "bad".to_string()),
            (CITY.to_string(), "missing".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(errors.to_string(), "city: missing; email: bad");
    }
}
