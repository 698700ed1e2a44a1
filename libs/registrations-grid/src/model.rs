use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cities offered by the entry form. The server accepts any non-empty city.
pub const CITIES: [&str; 4] = ["Riyadh", "Jeddah", "Dammam", "Makkah"];

/// A registration as received from the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Raw wire text; either a date or a date-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RegistrationRow {
    /// "first last", the string used for name search and name sort.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Calendar part of the date of birth (`YYYY-MM-DD` of a date-time).
    pub fn date_of_birth_date(&self) -> Option<&str> {
        let raw = self.date_of_birth.as_deref()?.trim();
        raw.split('T').next().filter(|d| !d.is_empty())
    }

    /// Date part of the date of birth, or "N/A" when absent.
    pub fn date_of_birth_display(&self) -> String {
        self.date_of_birth_date().unwrap_or("N/A").to_string()
    }
}

/// Candidate sent on create and update, exactly as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub email: String,
    pub phone: String,
    pub city: String,
}

impl From<&RegistrationRow> for RegistrationForm {
    /// Pre-fill an edit form from a listed row.
    fn from(row: &RegistrationRow) -> Self {
        Self {
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            date_of_birth: row.date_of_birth_date().unwrap_or_default().to_string(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            city: row.city.clone(),
        }
    }
}
