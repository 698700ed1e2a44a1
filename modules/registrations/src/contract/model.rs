use chrono::{DateTime, NaiveDate, Utc};

/// Persisted registration as seen by other crates (no serde).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Opaque token assigned by the store; never parsed above the repository.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Replace every mutable field. `id` and `created_at` are untouched.
    pub fn overwrite(&mut self, fields: ValidRegistration, updated_at: DateTime<Utc>) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.date_of_birth = fields.date_of_birth;
        self.email = fields.email;
        self.phone = fields.phone;
        self.city = fields.city;
        self.updated_at = updated_at;
    }
}

/// Unvalidated candidate for create and update. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRegistration {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Raw date text: `YYYY-MM-DD` or an ISO date-time.
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

/// Candidate that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone: String,
    pub city: String,
}

/// Document handed to the repository for insert; the id is assigned there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavedRegistration {
    pub fields: ValidRegistration,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UnsavedRegistration {
    pub fn stamped(fields: ValidRegistration, now: DateTime<Utc>) -> Self {
        Self {
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(self, id: String) -> Registration {
        let f = self.fields;
        Registration {
            id,
            first_name: f.first_name,
            last_name: f.last_name,
            date_of_birth: f.date_of_birth,
            email: f.email,
            phone: f.phone,
            city: f.city,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
