use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DeriveIden, FromQueryResult};

/// Column names of a registration collection. The table name itself is
/// configurable, so statements pair these with a runtime `Alias`.
#[derive(DeriveIden, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Col {
    Id,
    FirstName,
    LastName,
    DateOfBirth,
    Email,
    Phone,
    City,
    CreatedAt,
    UpdatedAt,
}

impl Col {
    pub const ALL: [Col; 9] = [
        Col::Id,
        Col::FirstName,
        Col::LastName,
        Col::DateOfBirth,
        Col::Email,
        Col::Phone,
        Col::City,
        Col::CreatedAt,
        Col::UpdatedAt,
    ];
}

/// One stored document as read back from the collection.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct RegistrationRow {
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
