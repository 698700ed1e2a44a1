use sea_orm::sea_query::SimpleExpr;

use crate::contract::model::Registration;
use crate::infra::storage::entity::{Col, RegistrationRow};

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            email: row.email,
            phone: row.phone,
            city: row.city,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Column/value pairs for every field of a document, `id` excluded.
pub fn document_values(doc: &Registration) -> [(Col, SimpleExpr); 8] {
    [
        (Col::FirstName, doc.first_name.clone().into()),
        (Col::LastName, doc.last_name.clone().into()),
        (Col::DateOfBirth, doc.date_of_birth.into()),
        (Col::Email, doc.email.clone().into()),
        (Col::Phone, doc.phone.clone().into()),
        (Col::City, doc.city.clone().into()),
        (Col::CreatedAt, doc.created_at.into()),
        (Col::UpdatedAt, doc.updated_at.into()),
    ]
}
