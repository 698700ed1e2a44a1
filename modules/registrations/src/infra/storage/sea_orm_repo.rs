//! SeaORM-backed repository implementation for the domain port.
//!
//! The collection name is only known at runtime, so statements are built with
//! `sea-query` against an `Alias` instead of a static entity. The struct is
//! generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or with a transaction.

use anyhow::Context;
use sea_orm::sea_query::{Alias, ColumnDef, Expr, Index, Order, Query, SimpleExpr, Table};
use sea_orm::{ConnectionTrait, DbErr, FromQueryResult, Statement};
use uuid::Uuid;

use crate::contract::model::{Registration, UnsavedRegistration};
use crate::domain::repo::RegistrationsRepository;
use crate::infra::storage::entity::{Col, RegistrationRow};
use crate::infra::storage::mapper::document_values;

/// SeaORM repository impl over one collection.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmRegistrationsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    collection: String,
}

impl<C> SeaOrmRegistrationsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C, collection: impl Into<String>) -> Self {
        Self {
            conn,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn table(&self) -> Alias {
        Alias::new(self.collection.as_str())
    }

    /// Create the collection and its `created_at` index when missing.
    pub async fn ensure_collection(&self) -> Result<(), DbErr> {
        let backend = self.conn.get_database_backend();

        let create = Table::create()
            .table(self.table())
            .if_not_exists()
            .col(ColumnDef::new(Col::Id).string().not_null().primary_key())
            .col(ColumnDef::new(Col::FirstName).string().not_null())
            .col(ColumnDef::new(Col::LastName).string().not_null())
            .col(ColumnDef::new(Col::DateOfBirth).date().not_null())
            .col(ColumnDef::new(Col::Email).string().not_null())
            .col(ColumnDef::new(Col::Phone).string().not_null())
            .col(ColumnDef::new(Col::City).string().not_null())
            .col(
                ColumnDef::new(Col::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Col::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();
        self.conn.execute(backend.build(&create)).await?;

        let index = Index::create()
            .if_not_exists()
            .name(format!("idx_{}_created_at", self.collection))
            .table(self.table())
            .col(Col::CreatedAt)
            .to_owned();
        self.conn.execute(backend.build(&index)).await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl<C> RegistrationsRepository for SeaOrmRegistrationsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_all(&self) -> anyhow::Result<Vec<Registration>> {
        let stmt = Query::select()
            .columns(Col::ALL)
            .from(self.table())
            .order_by(Col::CreatedAt, Order::Desc)
            .to_owned();
        let backend = self.conn.get_database_backend();

        let rows = RegistrationRow::find_by_statement(backend.build(&stmt))
            .all(&self.conn)
            .await
            .context("find_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Registration>> {
        let stmt = Query::select()
            .columns(Col::ALL)
            .from(self.table())
            .and_where(Expr::col(Col::Id).eq(id))
            .to_owned();
        let backend = self.conn.get_database_backend();

        let found = RegistrationRow::find_by_statement(backend.build(&stmt))
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, doc: UnsavedRegistration) -> anyhow::Result<Registration> {
        let created = doc.with_id(Uuid::new_v4().simple().to_string());

        let mut values: Vec<SimpleExpr> = vec![created.id.clone().into()];
        values.extend(document_values(&created).into_iter().map(|(_, v)| v));

        let mut stmt = Query::insert();
        stmt.into_table(self.table())
            .columns(Col::ALL)
            .values(values)
            .context("insert values rejected")?;
        let backend = self.conn.get_database_backend();

        self.conn
            .execute(backend.build(&stmt))
            .await
            .context("insert failed")?;
        Ok(created)
    }

    async fn replace(&self, id: &str, doc: &Registration) -> anyhow::Result<bool> {
        let stmt = Query::update()
            .table(self.table())
            .values(document_values(doc))
            .and_where(Expr::col(Col::Id).eq(id))
            .to_owned();
        let backend = self.conn.get_database_backend();

        let res = self
            .conn
            .execute(backend.build(&stmt))
            .await
            .context("replace failed")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        let stmt = Query::delete()
            .from_table(self.table())
            .and_where(Expr::col(Col::Id).eq(id))
            .to_owned();
        let backend = self.conn.get_database_backend();

        let res = self
            .conn
            .execute(backend.build(&stmt))
            .await
            .context("delete failed")?;
        Ok(res.rows_affected() > 0)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1"))
            .await
            .context("ping failed")?;
        Ok(())
    }
}
