use async_trait::async_trait;
use time::Date;

use crate::application::repos::{ContactsRepo, CreateContactParams, RepoError};
use crate::domain::entities::ContactRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: i64,
    name: String,
    phone: String,
    email: String,
    message: String,
    submitted_on: Date,
}

impl From<ContactRow> for ContactRecord {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            message: row.message,
            submitted_on: row.submitted_on,
        }
    }
}

#[async_trait]
impl ContactsRepo for PostgresRepositories {
    async fn insert_contact(
        &self,
        params: CreateContactParams,
    ) -> Result<ContactRecord, RepoError> {
        let row = sqlx::query_as::<_, ContactRow>(
            "INSERT INTO contacts (name, phone, email, message, submitted_on) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, phone, email, message, submitted_on",
        )
        .bind(&params.name)
        .bind(&params.phone)
        .bind(&params.email)
        .bind(&params.message)
        .bind(params.submitted_on)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ContactRecord::from(row))
    }
}
