//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub attachment: Option<String>,
    pub posted_on: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
    pub submitted_on: Date,
}
