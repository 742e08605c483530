//! Application services layer.

pub mod admin;
pub mod chrome;
pub mod contact;
pub mod error;
pub mod feed;
pub mod pagination;
pub mod repos;
pub mod session;
