//! Quire: a small personal blog with a single-admin dashboard.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
