//! # texroom-entity
//!
//! Domain entity models for TexRoom. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow` so the PostgreSQL repositories can map rows directly.

pub mod room;
pub mod session;
pub mod user;
