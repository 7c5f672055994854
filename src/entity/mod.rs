//! SeaORM entity definitions for PostgreSQL database.

pub mod commit;
pub mod repository;
pub mod user;
