//! Commit Docs Server library.
//!
//! This library provides the core functionality for the commit documentation
//! server: GitHub OAuth, repository and commit mirroring, and AI article
//! generation backed by PostgreSQL.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_support;
