//! Repository layer for database persistence.
//!
//! Database access uses Diesel ORM with compile-time query checking and
//! supports SQLite and (with the `postgres` feature) PostgreSQL.

pub mod diesel_analysis;
pub mod diesel_context;
pub mod memory;
pub mod models;
pub mod pool;
pub mod util;

pub use diesel_analysis::DieselAnalysisRepository;
pub use diesel_context::DieselDbContext;
pub use memory::MemoryAnalysisRepository;
pub use pool::{DbPool, DieselError};
