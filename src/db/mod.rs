/// Database layer for the handles server
///
/// Pool construction and SQL helpers for the PostgreSQL provider.

pub mod postgres;

pub use postgres::{create_pool, quote_identifier, PostgresConfig};
