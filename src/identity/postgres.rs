/// PostgreSQL-backed DID provider
use crate::{
    config::PostgresProviderConfig,
    db::{self, quote_identifier},
    error::{HandlesError, HandlesResult},
    identity::{Did, DidProvider, Domain, Handle, ProviderHealth},
};
use async_trait::async_trait;
use sqlx::{postgres::PgConnection, Connection, PgPool};
use tracing::{debug, info};

/// Provider resolving handles from two relations
///
/// The DIDs relation holds `handle` and `did` columns; the domains relation
/// lists every `domain` this server has authority over. Every call acquires
/// a pooled connection and returns it when the guard drops, whichever way
/// the call exits.
#[derive(Debug, Clone)]
pub struct PostgresProvider {
    pool: PgPool,
    dids_table: String,
    domains_table: String,
}

impl PostgresProvider {
    /// Connect, ping, and optionally verify both relations are queryable
    pub async fn connect(config: &PostgresProviderConfig) -> HandlesResult<Self> {
        let pool = db::create_pool(&config.pool).await?;
        let provider = Self::from_pool(pool, &config.dids_table, &config.domains_table);

        let health = provider.health_check().await;
        if !health.healthy {
            return Err(HandlesError::Config(format!(
                "Database is not reachable: {}",
                health.detail
            )));
        }

        if config.verify_tables {
            provider.verify_tables().await?;
        }

        info!(
            dids_table = %config.dids_table,
            domains_table = %config.domains_table,
            "postgres_provider_ready"
        );

        Ok(provider)
    }

    /// Wrap an existing pool without any startup checks
    pub fn from_pool(pool: PgPool, dids_table: &str, domains_table: &str) -> Self {
        Self {
            pool,
            dids_table: quote_identifier(dids_table),
            domains_table: quote_identifier(domains_table),
        }
    }

    /// Check that both relations exist with the expected columns
    pub async fn verify_tables(&self) -> HandlesResult<()> {
        let mut conn = self.pool.acquire().await?;

        for sql in [
            format!("select handle, did from {} limit 0", self.dids_table),
            format!("select domain from {} limit 0", self.domains_table),
        ] {
            sqlx::query(&sql).execute(&mut *conn).await.map_err(|e| {
                HandlesError::Config(format!("Cannot access handle tables: {}", e))
            })?;
        }

        Ok(())
    }

    async fn domain_exists(&self, conn: &mut PgConnection, domain: &Domain) -> HandlesResult<bool> {
        let sql = format!(
            "select exists(select 1 from {} where domain = $1)",
            self.domains_table
        );

        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(domain.as_str())
            .fetch_one(conn)
            .await?;

        Ok(exists)
    }
}

#[async_trait]
impl DidProvider for PostgresProvider {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn can_resolve(&self, domain: &Domain) -> HandlesResult<bool> {
        let mut conn = self.pool.acquire().await?;
        self.domain_exists(&mut conn, domain).await
    }

    async fn resolve(&self, handle: &Handle) -> HandlesResult<Did> {
        let mut conn = self.pool.acquire().await?;

        if !self.domain_exists(&mut conn, &handle.domain).await? {
            return Err(HandlesError::DomainNotServed(handle.domain.to_string()));
        }

        let sql = format!(
            "select did from {} where lower(handle) = lower($1)",
            self.dids_table
        );
        let key = handle.to_string();

        let did = sqlx::query_scalar::<_, String>(&sql)
            .bind(&key)
            .fetch_optional(&mut *conn)
            .await?;

        debug!(handle = %key, found = did.is_some(), "queried_dids_table");

        did.map(Did::new).ok_or(HandlesError::DidNotFound(key))
    }

    async fn health_check(&self) -> ProviderHealth {
        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => return ProviderHealth::unhealthy(e.to_string()),
        };

        match conn.ping().await {
            Ok(()) => ProviderHealth::healthy("Connected to database"),
            Err(e) => ProviderHealth::unhealthy(e.to_string()),
        }
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
