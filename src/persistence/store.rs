//! SQLite-based cluster store

use crate::core::{Cluster, ClusterState};
use crate::persistence::ClusterStore;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Row, SqlitePool};

/// SQLite cluster store
pub struct SqliteClusterStore {
    pool: SqlitePool,
}

impl SqliteClusterStore {
    /// Create a new SQLite store
    pub async fn new(db_path: &str) -> Result<Self> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Create store with default path
    pub async fn with_default_path() -> Result<Self> {
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
        let db_dir = data_dir.join("kubeforge");
        std::fs::create_dir_all(&db_dir)?;

        let db_path = db_dir.join("clusters.db");
        Self::new(db_path.to_str().unwrap()).await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clusters (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                provider TEXT NOT NULL,
                region TEXT NOT NULL,
                state TEXT NOT NULL,
                created_at TEXT NOT NULL,
                config TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cluster_name ON clusters(name);
            CREATE INDEX IF NOT EXISTS idx_cluster_state ON clusters(state);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn row_to_cluster(row: &sqlx::sqlite::SqliteRow) -> Result<Cluster> {
        let provider: String = row.get("provider");
        let state: String = row.get("state");
        let config: String = row.get("config");

        Ok(Cluster {
            id: row.get("id"),
            name: row.get("name"),
            provider: provider
                .parse()
                .with_context(|| format!("stored provider {:?}", provider))?,
            region: row.get("region"),
            state: ClusterState::parse(&state).unwrap_or(ClusterState::Failed),
            created_at: Self::from_naive(row.get("created_at")),
            config: serde_json::from_str(&config).context("decode stored config")?,
        })
    }
}

#[async_trait::async_trait]
impl ClusterStore for SqliteClusterStore {
    async fn save(&self, cluster: &Cluster) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO clusters
            (id, name, provider, region, state, created_at, config)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&cluster.id)
        .bind(&cluster.name)
        .bind(cluster.provider.as_str())
        .bind(&cluster.region)
        .bind(cluster.state.as_str())
        .bind(Self::to_naive(cluster.created_at))
        .bind(serde_json::to_string(&cluster.config)?)
        .execute(&self.pool)
        .await
        .context("Failed to save cluster")?;

        Ok(())
    }

    async fn get(&self, cluster_id: &str) -> Result<Option<Cluster>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, provider, region, state, created_at, config
            FROM clusters
            WHERE id = ?1
            "#,
        )
        .bind(cluster_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load cluster")?;

        row.as_ref().map(Self::row_to_cluster).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Cluster>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, provider, region, state, created_at, config
            FROM clusters
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list clusters")?;

        rows.iter().map(Self::row_to_cluster).collect()
    }

    async fn delete(&self, cluster_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM clusters WHERE id = ?1")
            .bind(cluster_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete cluster")?;

        Ok(())
    }
}
