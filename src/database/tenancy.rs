//! Tenant lookups: user membership and store ownership

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::TenantDirectory;
use crate::error::Result;

pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn org_for_user(&self, user_id: Uuid) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT org_id FROM organization_members
            WHERE user_id = $1
            ORDER BY org_id
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(org_id,)| org_id))
    }

    async fn org_for_store(&self, store_id: Uuid) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT org_id FROM stores WHERE id = $1")
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(org_id,)| org_id))
    }
}
