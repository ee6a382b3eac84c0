use std::str::FromStr;

use async_trait::async_trait;
use auth::TokenPurpose;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::models::IdentityId;
use crate::domain::token::errors::TokenError;
use crate::domain::token::models::TokenRecord;
use crate::domain::token::ports::TokenRepository;

pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: Uuid,
    token: String,
    identity_id: Uuid,
    purpose: String,
    expires_at: DateTime<Utc>,
    revoked: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TokenRow> for TokenRecord {
    type Error = TokenError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        Ok(TokenRecord {
            id: row.id,
            token: row.token,
            identity_id: IdentityId(row.identity_id),
            purpose: TokenPurpose::from_str(&row.purpose)?,
            expires_at: row.expires_at,
            revoked: row.revoked,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn save(&self, record: TokenRecord) -> Result<TokenRecord, TokenError> {
        sqlx::query(
            r#"
            INSERT INTO tokens
                (id, token, identity_id, purpose, expires_at, revoked, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.token)
        .bind(record.identity_id.0)
        .bind(record.purpose.as_str())
        .bind(record.expires_at)
        .bind(record.revoked)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| TokenError::DatabaseError(e.to_string()))?;

        Ok(record)
    }

    async fn find_active(
        &self,
        token: &str,
        purpose: TokenPurpose,
        identity_id: &IdentityId,
    ) -> Result<Option<TokenRecord>, TokenError> {
        // Revocation is filtered here; expiry is the caller's check
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, token, identity_id, purpose, expires_at, revoked, created_at
            FROM tokens
            WHERE token = $1 AND purpose = $2 AND identity_id = $3 AND revoked = FALSE
            "#,
        )
        .bind(token)
        .bind(purpose.as_str())
        .bind(identity_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TokenError::DatabaseError(e.to_string()))?;

        row.map(TokenRecord::try_from).transpose()
    }

    async fn revoke(&self, record: &TokenRecord) -> Result<(), TokenError> {
        let result = sqlx::query(
            r#"
            UPDATE tokens
            SET revoked = TRUE
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .execute(&self.pool)
        .await
        .map_err(|e| TokenError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(TokenError::NotFound);
        }

        Ok(())
    }

    async fn revoke_all_for_identity(
        &self,
        identity_id: &IdentityId,
        purpose: TokenPurpose,
    ) -> Result<u64, TokenError> {
        let result = sqlx::query(
            r#"
            UPDATE tokens
            SET revoked = TRUE
            WHERE identity_id = $1 AND purpose = $2 AND revoked = FALSE
            "#,
        )
        .bind(identity_id.0)
        .bind(purpose.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| TokenError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
