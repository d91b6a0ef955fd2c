//! PostgreSQL-backed delegation rules.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use baladiya_application::{DelegationQuery, DelegationRepository, DelegationRevision};
use baladiya_core::{AppError, AppResult};
use baladiya_domain::{
    ApprovalStatus, DelegationId, DelegationRule, DelegationRuleParts, EmailAddress, Permission,
};


/// PostgreSQL implementation of the delegation repository port.
#[derive(Clone)]
pub struct PostgresDelegationRepository {
    pool: PgPool,
}

impl PostgresDelegationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DelegationRow {
    id: uuid::Uuid,
    delegator_email: String,
    delegatee_email: String,
    delegated_permissions: Vec<String>,
    approval_status: String,
    is_active: bool,
    end_date: Option<DateTime<Utc>>,
    reason: Option<String>,
    created_at: DateTime<Utc>,
    decided_by: Option<String>,
    decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<DelegationRow> for DelegationRule {
    type Error = AppError;

    fn try_from(row: DelegationRow) -> Result<Self, Self::Error> {
        Ok(DelegationRule::from_parts(DelegationRuleParts {
            delegation_id: DelegationId::from_uuid(row.id),
            delegator_email: EmailAddress::new(row.delegator_email)?,
            delegatee_email: EmailAddress::new(row.delegatee_email)?,
            delegated_permissions: Permission::parse_set(row.delegated_permissions)?,
            approval_status: row.approval_status.parse::<ApprovalStatus>()?,
            is_active: row.is_active,
            end_date: row.end_date,
            reason: row.reason,
            created_at: row.created_at,
            decided_by: row.decided_by,
            decided_at: row.decided_at,
        }))
    }
}

const DELEGATION_COLUMNS: &str = "id, delegator_email, delegatee_email, delegated_permissions, \
    approval_status, is_active, end_date, reason, created_at, decided_by, decided_at";

#[async_trait]
impl DelegationRepository for PostgresDelegationRepository {
    async fn list_active_for_delegatee(
        &self,
        delegatee_email: &EmailAddress,
    ) -> AppResult<Vec<DelegationRule>> {
        let rows = sqlx::query_as::<_, DelegationRow>(&format!(
            r#"
            SELECT {DELEGATION_COLUMNS}
            FROM delegation_rules
            WHERE delegatee_email = $1
                AND is_active
                AND approval_status = 'approved'
            "#
        ))
        .bind(delegatee_email.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreRead(format!("failed to list active delegations: {error}"))
        })?;

        rows.into_iter().map(DelegationRule::try_from).collect()
    }

    async fn find_delegation(
        &self,
        delegation_id: DelegationId,
    ) -> AppResult<Option<DelegationRule>> {
        sqlx::query_as::<_, DelegationRow>(&format!(
            r#"
            SELECT {DELEGATION_COLUMNS}
            FROM delegation_rules
            WHERE id = $1
            "#
        ))
        .bind(delegation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to find delegation: {error}")))?
        .map(DelegationRule::try_from)
        .transpose()
    }

    async fn create_delegation(&self, delegation: &DelegationRule) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO delegation_rules (
                id,
                delegator_email,
                delegatee_email,
                delegated_permissions,
                approval_status,
                is_active,
                end_date,
                reason,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(delegation.delegation_id().as_uuid())
        .bind(delegation.delegator_email().as_str())
        .bind(delegation.delegatee_email().as_str())
        .bind(permission_values(delegation))
        .bind(delegation.approval_status().as_str())
        .bind(delegation.is_active())
        .bind(delegation.end_date())
        .bind(delegation.reason())
        .bind(delegation.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create delegation: {error}")))?;

        Ok(())
    }

    async fn update_delegation(
        &self,
        delegation: &DelegationRule,
        expected: DelegationRevision,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE delegation_rules
            SET approval_status = $2,
                is_active = $3,
                decided_by = $4,
                decided_at = $5
            WHERE id = $1
              AND approval_status = $6
              AND is_active = $7
            "#,
        )
        .bind(delegation.delegation_id().as_uuid())
        .bind(delegation.approval_status().as_str())
        .bind(delegation.is_active())
        .bind(delegation.decided_by())
        .bind(delegation.decided_at())
        .bind(expected.approval_status.as_str())
        .bind(expected.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update delegation: {error}")))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM delegation_rules WHERE id = $1)",
        )
        .bind(delegation.delegation_id().as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to find delegation: {error}")))?;

        if exists {
            Err(AppError::Conflict(format!(
                "delegation '{}' was changed by another request",
                delegation.delegation_id()
            )))
        } else {
            Err(AppError::NotFound(format!(
                "delegation '{}' does not exist",
                delegation.delegation_id()
            )))
        }
    }

    async fn list_delegations(&self, query: &DelegationQuery) -> AppResult<Vec<DelegationRule>> {
        let rows = sqlx::query_as::<_, DelegationRow>(&format!(
            r#"
            SELECT {DELEGATION_COLUMNS}
            FROM delegation_rules
            WHERE ($1::TEXT IS NULL OR delegatee_email = $1)
                AND ($2::TEXT IS NULL OR delegator_email = $2)
                AND ($3::TEXT IS NULL OR delegatee_email = $3 OR delegator_email = $3)
                AND ($4::TEXT IS NULL OR approval_status = $4)
            ORDER BY created_at DESC
            LIMIT $5
            OFFSET $6
            "#
        ))
        .bind(query.delegatee_email.as_ref().map(EmailAddress::as_str))
        .bind(query.delegator_email.as_ref().map(EmailAddress::as_str))
        .bind(query.participant_email.as_ref().map(EmailAddress::as_str))
        .bind(query.approval_status.map(|status| status.as_str()))
        .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(query.offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to list delegations: {error}")))?;

        rows.into_iter().map(DelegationRule::try_from).collect()
    }
}

fn permission_values(delegation: &DelegationRule) -> Vec<String> {
    delegation
        .delegated_permissions()
        .iter()
        .map(|permission| permission.as_str().to_owned())
        .collect()
}
