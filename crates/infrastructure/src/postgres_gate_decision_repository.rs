use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use baladiya_application::{GateDecisionRecord, GateDecisionRepository};
use baladiya_core::{AppError, AppResult};
use baladiya_domain::{AutoAction, EntityType};

/// PostgreSQL-backed gate decision history.
#[derive(Clone)]
pub struct PostgresGateDecisionRepository {
    pool: PgPool,
}

impl PostgresGateDecisionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GateDecisionRow {
    id: uuid::Uuid,
    entity_type: String,
    gate_name: String,
    entity_id: String,
    decision: String,
    decided_by: String,
    comment: Option<String>,
    from_stage: String,
    to_stage: String,
    auto_actions: Vec<String>,
    decided_at: DateTime<Utc>,
}

impl TryFrom<GateDecisionRow> for GateDecisionRecord {
    type Error = AppError;

    fn try_from(row: GateDecisionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            decision_id: row.id,
            entity_type: row.entity_type.parse::<EntityType>()?,
            gate_name: row.gate_name,
            entity_id: row.entity_id,
            decision: row.decision,
            decided_by: row.decided_by,
            comment: row.comment,
            from_stage: row.from_stage,
            to_stage: row.to_stage,
            auto_actions: row
                .auto_actions
                .iter()
                .map(|action| action.parse::<AutoAction>())
                .collect::<AppResult<_>>()?,
            decided_at: row.decided_at,
        })
    }
}

#[async_trait]
impl GateDecisionRepository for PostgresGateDecisionRepository {
    async fn append_decision(&self, record: &GateDecisionRecord) -> AppResult<()> {
        let auto_actions = record
            .auto_actions
            .iter()
            .map(|action| action.as_str().to_owned())
            .collect::<Vec<_>>();

        sqlx::query(
            r#"
            INSERT INTO gate_decisions (
                id,
                entity_type,
                gate_name,
                entity_id,
                decision,
                decided_by,
                comment,
                from_stage,
                to_stage,
                auto_actions,
                decided_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.decision_id)
        .bind(record.entity_type.as_str())
        .bind(record.gate_name.as_str())
        .bind(record.entity_id.as_str())
        .bind(record.decision.as_str())
        .bind(record.decided_by.as_str())
        .bind(record.comment.as_deref())
        .bind(record.from_stage.as_str())
        .bind(record.to_stage.as_str())
        .bind(auto_actions)
        .bind(record.decided_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append gate decision: {error}")))?;

        Ok(())
    }

    async fn list_decisions_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<GateDecisionRecord>> {
        let rows = sqlx::query_as::<_, GateDecisionRow>(
            r#"
            SELECT
                id,
                entity_type,
                gate_name,
                entity_id,
                decision,
                decided_by,
                comment,
                from_stage,
                to_stage,
                auto_actions,
                decided_at
            FROM gate_decisions
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY decided_at
            "#,
        )
        .bind(entity_type.as_str())
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to list gate decisions: {error}")))?;

        rows.into_iter().map(GateDecisionRecord::try_from).collect()
    }
}
