//! PostgreSQL-backed role catalog.

use async_trait::async_trait;
use sqlx::PgPool;

use baladiya_application::RoleRepository;
use baladiya_core::{AppError, AppResult};
use baladiya_domain::{Permission, RoleDefinition, RoleName};

/// PostgreSQL implementation of the role repository port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    name: String,
    permissions: Vec<String>,
}

impl TryFrom<RoleRow> for RoleDefinition {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(RoleDefinition::new(
            RoleName::new(row.name)?,
            Permission::parse_set(row.permissions)?,
        ))
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles_by_names(&self, names: &[RoleName]) -> AppResult<Vec<RoleDefinition>> {
        let names = names
            .iter()
            .map(|name| name.as_str().to_owned())
            .collect::<Vec<_>>();

        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, permissions
            FROM roles
            WHERE name = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to load roles by name: {error}")))?;

        rows.into_iter().map(RoleDefinition::try_from).collect()
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, permissions
            FROM roles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(RoleDefinition::try_from).collect()
    }

    async fn find_role(&self, name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, permissions
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to find role: {error}")))?
        .map(RoleDefinition::try_from)
        .transpose()
    }

    async fn save_role(&self, role: &RoleDefinition) -> AppResult<()> {
        let permissions = role
            .permissions()
            .iter()
            .map(|permission| permission.as_str().to_owned())
            .collect::<Vec<_>>();

        sqlx::query(
            r#"
            INSERT INTO roles (name, permissions)
            VALUES ($1, $2)
            ON CONFLICT (name)
            DO UPDATE SET permissions = EXCLUDED.permissions, updated_at = now()
            "#,
        )
        .bind(role.name().as_str())
        .bind(permissions)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save role: {error}")))?;

        Ok(())
    }
}
