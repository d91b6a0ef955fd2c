//! PostgreSQL-backed user directory.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use baladiya_application::{UserListQuery, UserRepository};
use baladiya_core::{AppError, AppResult};
use baladiya_domain::{EmailAddress, RoleName, User, UserId};


/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::StoreRead(format!("failed to find user: {error}")))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    display_name: String,
    role: String,
    assigned_roles: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let assigned_roles = row
            .assigned_roles
            .into_iter()
            .map(RoleName::new)
            .collect::<AppResult<BTreeSet<_>>>()?;

        Ok(User::new(
            UserId::from_uuid(row.id),
            EmailAddress::new(row.email)?,
            row.display_name,
            RoleName::new(row.role)?,
            assigned_roles,
            row.created_at,
        ))
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, role, assigned_roles, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to find user by id: {error}")))?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, role, assigned_roles, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to find user by email: {error}")))?
        .map(User::try_from)
        .transpose()
    }

    async fn create_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, role, assigned_roles, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.user_id().as_uuid())
        .bind(user.email().as_str())
        .bind(user.display_name())
        .bind(user.role().as_str())
        .bind(role_values(user.assigned_roles()))
        .bind(user.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| email_conflict_or_internal(error, "create user"))?;

        Ok(())
    }

    async fn add_assigned_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET assigned_roles = array_append(assigned_roles, $2)
            WHERE id = $1
              AND NOT ($2 = ANY(assigned_roles))
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        if self.user_exists(user_id).await? {
            Err(AppError::Conflict(format!(
                "user '{user_id}' already has role '{role_name}'"
            )))
        } else {
            Err(AppError::NotFound(format!("user '{user_id}' does not exist")))
        }
    }

    async fn remove_assigned_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET assigned_roles = array_remove(assigned_roles, $2)
            WHERE id = $1
              AND $2 = ANY(assigned_roles)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to unassign role: {error}")))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        if self.user_exists(user_id).await? {
            Err(AppError::NotFound(format!(
                "user '{user_id}' does not have role '{role_name}'"
            )))
        } else {
            Err(AppError::NotFound(format!("user '{user_id}' does not exist")))
        }
    }

    async fn list_users(&self, query: UserListQuery) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, role, assigned_roles, created_at
            FROM users
            ORDER BY email
            LIMIT $1
            OFFSET $2
            "#,
        )
        .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(query.offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::StoreRead(format!("failed to list users: {error}")))?;

        rows.into_iter().map(User::try_from).collect()
    }
}

fn role_values(roles: &BTreeSet<RoleName>) -> Vec<String> {
    roles.iter().map(|role| role.as_str().to_owned()).collect()
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("a user with this email already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
