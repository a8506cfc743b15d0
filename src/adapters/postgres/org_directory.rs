//! PostgreSQL implementation of the read-only OrgDirectory port.
//!
//! The engine never writes these tables; user and team management lives in
//! the upstream identity and admin systems.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, TeamId, Timestamp, UserId};
use crate::domain::org::{OrgAssignment, Role, Team, TeamKind};
use crate::ports::{OrgDirectory, UserProfile};

pub struct PostgresOrgDirectory {
    pool: PgPool,
}

impl PostgresOrgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    display_name: String,
    role: String,
    email: Option<String>,
    is_active: bool,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid role value: {}", row.role))
        })?;
        let id = UserId::new(row.id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid user id: {}", e))
        })?;

        Ok(UserProfile {
            id,
            display_name: row.display_name,
            role,
            email: row.email,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    kind: String,
    parent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TeamRow> for Team {
    type Error = DomainError;

    fn try_from(row: TeamRow) -> Result<Self, Self::Error> {
        let kind = TeamKind::parse(&row.kind).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid team kind value: {}", row.kind),
            )
        })?;

        Ok(Team::reconstitute(
            TeamId::from_uuid(row.id),
            row.name,
            kind,
            row.parent_id.map(TeamId::from_uuid),
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl OrgDirectory for PostgresOrgDirectory {
    async fn assignment_for(&self, user: &UserId) -> Result<Option<OrgAssignment>, DomainError> {
        let row: Option<(Uuid, Uuid, Option<Uuid>, Option<Uuid>)> = sqlx::query_as(
            r#"
            SELECT division_id, section_id, service_id, unit_id
            FROM org_assignments
            WHERE user_id = $1
            "#,
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch org assignment", e))?;

        Ok(row.map(|(division, section, service, unit)| {
            OrgAssignment::reconstitute(
                user.clone(),
                TeamId::from_uuid(division),
                TeamId::from_uuid(section),
                service.map(TeamId::from_uuid),
                unit.map(TeamId::from_uuid),
            )
        }))
    }

    async fn members_of(&self, team: TeamId) -> Result<Vec<UserId>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT a.user_id
            FROM org_assignments a
            JOIN users u ON u.id = a.user_id
            WHERE u.is_active
              AND (a.division_id = $1 OR a.section_id = $1
                   OR a.service_id = $1 OR a.unit_id = $1)
            ORDER BY a.user_id
            "#,
        )
        .bind(team.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list team members", e))?;

        rows.into_iter()
            .map(|(id,)| {
                UserId::new(id).map_err(|e| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Invalid user id: {}", e))
                })
            })
            .collect()
    }

    async fn team(&self, id: TeamId) -> Result<Team, DomainError> {
        let row: Option<TeamRow> = sqlx::query_as(
            "SELECT id, name, kind, parent_id, created_at FROM teams WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch team", e))?;

        match row {
            Some(row) => Team::try_from(row),
            None => Err(DomainError::new(ErrorCode::TeamNotFound, "Team not found")),
        }
    }

    async fn profile(&self, user: &UserId) -> Result<UserProfile, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT id, display_name, role, email, is_active FROM users WHERE id = $1",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch profile", e))?;

        match row {
            Some(row) => UserProfile::try_from(row),
            None => Err(DomainError::new(ErrorCode::UserNotFound, "User not found")),
        }
    }

    async fn profiles(&self, users: &[UserId]) -> Result<Vec<UserProfile>, DomainError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = users.iter().map(|u| u.as_str().to_string()).collect();

        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, display_name, role, email, is_active
            FROM users
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch profiles", e))?;

        rows.into_iter().map(UserProfile::try_from).collect()
    }
}
