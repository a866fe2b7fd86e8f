//! Role-log repository for database operations.
//!
//! The repository is append-only by construction: there are no update or
//! delete methods. Reads join the user emails and group name shown in
//! listings.

use async_trait::async_trait;
use domain::models::{
    CreateRoleLogInput, ListRoleLogQuery, RoleAction, RoleLogGroup, RoleLogRecord, RoleLogUser,
    UserRoleLogEntry,
};
use domain::services::{RoleLogStore, RoleLogStoreError};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{RoleLogDetailEntity, RoleLogEntity};
use crate::metrics::QueryTimer;

/// Foreign key violation; actor, target, or group does not exist.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
/// Value too long for the bounded `action_type` column.
const PG_STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

/// Shared SELECT for reads that surface display fields.
const SELECT_DETAIL: &str = r#"
    SELECT l.id, l.created_at, l.group_id, g.name AS group_name,
           l.performed_by, pb.email AS performed_by_email,
           l.performed_on, po.email AS performed_on_email,
           l.action_type
    FROM user_role_log l
    LEFT JOIN groups g ON g.id = l.group_id
    LEFT JOIN users pb ON pb.id = l.performed_by
    LEFT JOIN users po ON po.id = l.performed_on
"#;

/// Helper struct for building dynamic WHERE clauses from role-log filters.
/// Tracks conditions and parameter positions to avoid code duplication.
struct RoleLogFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl RoleLogFilterBuilder {
    fn build(query: &ListRoleLogQuery) -> Self {
        let mut conditions = Vec::new();
        let mut param_count = 0;

        if query.performed_by.is_some() {
            param_count += 1;
            conditions.push(format!("l.performed_by = ${}", param_count));
        }

        if query.performed_on.is_some() {
            param_count += 1;
            conditions.push(format!("l.performed_on = ${}", param_count));
        }

        if query.group_id.is_some() {
            param_count += 1;
            conditions.push(format!("l.group_id = ${}", param_count));
        }

        if query.action.is_some() {
            param_count += 1;
            conditions.push(format!("l.action_type = ${}", param_count));
        }

        if query.from.is_some() {
            param_count += 1;
            conditions.push(format!("l.created_at >= ${}", param_count));
        }

        if query.to.is_some() {
            param_count += 1;
            conditions.push(format!("l.created_at <= ${}", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Macro to bind list filter parameters to a SQLx builder.
/// Avoids duplicating the optional-parameter binding for count and list.
macro_rules! bind_list_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref performed_by) = $query.performed_by {
            b = b.bind(performed_by);
        }
        if let Some(ref performed_on) = $query.performed_on {
            b = b.bind(performed_on);
        }
        if let Some(ref group_id) = $query.group_id {
            b = b.bind(group_id);
        }
        if let Some(action) = $query.action {
            b = b.bind(action.as_str());
        }
        if let Some(ref from) = $query.from {
            b = b.bind(from);
        }
        if let Some(ref to) = $query.to {
            b = b.bind(to);
        }
        b
    }};
}

/// Repository for role-log database operations.
#[derive(Clone)]
pub struct RoleLogRepository {
    pool: PgPool,
}

impl RoleLogRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one role-log entry using the repository's pool.
    pub async fn insert(
        &self,
        input: CreateRoleLogInput,
    ) -> Result<UserRoleLogEntry, RoleLogStoreError> {
        self.insert_with(&self.pool, input).await
    }

    /// Append one role-log entry inside a caller-owned transaction, so the
    /// audit write commits or rolls back with the membership change.
    pub async fn insert_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        input: CreateRoleLogInput,
    ) -> Result<UserRoleLogEntry, RoleLogStoreError> {
        self.insert_with(&mut **tx, input).await
    }

    async fn insert_with<'e, E>(
        &self,
        executor: E,
        input: CreateRoleLogInput,
    ) -> Result<UserRoleLogEntry, RoleLogStoreError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        // Bounded-length check before the round trip; the VARCHAR(6) column
        // enforces the same constraint at the database.
        shared::validation::validate_action_type(input.action.as_str())
            .map_err(|e| RoleLogStoreError::Validation(e.to_string()))?;

        let timer = QueryTimer::new("role_log_insert");
        let result = sqlx::query_as::<_, RoleLogEntity>(
            r#"
            INSERT INTO user_role_log (group_id, performed_by, performed_on, action_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, group_id, performed_by, performed_on, action_type
            "#,
        )
        .bind(input.group_id)
        .bind(input.performed_by)
        .bind(input.performed_on)
        .bind(input.action.as_str())
        .fetch_one(executor)
        .await;
        timer.record();

        match result {
            Ok(entity) => Ok(entity_to_entry(entity)),
            Err(err) => {
                tracing::error!(error = %err, "failed to append role-log entry");
                Err(map_store_error(err))
            }
        }
    }

    /// Find a role-log record by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RoleLogRecord>, sqlx::Error> {
        let query = format!("{} WHERE l.id = $1", SELECT_DETAIL);

        let timer = QueryTimer::new("role_log_find_by_id");
        let entity = sqlx::query_as::<_, RoleLogDetailEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();

        Ok(entity?.map(detail_to_record))
    }

    /// List role-log records with pagination and filtering, newest first.
    pub async fn list(
        &self,
        query: &ListRoleLogQuery,
    ) -> Result<(Vec<RoleLogRecord>, i64), sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = page_offset(page, per_page);

        let filter = RoleLogFilterBuilder::build(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!(
            "SELECT COUNT(*) FROM user_role_log l WHERE {}",
            where_clause
        );

        let timer = QueryTimer::new("role_log_list");

        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_list_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            "{} WHERE {} ORDER BY l.created_at DESC, l.id DESC LIMIT ${} OFFSET ${}",
            SELECT_DETAIL,
            where_clause,
            param_count + 1,
            param_count + 2
        );

        let list_builder = sqlx::query_as::<_, RoleLogDetailEntity>(&list_query);
        let list_builder = bind_list_filters!(list_builder, query);
        let entities = list_builder
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        timer.record();

        let records = entities.into_iter().map(detail_to_record).collect();

        Ok((records, total))
    }

    /// List role-log records after an opaque cursor, newest first.
    ///
    /// Returns the page and, when the page is full, the cursor for the next
    /// one. Intended for incremental export of the trail.
    pub async fn list_after(
        &self,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<(Vec<RoleLogRecord>, Option<String>), RoleLogStoreError> {
        let limit = limit.clamp(1, 1000);

        let timer = QueryTimer::new("role_log_list_after");
        let entities = match cursor {
            Some(cursor) => {
                let (created_at, id) = shared::pagination::decode_cursor(cursor)
                    .map_err(|e| RoleLogStoreError::Validation(e.to_string()))?;
                let query = format!(
                    "{} WHERE (l.created_at, l.id) < ($1, $2) \
                     ORDER BY l.created_at DESC, l.id DESC LIMIT $3",
                    SELECT_DETAIL
                );
                sqlx::query_as::<_, RoleLogDetailEntity>(&query)
                    .bind(created_at)
                    .bind(id)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "{} ORDER BY l.created_at DESC, l.id DESC LIMIT $1",
                    SELECT_DETAIL
                );
                sqlx::query_as::<_, RoleLogDetailEntity>(&query)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        timer.record();

        let next_cursor = if entities.len() == limit as usize {
            entities
                .last()
                .map(|e| shared::pagination::encode_cursor(e.created_at, e.id))
        } else {
            None
        };

        let records = entities.into_iter().map(detail_to_record).collect();

        Ok((records, next_cursor))
    }

    /// Count role-log entries recorded against a target user.
    pub async fn count_for_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_role_log WHERE performed_on = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl RoleLogStore for RoleLogRepository {
    async fn create(
        &self,
        input: CreateRoleLogInput,
    ) -> Result<UserRoleLogEntry, RoleLogStoreError> {
        self.insert(input).await
    }
}

/// Convert a bare row to the domain entry.
fn entity_to_entry(entity: RoleLogEntity) -> UserRoleLogEntry {
    UserRoleLogEntry {
        id: entity.id,
        created_at: entity.created_at,
        group_id: entity.group_id,
        performed_by: entity.performed_by,
        performed_on: entity.performed_on,
        action: parse_action(&entity.action_type),
    }
}

/// Convert a joined row to the listing read model.
fn detail_to_record(entity: RoleLogDetailEntity) -> RoleLogRecord {
    RoleLogRecord {
        id: entity.id,
        created_at: entity.created_at,
        action: parse_action(&entity.action_type),
        group: RoleLogGroup {
            id: entity.group_id,
            name: entity.group_name,
        },
        performed_by: RoleLogUser {
            id: entity.performed_by,
            email: entity.performed_by_email,
        },
        performed_on: RoleLogUser {
            id: entity.performed_on,
            email: entity.performed_on_email,
        },
    }
}

/// Row offset for a 1-based page. Widened to i64 before multiplying so
/// caller-supplied page numbers cannot overflow u32.
fn page_offset(page: u32, per_page: u32) -> i64 {
    (page as i64 - 1) * per_page as i64
}

/// Legacy rows may carry short free-form values; treat them as unspecified.
fn parse_action(raw: &str) -> RoleAction {
    raw.parse::<RoleAction>().unwrap_or(RoleAction::Unspecified)
}

/// Map database failures to the store error taxonomy.
fn map_store_error(err: sqlx::Error) -> RoleLogStoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(code) = db_err.code() {
            match code.as_ref() {
                PG_FOREIGN_KEY_VIOLATION => {
                    return RoleLogStoreError::MissingReference(db_err.to_string())
                }
                PG_STRING_DATA_RIGHT_TRUNCATION => {
                    return RoleLogStoreError::Validation(db_err.to_string())
                }
                _ => {}
            }
        }
    }
    RoleLogStoreError::Database(err)
}
