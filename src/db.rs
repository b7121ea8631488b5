use std::time::Duration;

use sqlx::{
    error::ErrorKind,
    mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlQueryResult},
    MySqlPool,
};

use crate::config::DbConfig;

/// Outcome of a write statement: generated id for inserts, affected rows for updates/deletes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Executed {
    pub insert_id: u64,
    pub affected_rows: u64,
}

impl From<MySqlQueryResult> for Executed {
    fn from(r: MySqlQueryResult) -> Self {
        Self {
            insert_id: r.last_insert_id(),
            affected_rows: r.rows_affected(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("duplicate key: {0}")]
    UniqueViolation(String),
    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if matches!(db.kind(), ErrorKind::UniqueViolation) => {
                DbError::UniqueViolation(db.message().to_string())
            }
            _ => DbError::Sqlx(e),
        }
    }
}

/// How long a request may wait in the pool queue for a free connection.
/// sqlx requires a finite deadline.
pub const QUEUE_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Builds the bounded pool. Connections are opened on first use, so a
/// database that is down at startup shows up in `/healthz` instead of
/// aborting the process.
pub fn connect_pool(cfg: &DbConfig) -> MySqlPool {
    let options = MySqlConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.database);

    MySqlPoolOptions::new()
        .max_connections(cfg.connection_limit)
        .acquire_timeout(QUEUE_WAIT)
        .connect_lazy_with(options)
}

pub async fn ping(db: &MySqlPool) -> Result<bool, DbError> {
    let ok: i64 = sqlx::query_scalar("SELECT 1 AS ok").fetch_one(db).await?;
    Ok(ok == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_untouched() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn unique_violation_message_is_kept() {
        let err = DbError::UniqueViolation("Duplicate entry 'S1' for key 'uq_student_code'".into());
        assert!(err.to_string().contains("Duplicate entry 'S1'"));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect_up_front() {
        let cfg = DbConfig {
            host: "127.0.0.1".into(),
            port: 1,
            user: "root".into(),
            password: String::new(),
            database: "school".into(),
            connection_limit: 2,
        };
        let pool = connect_pool(&cfg);
        assert_eq!(pool.size(), 0);
        pool.close().await;
    }

    #[tokio::test]
    async fn queued_requests_wait_instead_of_timing_out() {
        let cfg = DbConfig {
            host: "127.0.0.1".into(),
            port: 1,
            user: "root".into(),
            password: String::new(),
            database: "school".into(),
            connection_limit: 10,
        };
        let pool = connect_pool(&cfg);
        assert_eq!(pool.options().get_acquire_timeout(), QUEUE_WAIT);
        assert_eq!(pool.options().get_max_connections(), 10);
        pool.close().await;
    }
}
