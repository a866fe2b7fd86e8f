//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the duration of a named database query.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "role_log_db_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record connection pool health metrics.
///
/// Call periodically to track pool saturation.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("role_log_db_connections_active").set(active as f64);
    gauge!("role_log_db_connections_idle").set(idle as f64);
    gauge!("role_log_db_connections_total").set(size as f64);
}

/// Times a database operation and records its duration on `record`.
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(&self.query_name, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new("role_log_insert");
        assert_eq!(timer.query_name, "role_log_insert");
    }

    #[test]
    fn test_query_timer_with_string() {
        let name = String::from("role_log_list");
        let timer = QueryTimer::new(name);
        assert_eq!(timer.query_name, "role_log_list");
    }
}
