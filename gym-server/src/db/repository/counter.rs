//! Counter Repository
//!
//! 业务编号发号器 (MEM001 / TRN001)。
//! 单条 UPSERT 原子自增，并发注册不会发出重复编号。

use serde::Deserialize;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::utils::time::now_millis;

#[derive(Debug, Deserialize)]
struct CounterRow {
    value: i64,
}

#[derive(Clone)]
pub struct CounterRepository {
    base: BaseRepository,
}

impl CounterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 自增并返回新序号，首次调用返回 1
    pub async fn next(&self, name: &str) -> RepoResult<i64> {
        let counter = RecordId::from_table_key("counter", name);
        let row: Option<CounterRow> = self
            .base
            .db()
            .query("UPSERT $counter SET value = (value OR 0) + 1, updated_at = $now RETURN AFTER")
            .bind(("counter", counter))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;

        row.map(|r| r.value)
            .ok_or_else(|| RepoError::Database(format!("Counter '{}' returned no row", name)))
    }
}

/// 序号 → 业务编号，3 位补零 (MEM001)，超过 999 自然增长 (MEM1000)
pub fn format_code(prefix: &str, seq: i64) -> String {
    format!("{}{:03}", prefix, seq)
}

#[cfg(test)]
mod tests {
    use super::format_code;

    #[test]
    fn format_code_pads_to_three_digits() {
        assert_eq!(format_code("MEM", 1), "MEM001");
        assert_eq!(format_code("MEM", 42), "MEM042");
        assert_eq!(format_code("TRN", 999), "TRN999");
        assert_eq!(format_code("MEM", 1000), "MEM1000");
    }
}
