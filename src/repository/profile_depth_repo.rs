// ==========================================
// 托盘装载优化系统 - 型材深度表仓储
// ==========================================
// 职责: 型材系统 → 单件装载深度 (mm)
// 红线: 缺失的型材不在此处补默认值,由引擎报配置错误
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 型材深度记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDepthEntity {
    pub profile_type: String,
    pub depth_mm: i64,
}

pub struct ProfileDepthRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProfileDepthRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取深度表快照（供引擎使用）
    pub fn load_depth_map(&self) -> RepositoryResult<HashMap<String, i64>> {
        Ok(self
            .list_all()?
            .into_iter()
            .map(|e| (e.profile_type, e.depth_mm))
            .collect())
    }

    /// 查询全部（按型材名排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<ProfileDepthEntity>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT profile_type, depth_mm FROM profile_depth ORDER BY profile_type",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ProfileDepthEntity {
                    profile_type: row.get(0)?,
                    depth_mm: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// 插入或更新
    pub fn upsert(&self, profile_type: &str, depth_mm: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO profile_depth (profile_type, depth_mm) VALUES (?1, ?2)
            ON CONFLICT(profile_type) DO UPDATE SET depth_mm = excluded.depth_mm
            "#,
            params![profile_type, depth_mm],
        )?;
        Ok(())
    }

    /// 删除,不存在时返回 NotFound
    pub fn delete(&self, profile_type: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "DELETE FROM profile_depth WHERE profile_type = ?1",
            params![profile_type],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ProfileDepth", profile_type));
        }
        Ok(())
    }
}
