// ==========================================
// 托盘装载优化系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// 说明: 超出量 700mm 是常量,不走配置
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::pallet_validator::DEFAULT_LOW_UTILIZATION_THRESHOLD_PCT;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    // ===== 托盘校验配置 =====

    /// 获取低利用率告警阈值（百分比）
    ///
    /// # 返回
    /// - f64: 阈值（默认 50.0）；值非法时回退默认值并告警
    pub fn get_low_utilization_threshold_pct(&self) -> Result<f64, Box<dyn Error>> {
        let raw = match self.get_global_config_value(config_keys::LOW_UTILIZATION_THRESHOLD_PCT)? {
            Some(v) => v,
            None => return Ok(DEFAULT_LOW_UTILIZATION_THRESHOLD_PCT),
        };

        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && (0.0..=100.0).contains(&v) => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = config_keys::LOW_UTILIZATION_THRESHOLD_PCT,
                    raw_value = %raw,
                    "低利用率阈值配置非法，使用默认值"
                );
                Ok(DEFAULT_LOW_UTILIZATION_THRESHOLD_PCT)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    /// 低利用率告警阈值（百分比,0-100）
    pub const LOW_UTILIZATION_THRESHOLD_PCT: &str = "pallet_low_utilization_threshold_pct";
}
