// ==========================================
// 托盘装载优化系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 幂等建表,应用启动与测试共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启（托盘明细依赖 ON DELETE CASCADE）
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等建表
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        -- 交付/订单 (外部模块维护,此处只读)
        CREATE TABLE IF NOT EXISTS delivery (
            delivery_id INTEGER PRIMARY KEY,
            delivery_number TEXT,
            status TEXT
        );

        CREATE TABLE IF NOT EXISTS customer_order (
            order_id INTEGER PRIMARY KEY,
            order_number TEXT NOT NULL,
            delivery_id INTEGER REFERENCES delivery(delivery_id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_customer_order_delivery ON customer_order(delivery_id);

        CREATE TABLE IF NOT EXISTS order_window (
            window_id INTEGER PRIMARY KEY,
            order_id INTEGER NOT NULL REFERENCES customer_order(order_id) ON DELETE CASCADE,
            width_mm INTEGER NOT NULL,
            height_mm INTEGER NOT NULL,
            profile_type TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            reference TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_order_window_order ON order_window(order_id);

        CREATE TABLE IF NOT EXISTS order_requirement (
            requirement_id INTEGER PRIMARY KEY,
            order_id INTEGER NOT NULL REFERENCES customer_order(order_id) ON DELETE CASCADE,
            profile_id TEXT NOT NULL,
            length_m REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_order_requirement_order ON order_requirement(order_id);

        -- 型材深度表 / 托盘类型目录
        CREATE TABLE IF NOT EXISTS profile_depth (
            profile_type TEXT PRIMARY KEY,
            depth_mm INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pallet_type (
            pallet_type_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            length_mm INTEGER NOT NULL,
            load_depth_mm INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- 优化结果 (每个交付至多一份)
        CREATE TABLE IF NOT EXISTS pallet_optimization (
            optimization_id TEXT PRIMARY KEY,
            delivery_id INTEGER NOT NULL UNIQUE,
            total_pallets INTEGER NOT NULL,
            total_windows INTEGER NOT NULL,
            average_utilization REAL NOT NULL,
            validation_status TEXT NOT NULL DEFAULT 'pending'
                CHECK(validation_status IN ('pending', 'valid', 'invalid')),
            validation_errors_json TEXT,
            validated_at TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS optimized_pallet (
            optimization_id TEXT NOT NULL
                REFERENCES pallet_optimization(optimization_id) ON DELETE CASCADE,
            pallet_number INTEGER NOT NULL,
            pallet_type TEXT NOT NULL,
            pallet_length_mm INTEGER NOT NULL,
            max_depth_mm INTEGER NOT NULL,
            used_depth_mm INTEGER NOT NULL,
            utilization_percent REAL NOT NULL,
            windows_json TEXT NOT NULL,
            PRIMARY KEY (optimization_id, pallet_number)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
