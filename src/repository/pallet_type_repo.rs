// ==========================================
// 托盘装载优化系统 - 托盘类型目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 目录读取始终按承载长度降序
// ==========================================

use crate::domain::pallet::PalletTypeDefinition;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "SELECT pallet_type_id, name, length_mm, load_depth_mm FROM pallet_type";

// ==========================================
// PalletTypeRepository - 托盘类型仓储
// ==========================================
pub struct PalletTypeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PalletTypeRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部托盘类型
    ///
    /// # 返回
    /// 按 length_mm 降序（同长度按名称升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<PalletTypeDefinition>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY length_mm DESC, name ASC",
            SELECT_COLUMNS
        ))?;
        let pallet_types = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pallet_types)
    }

    /// 按ID查询
    pub fn find_by_id(&self, pallet_type_id: i64) -> RepositoryResult<Option<PalletTypeDefinition>> {
        let conn = self.get_conn()?;

        let pallet_type = conn
            .query_row(
                &format!("{} WHERE pallet_type_id = ?1", SELECT_COLUMNS),
                params![pallet_type_id],
                map_row,
            )
            .optional()?;

        Ok(pallet_type)
    }

    /// 新建托盘类型
    ///
    /// # 返回
    /// - Ok(PalletTypeDefinition): 带新主键的目录项
    /// - Err(UniqueConstraintViolation): 名称重复
    pub fn insert(
        &self,
        name: &str,
        length_mm: i64,
        load_depth_mm: i64,
    ) -> RepositoryResult<PalletTypeDefinition> {
        let conn = self.get_conn()?;
        let now = Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string();

        conn.execute(
            r#"
            INSERT INTO pallet_type (name, length_mm, load_depth_mm, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![name, length_mm, load_depth_mm, now],
        )?;

        Ok(PalletTypeDefinition {
            pallet_type_id: conn.last_insert_rowid(),
            name: name.to_string(),
            length_mm,
            load_depth_mm,
        })
    }

    /// 更新托盘类型
    ///
    /// 不存在时返回 NotFound
    pub fn update(&self, pallet_type: &PalletTypeDefinition) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string();

        let affected = conn.execute(
            r#"
            UPDATE pallet_type
            SET name = ?1, length_mm = ?2, load_depth_mm = ?3, updated_at = ?4
            WHERE pallet_type_id = ?5
            "#,
            params![
                pallet_type.name,
                pallet_type.length_mm,
                pallet_type.load_depth_mm,
                now,
                pallet_type.pallet_type_id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found(
                "PalletType",
                pallet_type.pallet_type_id,
            ));
        }
        Ok(())
    }

    /// 删除托盘类型
    ///
    /// 已生成的优化结果自带托盘参数快照,不受影响
    pub fn delete(&self, pallet_type_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "DELETE FROM pallet_type WHERE pallet_type_id = ?1",
            params![pallet_type_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("PalletType", pallet_type_id));
        }
        Ok(())
    }
}

fn map_row(row: &rusqlite::Row) -> rusqlite::Result<PalletTypeDefinition> {
    Ok(PalletTypeDefinition {
        pallet_type_id: row.get(0)?,
        name: row.get(1)?,
        length_mm: row.get(2)?,
        load_depth_mm: row.get(3)?,
    })
}
