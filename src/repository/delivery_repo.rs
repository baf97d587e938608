// ==========================================
// 托盘装载优化系统 - 交付数据仓储
// ==========================================
// 职责: 交付存在性检查、门窗明细展平、订单型材需求读取
// 说明: 交付/订单表由外部模块维护,本仓储只读
// ==========================================

use crate::domain::delivery::{DeliveryWindow, ProfileRequirement};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct DeliveryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DeliveryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 交付是否存在
    pub fn exists(&self, delivery_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        delivery_exists(&conn, delivery_id)
    }

    /// 展平交付下所有订单的门窗明细
    ///
    /// # 返回
    /// - Ok(Vec): 按订单ID、明细ID升序；无明细时为空
    /// - Err(NotFound): 交付不存在
    pub fn list_delivery_windows(&self, delivery_id: i64) -> RepositoryResult<Vec<DeliveryWindow>> {
        let conn = self.get_conn()?;
        if !delivery_exists(&conn, delivery_id)? {
            return Err(RepositoryError::not_found("Delivery", delivery_id));
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT w.window_id, o.order_id, o.order_number,
                   w.width_mm, w.height_mm, w.profile_type, w.quantity, w.reference
            FROM customer_order o
            JOIN order_window w ON w.order_id = o.order_id
            WHERE o.delivery_id = ?1
            ORDER BY o.order_id, w.window_id
            "#,
        )?;

        let windows = stmt
            .query_map(params![delivery_id], |row| {
                Ok(DeliveryWindow {
                    window_id: row.get(0)?,
                    order_id: row.get(1)?,
                    order_number: row.get(2)?,
                    width_mm: row.get(3)?,
                    height_mm: row.get(4)?,
                    profile_type: row.get(5)?,
                    quantity: row.get(6)?,
                    reference: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(windows)
    }

    /// 交付下所有订单的型材需求（原材料长度,米）
    pub fn list_profile_requirements(
        &self,
        delivery_id: i64,
    ) -> RepositoryResult<Vec<ProfileRequirement>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT r.profile_id, r.length_m
            FROM customer_order o
            JOIN order_requirement r ON r.order_id = o.order_id
            WHERE o.delivery_id = ?1
            ORDER BY o.order_id, r.requirement_id
            "#,
        )?;

        let requirements = stmt
            .query_map(params![delivery_id], |row| {
                Ok(ProfileRequirement {
                    profile_id: row.get(0)?,
                    length_m: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(requirements)
    }
}

fn delivery_exists(conn: &Connection, delivery_id: i64) -> RepositoryResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM delivery WHERE delivery_id = ?1",
        params![delivery_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
