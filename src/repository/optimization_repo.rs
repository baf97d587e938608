// ==========================================
// 托盘装载优化系统 - 优化结果仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 每个交付至多一份结果；替换必须在同一事务内先删后插
// ==========================================
// 存储:
// - pallet_optimization: 结果头 + 校验结论 (错误列表为 JSON)
// - optimized_pallet: 托盘实例 + 装载快照 (windows_json)
// 读取时汇总字段由托盘内容重算,不信任存储冗余列
// ==========================================

use crate::domain::pallet::{OptimizationResult, OptimizedPallet, OptimizedWindow};
use crate::domain::types::ValidationStatus;
use crate::domain::validation::{ValidationIssue, ValidationVerdict};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 结果头原始行
struct OptimizationHeaderRow {
    optimization_id: String,
    validation_status: String,
    validation_errors_json: Option<String>,
    validated_at: Option<String>,
}

/// 托盘原始行
struct PalletRow {
    pallet_number: u32,
    pallet_type: String,
    pallet_length_mm: i64,
    max_depth_mm: i64,
    windows_json: String,
}

// ==========================================
// PalletOptimizationRepository - 优化结果仓储
// ==========================================
pub struct PalletOptimizationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PalletOptimizationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存优化结果（原子替换）
    ///
    /// # 红线
    /// - 必须在事务中完成: 删除旧结果 → 插入新结果头 → 插入托盘
    /// - 任一步失败整体回滚,读方只能看到完整的新或旧结果
    ///
    /// # 返回
    /// - Ok(optimization_id)
    pub fn save(&self, result: &OptimizationResult) -> RepositoryResult<String> {
        let optimization_id = Uuid::new_v4().to_string();
        let now = Local::now().naive_local().format(DATETIME_FORMAT).to_string();
        let errors_json = serialize_errors(&result.verdict.errors)?;

        // 序列化在事务外完成,避免事务内半途失败
        let mut pallet_payloads = Vec::with_capacity(result.pallets.len());
        for pallet in &result.pallets {
            let windows_json = serde_json::to_string(&pallet.windows).map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "windows_json".to_string(),
                    message: e.to_string(),
                }
            })?;
            pallet_payloads.push((pallet, windows_json));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // 1. 删除旧结果（先删托盘明细,不依赖外键级联是否开启）
        tx.execute(
            r#"
            DELETE FROM optimized_pallet
            WHERE optimization_id IN (
                SELECT optimization_id FROM pallet_optimization WHERE delivery_id = ?1
            )
            "#,
            params![result.delivery_id],
        )?;
        let replaced = tx.execute(
            "DELETE FROM pallet_optimization WHERE delivery_id = ?1",
            params![result.delivery_id],
        )?;

        // 2. 插入结果头
        tx.execute(
            r#"
            INSERT INTO pallet_optimization (
                optimization_id, delivery_id, total_pallets, total_windows,
                average_utilization, validation_status, validation_errors_json,
                validated_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                optimization_id,
                result.delivery_id,
                result.pallets.len() as i64,
                result.summary.total_windows,
                result.summary.average_utilization,
                result.verdict.status.to_db_str(),
                errors_json,
                result
                    .verdict
                    .validated_at
                    .map(|t| t.format(DATETIME_FORMAT).to_string()),
                now,
            ],
        )?;

        // 3. 插入托盘
        for (pallet, windows_json) in &pallet_payloads {
            tx.execute(
                r#"
                INSERT INTO optimized_pallet (
                    optimization_id, pallet_number, pallet_type, pallet_length_mm,
                    max_depth_mm, used_depth_mm, utilization_percent, windows_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    optimization_id,
                    pallet.pallet_number,
                    pallet.pallet_type,
                    pallet.pallet_length_mm,
                    pallet.max_depth_mm,
                    pallet.used_depth_mm,
                    pallet.utilization_percent,
                    windows_json,
                ],
            )?;
        }

        tx.commit()?;

        tracing::debug!(
            "优化结果已保存: delivery_id={}, optimization_id={}, pallets={}, replaced={}",
            result.delivery_id,
            optimization_id,
            result.pallets.len(),
            replaced
        );
        Ok(optimization_id)
    }

    /// 读取交付的优化结果
    ///
    /// # 返回
    /// - Ok(None): 无结果
    /// - Err(CorruptPalletData): 某托盘装载快照无法解析
    pub fn find_by_delivery(&self, delivery_id: i64) -> RepositoryResult<Option<OptimizationResult>> {
        let conn = self.get_conn()?;

        let header = match find_header(&conn, delivery_id)? {
            Some(h) => h,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT pallet_number, pallet_type, pallet_length_mm, max_depth_mm, windows_json
            FROM optimized_pallet
            WHERE optimization_id = ?1
            ORDER BY pallet_number
            "#,
        )?;
        let rows = stmt
            .query_map(params![header.optimization_id], |row| {
                Ok(PalletRow {
                    pallet_number: row.get(0)?,
                    pallet_type: row.get(1)?,
                    pallet_length_mm: row.get(2)?,
                    max_depth_mm: row.get(3)?,
                    windows_json: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let pallets = rows
            .into_iter()
            .map(pallet_from_row)
            .collect::<RepositoryResult<Vec<_>>>()?;
        let verdict = verdict_from_header(&header)?;

        Ok(Some(OptimizationResult::with_verdict(
            delivery_id,
            pallets,
            verdict,
        )))
    }

    /// 只读取校验结论（不解析托盘快照）
    pub fn find_verdict(&self, delivery_id: i64) -> RepositoryResult<Option<ValidationVerdict>> {
        let conn = self.get_conn()?;
        match find_header(&conn, delivery_id)? {
            Some(header) => Ok(Some(verdict_from_header(&header)?)),
            None => Ok(None),
        }
    }

    /// 交付是否已有优化结果
    pub fn exists(&self, delivery_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        Ok(find_header(&conn, delivery_id)?.is_some())
    }

    /// 删除交付的优化结果,不存在时返回 NotFound
    pub fn delete_by_delivery(&self, delivery_id: i64) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            DELETE FROM optimized_pallet
            WHERE optimization_id IN (
                SELECT optimization_id FROM pallet_optimization WHERE delivery_id = ?1
            )
            "#,
            params![delivery_id],
        )?;
        let affected = tx.execute(
            "DELETE FROM pallet_optimization WHERE delivery_id = ?1",
            params![delivery_id],
        )?;
        if affected == 0 {
            // tx drop 时回滚
            return Err(RepositoryError::not_found("PalletOptimization", delivery_id));
        }

        tx.commit()?;
        Ok(())
    }

    /// 写入校验结论
    ///
    /// 不存在优化结果时返回 NotFound
    pub fn update_validation(
        &self,
        delivery_id: i64,
        status: ValidationStatus,
        errors: &[ValidationIssue],
        validated_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let errors_json = serialize_errors(errors)?;
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"
            UPDATE pallet_optimization
            SET validation_status = ?1, validation_errors_json = ?2, validated_at = ?3
            WHERE delivery_id = ?4
            "#,
            params![
                status.to_db_str(),
                errors_json,
                validated_at.format(DATETIME_FORMAT).to_string(),
                delivery_id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("PalletOptimization", delivery_id));
        }
        Ok(())
    }
}

// ==========================================
// 映射辅助
// ==========================================

fn find_header(conn: &Connection, delivery_id: i64) -> RepositoryResult<Option<OptimizationHeaderRow>> {
    let header = conn
        .query_row(
            r#"
            SELECT optimization_id, validation_status, validation_errors_json, validated_at
            FROM pallet_optimization
            WHERE delivery_id = ?1
            "#,
            params![delivery_id],
            |row| {
                Ok(OptimizationHeaderRow {
                    optimization_id: row.get(0)?,
                    validation_status: row.get(1)?,
                    validation_errors_json: row.get(2)?,
                    validated_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(header)
}

fn pallet_from_row(row: PalletRow) -> RepositoryResult<OptimizedPallet> {
    let windows: Vec<OptimizedWindow> =
        serde_json::from_str(&row.windows_json).map_err(|e| RepositoryError::CorruptPalletData {
            pallet_number: row.pallet_number,
            message: e.to_string(),
        })?;

    // 已用深度与利用率以装载快照为准,存储列仅供直接查库
    let mut pallet = OptimizedPallet {
        pallet_number: row.pallet_number,
        pallet_type: row.pallet_type,
        pallet_length_mm: row.pallet_length_mm,
        max_depth_mm: row.max_depth_mm,
        used_depth_mm: 0,
        utilization_percent: 0.0,
        windows,
    };
    pallet.recalculate_usage();
    Ok(pallet)
}

fn verdict_from_header(header: &OptimizationHeaderRow) -> RepositoryResult<ValidationVerdict> {
    let status = ValidationStatus::parse(&header.validation_status).ok_or_else(|| {
        RepositoryError::FieldValueError {
            field: "validation_status".to_string(),
            message: format!("未知校验状态: {}", header.validation_status),
        }
    })?;

    let errors = match header.validation_errors_json.as_deref() {
        None | Some("") => Vec::new(),
        Some(raw) => serde_json::from_str::<Vec<ValidationIssue>>(raw).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "validation_errors_json".to_string(),
                message: e.to_string(),
            }
        })?,
    };

    let validated_at = match header.validated_at.as_deref() {
        None => None,
        Some(raw) => Some(NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "validated_at".to_string(),
                message: e.to_string(),
            }
        })?),
    };

    Ok(ValidationVerdict {
        status,
        errors,
        validated_at,
    })
}

fn serialize_errors(errors: &[ValidationIssue]) -> RepositoryResult<Option<String>> {
    if errors.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(errors)
        .map(Some)
        .map_err(|e| RepositoryError::FieldValueError {
            field: "validation_errors_json".to_string(),
            message: e.to_string(),
        })
}
