// ==========================================
// 托盘优化引擎 + 优化 API 集成测试
// ==========================================
// 测试目标: 首次适应递减装箱的不变量与典型场景
// 覆盖范围: 守恒、深度容量、悬挑上限、编号连续、确定性、失败不落库
// ==========================================


use pallet_loading::api::{ApiError, PalletTypeRequest};
use pallet_loading::app::AppState;
use pallet_loading::domain::{
    DeliveryWindow, OptimizationResult, PalletTypeDefinition, ValidationStatus, MAX_OVERHANG_MM,
};
use pallet_loading::engine::{OptimizationError, PalletOptimizer};
use pallet_loading::repository::DeliveryRepository;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use test_helpers::*;

// ==========================================
// 测试辅助函数
// ==========================================

fn catalog() -> Vec<PalletTypeDefinition> {
    vec![
        PalletTypeDefinition {
            pallet_type_id: 1,
            name: "L6000".to_string(),
            length_mm: 6000,
            load_depth_mm: 1200,
        },
        PalletTypeDefinition {
            pallet_type_id: 2,
            name: "L4000".to_string(),
            length_mm: 4000,
            load_depth_mm: 1000,
        },
        PalletTypeDefinition {
            pallet_type_id: 3,
            name: "L2500".to_string(),
            length_mm: 2500,
            load_depth_mm: 800,
        },
    ]
}

fn depths() -> HashMap<String, i64> {
    let mut depths = HashMap::new();
    depths.insert("58mm".to_string(), 58);
    depths.insert("70mm".to_string(), 70);
    depths.insert("82mm".to_string(), 82);
    depths
}

fn random_windows(seed: u64, count: usize) -> Vec<DeliveryWindow> {
    let profiles = ["58mm", "70mm", "82mm"];
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let order_id = 1 + (i as i64 % 3);
            DeliveryWindow {
                window_id: 100 + i as i64,
                order_id,
                order_number: format!("ZL-{:04}", order_id),
                width_mm: rng.random_range(500..=6700),
                height_mm: rng.random_range(600..=2400),
                profile_type: profiles[rng.random_range(0..profiles.len())].to_string(),
                quantity: rng.random_range(1..=12),
                reference: None,
            }
        })
        .collect()
}

fn assert_invariants(windows: &[DeliveryWindow], result: &OptimizationResult) {
    // 守恒: 每个明细的装载件数之和等于输入数量
    let mut placed: HashMap<i64, i64> = HashMap::new();
    for pallet in &result.pallets {
        for w in &pallet.windows {
            *placed.entry(w.window_id).or_insert(0) += w.quantity;
        }
    }
    for window in windows {
        assert_eq!(
            placed.get(&window.window_id).copied().unwrap_or(0),
            window.quantity,
            "window {} quantity not conserved",
            window.window_id
        );
    }
    let input_total: i64 = windows.iter().map(|w| w.quantity).sum();
    assert_eq!(result.summary.total_windows, input_total);

    for (index, pallet) in result.pallets.iter().enumerate() {
        // 编号连续
        assert_eq!(pallet.pallet_number as usize, index + 1);
        // 深度容量
        assert!(pallet.used_depth_mm <= pallet.max_depth_mm);
        let recomputed: i64 = pallet.windows.iter().map(|w| w.depth_mm * w.quantity).sum();
        assert_eq!(pallet.used_depth_mm, recomputed);
        // 悬挑上限
        for w in &pallet.windows {
            assert!(w.width_mm <= pallet.pallet_length_mm + MAX_OVERHANG_MM);
        }
    }
    assert_eq!(result.total_pallets, result.pallets.len());
}

// ==========================================
// 纯引擎测试
// ==========================================

#[test]
fn test_invariants_hold_on_generated_deliveries() {
    let optimizer = PalletOptimizer::new();
    for seed in 1..=25u64 {
        let windows = random_windows(seed, 30);
        let result = optimizer
            .optimize(seed as i64, &windows, &catalog(), &depths())
            .unwrap();
        assert_invariants(&windows, &result);
    }
}

#[test]
fn test_determinism_on_generated_delivery() {
    let optimizer = PalletOptimizer::new();
    let windows = random_windows(42, 40);

    let first = optimizer.optimize(1, &windows, &catalog(), &depths()).unwrap();
    let second = optimizer.optimize(1, &windows, &catalog(), &depths()).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_scenario_a_single_type_17_3_split() {
    let optimizer = PalletOptimizer::new();
    let windows = vec![DeliveryWindow {
        window_id: 1,
        order_id: 1,
        order_number: "ZL-0001".to_string(),
        width_mm: 5000,
        height_mm: 1500,
        profile_type: "70mm".to_string(),
        quantity: 20,
        reference: None,
    }];
    let catalog = vec![PalletTypeDefinition {
        pallet_type_id: 1,
        name: "L6000".to_string(),
        length_mm: 6000,
        load_depth_mm: 1200,
    }];

    let result = optimizer.optimize(1, &windows, &catalog, &depths()).unwrap();

    assert_eq!(result.total_pallets, 2);
    assert_eq!(result.pallets[0].window_count(), 17);
    assert_eq!(result.pallets[0].used_depth_mm, 1190);
    assert_eq!(result.pallets[1].window_count(), 3);
    assert_eq!(result.pallets[1].used_depth_mm, 210);
    assert_invariants(&windows, &result);
}

#[test]
fn test_scenario_b_unit_wider_than_every_pallet() {
    let optimizer = PalletOptimizer::new();
    let windows = vec![DeliveryWindow {
        window_id: 9,
        order_id: 1,
        order_number: "ZL-0001".to_string(),
        width_mm: 6701,
        height_mm: 1500,
        profile_type: "70mm".to_string(),
        quantity: 1,
        reference: None,
    }];

    let err = optimizer
        .optimize(1, &windows, &catalog(), &depths())
        .unwrap_err();
    match err {
        OptimizationError::UnassignableUnit {
            window_id, width_mm, ..
        } => {
            assert_eq!(window_id, 9);
            assert_eq!(width_mm, 6701);
        }
        other => panic!("Expected UnassignableUnit, got {:?}", other),
    }
}

// ==========================================
// API 集成测试（读库 → 引擎 → 原子保存）
// ==========================================

#[test]
fn test_optimize_delivery_persists_pending_result() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_standard_delivery(&db_path, 1);
    let state = AppState::new(db_path).unwrap();

    let result = state.optimizer_api.optimize(1).unwrap();
    assert_eq!(result.total_pallets, 2);
    assert_eq!(result.verdict.status, ValidationStatus::Pending);

    let stored = state.optimizer_api.get_optimization(1).unwrap().unwrap();
    assert_eq!(stored.pallets, result.pallets);
    assert_eq!(stored.summary, result.summary);
    assert_eq!(stored.verdict.status, ValidationStatus::Pending);
    assert!(state.optimizer_api.has_optimization(1).unwrap());
}

#[test]
fn test_scenario_c_delivery_without_windows() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let conn = open_test_connection(&db_path).unwrap();
        insert_pallet_type(&conn, "L6000", 6000, 1200);
        insert_delivery(&conn, 5);
    }
    let delivery_repo = DeliveryRepository::new(open_shared_connection(&db_path));
    assert!(delivery_repo.exists(5).unwrap());
    assert!(!delivery_repo.exists(6).unwrap());
    assert!(delivery_repo.list_delivery_windows(5).unwrap().is_empty());

    let state = AppState::new(db_path).unwrap();

    let result = state.optimizer_api.optimize(5).unwrap();
    assert_eq!(result.total_pallets, 0);
    assert_eq!(result.summary.total_windows, 0);
    assert_eq!(result.summary.average_utilization, 0.0);

    let stored = state.optimizer_api.get_optimization(5).unwrap().unwrap();
    assert!(stored.pallets.is_empty());
}

#[test]
fn test_optimize_unknown_delivery_is_not_found() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    match state.optimizer_api.optimize(404) {
        Err(ApiError::NotFound(msg)) => assert!(msg.contains("Delivery")),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_missing_profile_depth_fails_without_persisting() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let conn = open_test_connection(&db_path).unwrap();
        insert_pallet_type(&conn, "L6000", 6000, 1200);
        insert_delivery(&conn, 2);
        insert_order(&conn, 201, Some(2));
        insert_window(&conn, 2001, 201, 3000, "90mm", 4);
    }
    let state = AppState::new(db_path).unwrap();

    match state.optimizer_api.optimize(2) {
        Err(ApiError::ConfigurationError(msg)) => assert!(msg.contains("90mm")),
        other => panic!("Expected ConfigurationError, got {:?}", other),
    }
    assert!(!state.optimizer_api.has_optimization(2).unwrap());
}

#[test]
fn test_failed_reoptimization_keeps_previous_result() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_standard_delivery(&db_path, 3);
    let state = AppState::new(db_path.clone()).unwrap();
    let first = state.optimizer_api.optimize(3).unwrap();

    // 追加一件超宽明细后重新优化失败
    {
        let conn = open_test_connection(&db_path).unwrap();
        insert_window(&conn, 3999, 301, 9000, "70mm", 1);
    }
    match state.optimizer_api.optimize(3) {
        Err(ApiError::Infeasible(msg)) => assert!(msg.contains("3999")),
        other => panic!("Expected Infeasible, got {:?}", other),
    }

    let stored = state.optimizer_api.get_optimization(3).unwrap().unwrap();
    assert_eq!(stored.pallets, first.pallets);
}

#[test]
fn test_flatten_ignores_orders_of_other_deliveries() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let conn = open_test_connection(&db_path).unwrap();
        insert_pallet_type(&conn, "L6000", 6000, 1200);
        insert_profile_depth(&conn, "70mm", 70);
        insert_delivery(&conn, 1);
        insert_delivery(&conn, 2);
        insert_order(&conn, 11, Some(1));
        insert_order(&conn, 12, Some(2));
        insert_order(&conn, 13, None);
        insert_window(&conn, 101, 11, 2000, "70mm", 2);
        insert_window(&conn, 102, 12, 2000, "70mm", 5);
        insert_window(&conn, 103, 13, 2000, "70mm", 7);
    }
    let state = AppState::new(db_path).unwrap();

    let result = state.optimizer_api.optimize(1).unwrap();
    assert_eq!(result.summary.total_windows, 2);
    assert_eq!(result.pallets[0].windows[0].order_number, "ZL-0011");
    assert_eq!(
        result.pallets[0].windows[0].reference.as_deref(),
        Some("POS-101")
    );
}

#[test]
fn test_catalog_edit_does_not_change_stored_result() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_standard_delivery(&db_path, 4);
    let state = AppState::new(db_path).unwrap();
    let first = state.optimizer_api.optimize(4).unwrap();

    let pallet_type = state.optimizer_api.list_pallet_types().unwrap().remove(0);
    state
        .optimizer_api
        .update_pallet_type(
            pallet_type.pallet_type_id,
            PalletTypeRequest {
                name: "L6000".to_string(),
                length_mm: 6000,
                load_depth_mm: 2000,
            },
        )
        .unwrap();

    let stored = state.optimizer_api.get_optimization(4).unwrap().unwrap();
    assert_eq!(stored.pallets[0].max_depth_mm, 1200);
    assert_eq!(stored.pallets, first.pallets);
}
