// ==========================================
// 托盘类型目录 / 型材深度表 API 测试
// ==========================================


use pallet_loading::api::{ApiError, PalletTypeRequest};
use pallet_loading::app::AppState;
use pallet_loading::engine::MAX_PROFILE_DEPTH_MM;
use test_helpers::*;

fn request(name: &str, length_mm: i64, load_depth_mm: i64) -> PalletTypeRequest {
    PalletTypeRequest {
        name: name.to_string(),
        length_mm,
        load_depth_mm,
    }
}

#[test]
fn test_pallet_type_crud() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    let api = &state.optimizer_api;

    let short = api.create_pallet_type(request("L2500", 2500, 800)).unwrap();
    let long = api.create_pallet_type(request("L6000", 6000, 1200)).unwrap();
    api.create_pallet_type(request("L4000", 4000, 1000)).unwrap();

    // 始终按承载长度降序
    let names: Vec<String> = api
        .list_pallet_types()
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["L6000", "L4000", "L2500"]);

    assert_eq!(api.get_pallet_type(long.pallet_type_id).unwrap(), long);

    let updated = api
        .update_pallet_type(short.pallet_type_id, request("L3000", 3000, 900))
        .unwrap();
    assert_eq!(api.get_pallet_type(short.pallet_type_id).unwrap(), updated);

    api.delete_pallet_type(short.pallet_type_id).unwrap();
    assert_eq!(api.list_pallet_types().unwrap().len(), 2);
}

#[test]
fn test_pallet_type_not_found_is_uniform() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    let api = &state.optimizer_api;

    for result in [
        api.get_pallet_type(99).map(|_| ()),
        api.update_pallet_type(99, request("X", 1000, 500)).map(|_| ()),
        api.delete_pallet_type(99),
    ] {
        match result {
            Err(ApiError::NotFound(msg)) => assert!(msg.contains("PalletType")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}

#[test]
fn test_duplicate_or_invalid_pallet_type_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    let api = &state.optimizer_api;

    api.create_pallet_type(request("L6000", 6000, 1200)).unwrap();
    assert!(matches!(
        api.create_pallet_type(request("L6000", 5000, 1000)),
        Err(ApiError::BusinessRuleViolation(_))
    ));
    assert!(matches!(
        api.create_pallet_type(request("", 5000, 1000)),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.create_pallet_type(request("L0", 0, 1000)),
        Err(ApiError::InvalidInput(_))
    ));
    assert_eq!(api.list_pallet_types().unwrap().len(), 1);
}

#[test]
fn test_profile_depth_maintenance_feeds_optimizer() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let conn = open_test_connection(&db_path).unwrap();
        insert_delivery(&conn, 1);
        insert_order(&conn, 101, Some(1));
        insert_window(&conn, 1001, 101, 3000, "82mm", 10);
    }
    let state = AppState::new(db_path).unwrap();
    let api = &state.optimizer_api;
    api.create_pallet_type(request("L4000", 4000, 1000)).unwrap();

    assert!(matches!(api.optimize(1), Err(ApiError::ConfigurationError(_))));

    api.upsert_profile_depth("82mm", 82).unwrap();
    let result = api.optimize(1).unwrap();
    assert_eq!(result.pallets[0].used_depth_mm, 820);

    api.upsert_profile_depth("82mm", 120).unwrap();
    let result = api.optimize(1).unwrap();
    // 8 × 120 = 960 ≤ 1000, 剩 2 件开第二个托盘
    assert_eq!(result.total_pallets, 2);
    assert_eq!(result.pallets[0].window_count(), 8);

    let depths = api.list_profile_depths().unwrap();
    assert_eq!(depths.len(), 1);
    assert_eq!(depths[0].depth_mm, 120);

    assert!(matches!(
        api.upsert_profile_depth("82mm", 0),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.upsert_profile_depth("82mm", MAX_PROFILE_DEPTH_MM + 1),
        Err(ApiError::InvalidInput(_))
    ));
    api.delete_profile_depth("82mm").unwrap();
    assert!(matches!(
        api.delete_profile_depth("82mm"),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_delete_optimization_then_not_found() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_standard_delivery(&db_path, 1);
    let state = AppState::new(db_path).unwrap();
    let api = &state.optimizer_api;

    api.optimize(1).unwrap();
    api.delete_optimization(1).unwrap();
    assert!(api.get_optimization(1).unwrap().is_none());

    match api.delete_optimization(1) {
        Err(ApiError::NotFound(msg)) => assert!(msg.contains("PalletOptimization")),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}
