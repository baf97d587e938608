// ==========================================
// 托盘装载优化系统 - 命令行入口
// ==========================================
// 用法: pallet-loading <command> [delivery_id]
// 输出: stdout 打印 JSON；日志写 stderr
// ==========================================

use anyhow::{anyhow, bail, Context};
use pallet_loading::app::{get_default_db_path, AppState};
use pallet_loading::logging;
use serde::Serialize;

const USAGE: &str = "用法: pallet-loading <optimize|show|validate|can-ship|pallet-types> [delivery_id]";

fn main() {
    logging::init();

    if let Err(e) = run(std::env::args().skip(1).collect()) {
        tracing::error!("执行失败: {:#}", e);
        eprintln!("错误: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Vec<String>) -> anyhow::Result<()> {
    let command = args.first().ok_or_else(|| anyhow!(USAGE))?.as_str();

    tracing::info!("{} v{}", pallet_loading::APP_NAME, pallet_loading::VERSION);
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match command {
        "pallet-types" => print_json(&state.optimizer_api.list_pallet_types()?),
        "optimize" => {
            let delivery_id = parse_delivery_id(&args)?;
            print_json(&state.optimizer_api.optimize(delivery_id)?)
        }
        "show" => {
            let delivery_id = parse_delivery_id(&args)?;
            print_json(&state.optimizer_api.get_optimization(delivery_id)?)
        }
        "validate" => {
            let delivery_id = parse_delivery_id(&args)?;
            print_json(&state.validation_api.validate_and_record(delivery_id)?)
        }
        "can-ship" => {
            let delivery_id = parse_delivery_id(&args)?;
            print_json(&state.validation_api.can_ship_delivery(delivery_id)?)
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }
}

fn parse_delivery_id(args: &[String]) -> anyhow::Result<i64> {
    let raw = args.get(1).ok_or_else(|| anyhow!("缺少 delivery_id\n{}", USAGE))?;
    raw.parse::<i64>()
        .with_context(|| format!("delivery_id 不是整数: {}", raw))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
