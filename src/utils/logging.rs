/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则默认 `info`，`verbose` 时为 `debug`。
/// 重复调用不会报错（测试中多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 综述精修启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "📊 精修轮数: {}, 每轮候选数: {}, 最大并发: {}",
        config.refine_count, config.best_of, config.max_concurrent_candidates()
    );
    info!(
        "🌐 语言: {}, 模型: {}, 图表阶段: {}",
        config.language,
        config.llm_model_name,
        if config.enable_figures { "开启" } else { "关闭" }
    );
    info!("{}", "=".repeat(60));
}

/// 记录一轮精修开始
pub fn log_round_start(title: &str, round: usize, total_rounds: usize, width: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📦 [{}] 第 {}/{} 轮精修开始, best of {}",
        title,
        round + 1,
        total_rounds,
        width
    );
}

/// 记录一轮精修结束
pub fn log_round_complete(title: &str, round: usize, best_score: f64, scores: &[f64]) {
    info!(
        "✓ [{}] 第 {} 轮精修结束, 最高分: {}, 全部得分: {:?}",
        title,
        round + 1,
        best_score,
        scores
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(title: &str, rounds_run: usize, figures_inserted: usize, output: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成: {}", title);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 精修轮数: {}", rounds_run);
    info!("🖼  插入图表: {}", figures_inserted);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output);
}
