//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责轮次调度和并发控制，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 加载 / 保存综述
//! - 依次运行精修阶段和图表阶段
//! - 输出全局统计信息
//!
//! ### `refine_loop` - 精修循环控制器
//! - 串行执行 R 轮，每轮以上一轮的胜者为输入
//! - 记录每轮得分，提交最终大纲
//!
//! ### `round_executor` - Best-of-N 单轮执行器
//! - 并发运行 N 个相同输入的候选（JoinSet + Semaphore）
//! - 隔离单个候选的失败，选出最高分
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一篇 Survey)
//!     ↓
//! refine_loop (处理 R 轮)
//!     ↓
//! round_executor (处理一轮中的 N 个候选)
//!     ↓
//! workflow::CandidateFlow (处理单个候选)
//!     ↓
//! services (能力层：outline / figure / llm / retry)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：refine_loop 管轮次，round_executor 管候选
//! 2. **向下依赖**：编排层 → workflow → services
//! 3. **无业务逻辑**：只做调度和统计，不解析 LLM 回复

pub mod app;
pub mod refine_loop;
pub mod round_executor;

// 重新导出主要类型
pub use app::{App, RunReport};
pub use refine_loop::{RefineLoop, RefineSummary};
pub use round_executor::{select_best, RoundExecutor, RoundOutcome};
