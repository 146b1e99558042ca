//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、创建各阶段 LLM 客户端、选择提示词语言
//! 2. **加载综述**：读取输入 JSON
//! 3. **精修阶段**：运行 [`RefineLoop`]
//! 4. **图表阶段**：运行 [`FigureFlow`]（可关闭）
//! 5. **保存结果**：写出输出 JSON，输出统计信息
//!
//! 图表阶段失败时仍然保存不含图表的综述，然后再把错误返回给调用方。

use std::path::Path;
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::loaders::{load_survey, save_survey};
use crate::models::survey::Survey;
use crate::orchestrator::refine_loop::{RefineLoop, RefineSummary};
use crate::orchestrator::round_executor::RoundExecutor;
use crate::prompts::get_prompts;
use crate::services::{FigureExtractor, OutlineService, PatchReport, StageClients};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{CandidateFlow, FigureFlow};

/// 一次运行的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub refine: RefineSummary,
    pub figures: PatchReport,
}

/// 应用主结构
pub struct App {
    config: Config,
    refine_loop: RefineLoop,
    figure_flow: FigureFlow,
}

impl App {
    /// 初始化应用，使用配置中的 OpenAI 兼容接口
    pub fn initialize(config: Config) -> AppResult<Self> {
        let clients = StageClients::from_config(&config);
        Self::with_clients(config, clients)
    }

    /// 使用给定的 LLM 客户端初始化应用
    pub fn with_clients(config: Config, clients: StageClients) -> AppResult<Self> {
        config.validate()?;
        log_startup(&config);

        let prompts = get_prompts(&config.language);

        let outline_service =
            OutlineService::new(clients.clone(), prompts, config.step_max_attempts);
        let executor = RoundExecutor::new(
            CandidateFlow::new(outline_service),
            config.max_concurrent_candidates(),
        );
        let refine_loop = RefineLoop::new(executor, config.refine_count, config.best_of)
            .with_early_stop(config.early_stop_patience);

        let extractor = FigureExtractor::new(clients.chart, prompts)
            .with_max_attempts(config.figure_max_attempts);

        Ok(Self {
            config,
            refine_loop,
            figure_flow: FigureFlow::new(extractor),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunReport> {
        info!("\n📁 正在加载综述: {}", self.config.input_path);
        let mut survey = load_survey(Path::new(&self.config.input_path)).await?;

        let refine = self.refine_loop.run(&mut survey).await?;

        let (figures, figure_error) = if self.config.enable_figures {
            match self.figure_flow.run(&mut survey).await {
                Ok(report) => (report, None),
                Err(e) => {
                    error!("[综述 {}] ❌ 图表阶段失败, 保存不含图表的结果: {}", survey.title, e);
                    (PatchReport::default(), Some(e))
                }
            }
        } else {
            info!("图表阶段已关闭");
            (PatchReport::default(), None)
        };

        self.save(&survey).await?;
        print_final_stats(
            &survey.title,
            refine.rounds_run,
            figures.inserted,
            &self.config.output_path,
        );

        match figure_error {
            Some(e) => Err(e),
            None => Ok(RunReport { refine, figures }),
        }
    }

    async fn save(&self, survey: &Survey) -> AppResult<()> {
        save_survey(Path::new(&self.config.output_path), survey).await
    }
}
