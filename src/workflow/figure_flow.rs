//! 图表流程 - 流程层
//!
//! 抽取 → 补丁。抽取失败（重试次数用尽或不可重试错误）时不做任何补丁，
//! 错误交给调用方决定如何处理。

use tracing::info;

use crate::error::AppResult;
use crate::models::survey::Survey;
use crate::services::{apply_figures, FigureExtractor, PatchReport};

/// 图表流程
pub struct FigureFlow {
    extractor: FigureExtractor,
}

impl FigureFlow {
    pub fn new(extractor: FigureExtractor) -> Self {
        Self { extractor }
    }

    /// 为综述抽取并插入图表
    pub async fn run(&self, survey: &mut Survey) -> AppResult<PatchReport> {
        if survey.sections.is_empty() {
            info!("[综述 {}] 没有章节正文, 跳过图表阶段", survey.title);
            return Ok(PatchReport::default());
        }

        info!("[综述 {}] 🖼  开始抽取图表...", survey.title);
        let figures = self
            .extractor
            .extract(&survey.all_content(), &survey.section_titles())
            .await?;

        let report = apply_figures(survey, &figures);
        info!(
            "[综述 {}] ✓ 图表处理完成: 插入 {}, 丢弃 {}",
            survey.title,
            report.inserted,
            report.dropped()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outline::Outline;
    use crate::models::survey::Section;
    use crate::prompts::get_prompts;
    use crate::test_support::{Step, StepLlm};
    use std::sync::Arc;

    fn survey() -> Survey {
        let mut survey = Survey::new("T", Outline::default());
        survey
            .sections
            .push(Section::new("Intro", "Background first. Results improved."));
        survey
    }

    #[tokio::test]
    async fn test_failed_extraction_leaves_survey_untouched() {
        let llm = Arc::new(StepLlm::new(|_, _| {
            Ok("Section Title: Intro\nPosition Sentence: Results improved.\n".to_string())
        }));
        let flow = FigureFlow::new(
            FigureExtractor::new(llm.clone(), get_prompts("en")).with_max_attempts(3),
        );
        let mut survey = survey();
        let before = survey.clone();

        assert!(flow.run(&mut survey).await.is_err());
        assert_eq!(survey, before);
        assert_eq!(llm.calls(Step::Chart), 3);
    }

    #[tokio::test]
    async fn test_no_sections_skips_llm() {
        let llm = Arc::new(StepLlm::new(|_, _| Ok(String::new())));
        let flow = FigureFlow::new(FigureExtractor::new(llm.clone(), get_prompts("en")));
        let mut survey = Survey::new("T", Outline::default());

        let report = flow.run(&mut survey).await.unwrap();

        assert_eq!(report, PatchReport::default());
        assert_eq!(llm.total_calls(), 0);
    }
}
