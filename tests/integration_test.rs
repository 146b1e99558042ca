use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use survey_refine::error::{AppError, AppResult, LlmError};
use survey_refine::models::survey::{Paper, Section};
use survey_refine::models::{load_survey, save_survey};
use survey_refine::prompts::get_prompts;
use survey_refine::{
    App, CandidateFlow, Config, Figure, FigureKind, LlmClient, Outline, OutlineSection,
    OutlineService, RefineLoop, RoundExecutor, StageClients, Survey,
};

const OUTLINE_REPLY: &str = "```markdown
# LLM Surveys
## 1 Intro
Digest Construction: Background and motivation [smith2020].
Digest Analysis: Why results improved.
```";

const CHART_REPLY: &str = "Here is one figure.

Section Title: Intro
Position Sentence: Results improved.
Figure Title: Flow
```mermaid
graph TD
A-->B
```
";

/// 按 prompt 首行区分步骤的模拟 LLM
struct MockLlm {
    suggest: AtomicUsize,
    modify: AtomicUsize,
    evaluate: AtomicUsize,
    chart: AtomicUsize,
    chart_reply: &'static str,
}

impl MockLlm {
    fn new(chart_reply: &'static str) -> Self {
        Self {
            suggest: AtomicUsize::new(0),
            modify: AtomicUsize::new(0),
            evaluate: AtomicUsize::new(0),
            chart: AtomicUsize::new(0),
            chart_reply,
        }
    }

    fn counts(&self) -> [usize; 4] {
        [
            self.suggest.load(Ordering::SeqCst),
            self.modify.load(Ordering::SeqCst),
            self.evaluate.load(Ordering::SeqCst),
            self.chart.load(Ordering::SeqCst),
        ]
    }
}

fn first_line(template: &str) -> &str {
    template.lines().next().unwrap_or_default()
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let prompts = get_prompts("en");
        if prompt.starts_with(first_line(prompts.suggest)) {
            self.suggest.fetch_add(1, Ordering::SeqCst);
            Ok("Explain the motivation more clearly.".to_string())
        } else if prompt.starts_with(first_line(prompts.modify)) {
            self.modify.fetch_add(1, Ordering::SeqCst);
            Ok(OUTLINE_REPLY.to_string())
        } else if prompt.starts_with(first_line(prompts.evaluate)) {
            let n = self.evaluate.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Clear structure.\nScore: {}", 60 + n))
        } else if prompt.starts_with(first_line(prompts.chart)) {
            self.chart.fetch_add(1, Ordering::SeqCst);
            Ok(self.chart_reply.to_string())
        } else {
            Err(AppError::Llm(LlmError::EmptyContent {
                model: "mock".to_string(),
            }))
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "survey_refine_it_{}_{}.json",
        std::process::id(),
        name
    ))
}

fn sample_survey() -> Survey {
    let mut survey = Survey::new(
        "LLM Surveys",
        Outline::new("LLM Surveys", vec![OutlineSection::new("Intro")]),
    );
    survey.papers.insert(
        "smith2020".to_string(),
        Paper {
            title: "Scaling laws".to_string(),
            ..Paper::default()
        },
    );
    survey
        .sections
        .push(Section::new("Intro", "Background first. Results improved."));
    survey
}

fn config_for(name: &str, rounds: usize, width: usize) -> Config {
    Config {
        best_of: width,
        refine_count: rounds,
        max_concurrent_candidates: Some(width),
        input_path: temp_path(&format!("{}_in", name)).display().to_string(),
        output_path: temp_path(&format!("{}_out", name)).display().to_string(),
        ..Config::default()
    }
}

fn expected_marker() -> String {
    Figure {
        position_sentence: "Results improved.".to_string(),
        title: "Flow".to_string(),
        kind: FigureKind::Mermaid,
        body: "graph TD\nA-->B".to_string(),
    }
    .marker()
}

#[tokio::test]
async fn test_end_to_end_refine_and_insert_figure() {
    let config = config_for("e2e", 2, 2);
    save_survey(PathBuf::from(&config.input_path).as_path(), &sample_survey())
        .await
        .unwrap();

    let llm = Arc::new(MockLlm::new(CHART_REPLY));
    let app = App::with_clients(config.clone(), StageClients::uniform(llm.clone())).unwrap();
    let report = app.run().await.unwrap();

    assert_eq!(report.refine.rounds_run, 2);
    assert_eq!(report.figures.inserted, 1);
    assert_eq!(llm.counts(), [4, 4, 4, 1]);

    let saved = load_survey(PathBuf::from(&config.output_path).as_path())
        .await
        .unwrap();
    let marker = expected_marker();
    let body = &saved.sections[0].content;
    assert_eq!(body.matches(&marker).count(), 1);
    assert_eq!(
        body,
        &format!("Background first. \n{}\nResults improved.", marker)
    );
    assert_eq!(saved.score_history.len(), 2);
    assert_eq!(saved.best_of, Some(2));
    assert_eq!(saved.refine_count, Some(2));
    assert!(saved
        .outline_markdown
        .as_deref()
        .unwrap()
        .starts_with("```markdown\n# LLM Surveys\n## 1 Intro"));
}

#[tokio::test]
async fn test_failed_figure_stage_still_saves_refined_survey() {
    let mut config = config_for("no_fig", 1, 1);
    config.figure_max_attempts = 2;
    save_survey(PathBuf::from(&config.input_path).as_path(), &sample_survey())
        .await
        .unwrap();

    let llm = Arc::new(MockLlm::new(
        "Section Title: Conclusion\nPosition Sentence: Nowhere.\nFigure Title: X\n```markdown\n| a |\n```\n",
    ));
    let app = App::with_clients(config.clone(), StageClients::uniform(llm.clone())).unwrap();
    let err = app.run().await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(llm.counts()[3], 2);

    let saved = load_survey(PathBuf::from(&config.output_path).as_path())
        .await
        .unwrap();
    assert_eq!(saved.sections[0].content, "Background first. Results improved.");
    assert_eq!(saved.score_history, vec![vec![60.0]]);
}

#[tokio::test]
async fn test_refine_loop_call_counts() {
    for (rounds, width) in [(0, 3), (1, 1), (3, 2)] {
        let llm = Arc::new(MockLlm::new(""));
        let service = OutlineService::new(StageClients::uniform(llm.clone()), get_prompts("en"), 3);
        let executor = RoundExecutor::new(CandidateFlow::new(service), width);
        let refine = RefineLoop::new(executor, rounds, width);

        let mut survey = sample_survey();
        let summary = refine.run(&mut survey).await.unwrap();

        let expected = rounds * width;
        assert_eq!(summary.rounds_run, rounds);
        assert_eq!(llm.counts(), [expected, expected, expected, 0]);
        assert_eq!(survey.score_history.len(), rounds);
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = Config {
        best_of: 0,
        ..Config::default()
    };
    let llm = Arc::new(MockLlm::new(""));
    assert!(App::with_clients(config, StageClients::uniform(llm)).is_err());
}
