//! 综述文档
//!
//! 由调用方在精修前创建，精修循环只修改大纲和得分历史，
//! 图表补丁只修改章节正文。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::outline::{Outline, RenderOptions};

/// 参考文献元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
}

/// 已写成的章节正文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// 综述
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub title: String,
    /// bibkey → 文献
    #[serde(default)]
    pub papers: HashMap<String, Paper>,
    /// 当前大纲
    #[serde(default)]
    pub skeleton: Outline,
    /// 最近一次提交的大纲渲染（```markdown 代码块）
    #[serde(default)]
    pub outline_markdown: Option<String>,
    /// 已写成的章节
    #[serde(default)]
    pub sections: Vec<Section>,
    /// 每轮所有候选的得分，多次精修依次追加
    #[serde(default)]
    pub score_history: Vec<Vec<f64>>,
    /// 最近一次精修的 best-of 宽度
    #[serde(default)]
    pub best_of: Option<usize>,
    /// 最近一次精修的轮数
    #[serde(default)]
    pub refine_count: Option<usize>,
}

impl Survey {
    pub fn new(title: impl Into<String>, skeleton: Outline) -> Self {
        Self {
            title: title.into(),
            skeleton,
            ..Default::default()
        }
    }

    /// 全部 bibkey（排序后，保证提示词稳定）
    pub fn bibkeys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.papers.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 提交精修后的大纲
    pub fn commit_outline(&mut self, outline: Outline) {
        self.outline_markdown = Some(outline.render_fenced(RenderOptions::FULL));
        self.skeleton = outline;
    }

    /// 记录一次精修的配置和每轮得分
    pub fn record_refinement(&mut self, scores: Vec<Vec<f64>>, best_of: usize, refine_count: usize) {
        self.score_history.extend(scores);
        self.best_of = Some(best_of);
        self.refine_count = Some(refine_count);
    }

    /// 全部章节标题（原始形式）
    pub fn section_titles(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.title.clone()).collect()
    }

    /// 拼接全部章节正文，作为图表抽取的输入
    pub fn all_content(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n{}\n", section.title, section.content));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outline::{Evaluation, OutlineSection};

    #[test]
    fn test_commit_outline_keeps_evaluation_and_rendering() {
        let mut survey = Survey::new("T", Outline::default());
        let mut outline = Outline::new("T", vec![OutlineSection::new("Intro")]);
        outline.stamp(
            Evaluation {
                score: 7.5,
                detail: "ok".to_string(),
            },
            "s",
        );

        survey.commit_outline(outline.clone());

        assert_eq!(survey.skeleton, outline);
        assert_eq!(
            survey.outline_markdown.as_deref(),
            Some("```markdown\n# T\n## 1 Intro\n```")
        );
    }

    #[test]
    fn test_record_refinement_appends() {
        let mut survey = Survey::default();
        survey.record_refinement(vec![vec![1.0, 2.0]], 2, 1);
        survey.record_refinement(vec![vec![3.0], vec![4.0]], 1, 2);
        assert_eq!(survey.score_history, vec![vec![1.0, 2.0], vec![3.0], vec![4.0]]);
        assert_eq!(survey.best_of, Some(1));
        assert_eq!(survey.refine_count, Some(2));
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let survey: Survey = serde_json::from_str(
            r#"{
                "title": "T",
                "papers": {"k1": {"title": "P1", "abstract": "A"}},
                "sections": [{"title": "Intro", "content": "Hello."}]
            }"#,
        )
        .unwrap();
        assert_eq!(survey.bibkeys(), vec!["k1"]);
        assert_eq!(survey.papers["k1"].abstract_text.as_deref(), Some("A"));
        assert_eq!(survey.all_content(), "# T\n\n## Intro\n\nHello.\n");
    }
}
