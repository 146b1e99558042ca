//! 综述大纲（skeleton）
//!
//! 大纲的文本渲染会被原样回填进后续提示词，所以 [`Outline::render`]
//! 必须是结构状态和渲染选项的纯函数。

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::error::ParseError;

const CONSTRUCTION_LABEL: &str = "Digest Construction:";
const ANALYSIS_LABEL: &str = "Digest Analysis:";

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})\s+(?:\d+(?:\.\d+)*\.?\s+)?(.+?)\s*$").expect("合法的正则")
});
static FENCED_MARKDOWN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:markdown|md)?[ \t]*\n([\s\S]*?)```").expect("合法的正则"));
static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([A-Za-z0-9_:.\-]+(?:\s*[,;]\s*[A-Za-z0-9_:.\-]+)*)\]").expect("合法的正则")
});

/// 大纲评估结果，分数和诊断说明总是成对出现
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: f64,
    pub detail: String,
}

/// 大纲中的一个章节
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub title: String,
    /// 章节写作构造（Digest Construction）
    #[serde(default)]
    pub construction: String,
    /// 章节分析要点（Digest Analysis）
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub children: Vec<OutlineSection>,
}

impl OutlineSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// 渲染选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// 是否包含 Digest Construction
    pub construction: bool,
    /// 是否包含 Digest Analysis
    pub analysis: bool,
    /// 是否带章节编号
    pub with_index: bool,
}

impl RenderOptions {
    /// 结构 + 分析 + 编号，回填提示词和最终提交都用这个
    pub const FULL: RenderOptions = RenderOptions {
        construction: true,
        analysis: true,
        with_index: true,
    };

    /// 只有标题层级
    pub const HEADINGS: RenderOptions = RenderOptions {
        construction: false,
        analysis: false,
        with_index: false,
    };
}

/// 综述大纲
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub sections: Vec<OutlineSection>,
    #[serde(default)]
    evaluation: Option<Evaluation>,
    #[serde(default)]
    suggestion: Option<String>,
}

impl Outline {
    pub fn new(title: impl Into<String>, sections: Vec<OutlineSection>) -> Self {
        Self {
            title: title.into(),
            sections,
            evaluation: None,
            suggestion: None,
        }
    }

    pub fn eval_score(&self) -> Option<f64> {
        self.evaluation.as_ref().map(|e| e.score)
    }

    pub fn eval_detail(&self) -> Option<&str> {
        self.evaluation.as_ref().map(|e| e.detail.as_str())
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// 写入评估结果和产生它的修改建议
    pub fn stamp(&mut self, evaluation: Evaluation, suggestion: impl Into<String>) {
        self.evaluation = Some(evaluation);
        self.suggestion = Some(suggestion.into());
    }

    /// 按选项渲染为 markdown 文本
    pub fn render(&self, options: RenderOptions) -> String {
        let mut lines = vec![format!("# {}", self.title)];
        for (i, section) in self.sections.iter().enumerate() {
            render_section(section, &(i + 1).to_string(), 2, options, &mut lines);
        }
        lines.join("\n")
    }

    /// 渲染并包在 ```markdown 代码块中
    pub fn render_fenced(&self, options: RenderOptions) -> String {
        format!("```markdown\n{}\n```", self.render(options))
    }

    /// 从 LLM 返回的 markdown 解析大纲
    ///
    /// 如果文本中有 ```markdown 代码块，只解析第一个代码块。
    pub fn parse_markdown(text: &str) -> Result<Outline, ParseError> {
        let body = FENCED_MARKDOWN
            .captures(text)
            .and_then(|c| c.get(1))
            .map_or(text, |m| m.as_str());

        let mut title: Option<String> = None;
        // 根节点到当前节点的路径（以 children 下标表示）
        let mut path: Vec<usize> = Vec::new();
        let mut sections: Vec<OutlineSection> = Vec::new();
        let mut facet: Option<Facet> = None;

        for raw in body.lines() {
            let line = raw.trim_end();
            if let Some(caps) = HEADING.captures(line.trim_start()) {
                let level = caps[1].len();
                let heading = caps[2].trim().to_string();
                facet = None;
                if level == 1 {
                    if title.is_some() {
                        return Err(structure("出现多个一级标题"));
                    }
                    title = Some(heading);
                    continue;
                }
                if title.is_none() {
                    return Err(structure("章节出现在综述标题之前"));
                }
                let depth = level - 2;
                if depth > path.len() {
                    return Err(structure(format!("标题层级跳跃: {}", heading)));
                }
                path.truncate(depth);
                let siblings = children_at(&mut sections, &path);
                siblings.push(OutlineSection::new(heading));
                path.push(siblings.len() - 1);
                continue;
            }

            let trimmed = line.trim();
            let (kind, rest) = if let Some(rest) = trimmed.strip_prefix(CONSTRUCTION_LABEL) {
                (Some(Facet::Construction), rest)
            } else if let Some(rest) = trimmed.strip_prefix(ANALYSIS_LABEL) {
                (Some(Facet::Analysis), rest)
            } else {
                (None, trimmed)
            };
            if kind.is_some() {
                facet = kind;
            }
            let Some(current_facet) = facet else {
                continue;
            };
            let Some(section) = section_at(&mut sections, &path) else {
                return Err(structure("章节说明出现在任何章节之前"));
            };
            let target = match current_facet {
                Facet::Construction => &mut section.construction,
                Facet::Analysis => &mut section.analysis,
            };
            let rest = rest.trim();
            if rest.is_empty() {
                continue;
            }
            if !target.is_empty() {
                target.push('\n');
            }
            target.push_str(rest);
        }

        let title = title.ok_or_else(|| structure("缺少一级标题"))?;
        if sections.is_empty() {
            return Err(structure("大纲中没有任何章节"));
        }
        Ok(Outline::new(title, sections))
    }

    /// 大纲中引用的全部文献 key（去重、有序）
    pub fn citations(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        for section in &self.sections {
            collect_citations(section, &mut keys);
        }
        keys
    }

    /// 章节总数（含所有子章节）
    pub fn section_count(&self) -> usize {
        fn count(sections: &[OutlineSection]) -> usize {
            sections.iter().map(|s| 1 + count(&s.children)).sum()
        }
        count(&self.sections)
    }
}

#[derive(Debug, Clone, Copy)]
enum Facet {
    Construction,
    Analysis,
}

fn structure(reason: impl Into<String>) -> ParseError {
    ParseError::StructureNotCorresponding {
        reason: reason.into(),
    }
}

fn children_at<'a>(
    sections: &'a mut Vec<OutlineSection>,
    path: &[usize],
) -> &'a mut Vec<OutlineSection> {
    path.iter()
        .fold(sections, |level, &idx| &mut level[idx].children)
}

fn section_at<'a>(
    sections: &'a mut [OutlineSection],
    path: &[usize],
) -> Option<&'a mut OutlineSection> {
    let (first, rest) = path.split_first()?;
    let mut node = sections.get_mut(*first)?;
    for &idx in rest {
        node = node.children.get_mut(idx)?;
    }
    Some(node)
}

fn render_section(
    section: &OutlineSection,
    index: &str,
    level: usize,
    options: RenderOptions,
    lines: &mut Vec<String>,
) {
    let hashes = "#".repeat(level.min(6));
    if options.with_index {
        lines.push(format!("{} {} {}", hashes, index, section.title));
    } else {
        lines.push(format!("{} {}", hashes, section.title));
    }
    if options.construction && !section.construction.is_empty() {
        lines.push(CONSTRUCTION_LABEL.to_string());
        lines.push(section.construction.clone());
    }
    if options.analysis && !section.analysis.is_empty() {
        lines.push(ANALYSIS_LABEL.to_string());
        lines.push(section.analysis.clone());
    }
    for (i, child) in section.children.iter().enumerate() {
        let child_index = format!("{}.{}", index, i + 1);
        render_section(child, &child_index, level + 1, options, lines);
    }
}

fn collect_citations(section: &OutlineSection, keys: &mut BTreeSet<String>) {
    for text in [&section.construction, &section.analysis] {
        for caps in CITATION.captures_iter(text) {
            for key in caps[1].split([',', ';']) {
                let key = key.trim();
                if !key.is_empty() {
                    keys.insert(key.to_string());
                }
            }
        }
    }
    for child in &section.children {
        collect_citations(child, keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_outline() -> Outline {
        let mut intro = OutlineSection::new("Introduction");
        intro.construction = "Motivate the survey [smith2020].".to_string();
        intro.analysis = "Why now.".to_string();
        let mut methods = OutlineSection::new("Methods");
        let mut sub = OutlineSection::new("Retrieval");
        sub.construction = "Compare retrievers [lee2021, wang2022].".to_string();
        methods.children.push(sub);
        Outline::new("LLM Surveys", vec![intro, methods])
    }

    #[test]
    fn test_render_full_with_index() {
        let rendered = sample_outline().render(RenderOptions::FULL);
        assert_eq!(
            rendered,
            "# LLM Surveys\n\
             ## 1 Introduction\n\
             Digest Construction:\n\
             Motivate the survey [smith2020].\n\
             Digest Analysis:\n\
             Why now.\n\
             ## 2 Methods\n\
             ### 2.1 Retrieval\n\
             Digest Construction:\n\
             Compare retrievers [lee2021, wang2022]."
        );
    }

    #[test]
    fn test_render_headings_only() {
        let rendered = sample_outline().render(RenderOptions::HEADINGS);
        assert_eq!(
            rendered,
            "# LLM Surveys\n## Introduction\n## Methods\n### Retrieval"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let outline = sample_outline();
        let copy = outline.clone();
        for options in [RenderOptions::FULL, RenderOptions::HEADINGS] {
            assert_eq!(outline.render(options), outline.render(options));
            assert_eq!(outline.render(options), copy.render(options));
        }
    }

    #[test]
    fn test_evaluation_does_not_change_rendering() {
        let outline = sample_outline();
        let mut stamped = outline.clone();
        stamped.stamp(
            Evaluation {
                score: 80.0,
                detail: "good".to_string(),
            },
            "add a section",
        );
        assert_eq!(
            outline.render(RenderOptions::FULL),
            stamped.render(RenderOptions::FULL)
        );
        assert_eq!(stamped.eval_score(), Some(80.0));
        assert_eq!(stamped.eval_detail(), Some("good"));
        assert_eq!(stamped.suggestion(), Some("add a section"));
    }

    #[test]
    fn test_parse_roundtrips_full_rendering() {
        let outline = sample_outline();
        let parsed = Outline::parse_markdown(&outline.render_fenced(RenderOptions::FULL)).unwrap();
        assert_eq!(parsed, outline);
    }

    #[test]
    fn test_parse_fenced_llm_reply() {
        let reply = "Here is the revised outline:\n```markdown\n# T\n## 1. Background\nDigest Construction: Cover basics.\ncontinued line\n```\nThanks.";
        let parsed = Outline::parse_markdown(reply).unwrap();
        assert_eq!(parsed.title, "T");
        assert_eq!(parsed.sections[0].title, "Background");
        assert_eq!(parsed.sections[0].construction, "Cover basics.\ncontinued line");
    }

    #[test]
    fn test_parse_rejects_skipped_level() {
        let err = Outline::parse_markdown("# T\n### Deep").unwrap_err();
        assert!(matches!(err, ParseError::StructureNotCorresponding { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_title_or_sections() {
        assert!(matches!(
            Outline::parse_markdown("## Only section").unwrap_err(),
            ParseError::StructureNotCorresponding { .. }
        ));
        assert!(matches!(
            Outline::parse_markdown("# Only title").unwrap_err(),
            ParseError::StructureNotCorresponding { .. }
        ));
    }

    #[test]
    fn test_citations() {
        let keys: Vec<_> = sample_outline().citations().into_iter().collect();
        assert_eq!(keys, vec!["lee2021", "smith2020", "wang2022"]);
    }

    #[test]
    fn test_section_count() {
        assert_eq!(sample_outline().section_count(), 3);
    }
}
