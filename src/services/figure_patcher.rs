//! 图表补丁 - 业务能力层
//!
//! 把抽取到的图表标记插入章节正文。纯数据变换，不重试。
//! 定位句在正文中找不到时丢弃该图表并记录告警，不中断文档组装。

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::models::figure::FigureMap;
use crate::models::survey::Survey;
use crate::utils::{normalize_title, truncate_text};

/// 补丁结果统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// 成功插入的图表数
    pub inserted: usize,
    /// 定位句不存在而丢弃的图表数
    pub dropped_missing_anchor: usize,
    /// 章节不存在而丢弃的图表数
    pub dropped_missing_section: usize,
}

impl PatchReport {
    pub fn dropped(&self) -> usize {
        self.dropped_missing_anchor + self.dropped_missing_section
    }
}

/// 在 `content` 中第一次出现 `anchor` 的位置之前插入 `marker`
///
/// 返回 `None` 表示定位句不存在，此时正文不变。
pub fn insert_before_anchor(content: &str, anchor: &str, marker: &str) -> Option<String> {
    if anchor.is_empty() {
        return None;
    }
    let pos = content.find(anchor)?;
    let mut patched = String::with_capacity(content.len() + marker.len() + 2);
    patched.push_str(&content[..pos]);
    patched.push('\n');
    patched.push_str(marker);
    patched.push('\n');
    patched.push_str(&content[pos..]);
    Some(patched)
}

/// 将图表插入综述各章节
///
/// `figures` 的 key 是 [`normalize_title`] 的结果（由抽取阶段生成），直接用于查找。
pub fn apply_figures(survey: &mut Survey, figures: &FigureMap) -> PatchReport {
    let mut report = PatchReport::default();

    // 归一化章节标题 → 章节下标；同名章节取第一个
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, section) in survey.sections.iter().enumerate() {
        index.entry(normalize_title(&section.title)).or_insert(i);
    }

    for (title, section_figures) in figures {
        let Some(&section_idx) = index.get(title.as_str()) else {
            warn!(
                "章节 '{}' 不存在, 丢弃 {} 个图表",
                title,
                section_figures.len()
            );
            report.dropped_missing_section += section_figures.len();
            continue;
        };
        let section = &mut survey.sections[section_idx];

        for figure in section_figures {
            match insert_before_anchor(&section.content, &figure.position_sentence, &figure.marker()) {
                Some(patched) => {
                    section.content = patched;
                    report.inserted += 1;
                    debug!("已在章节 '{}' 插入图表 '{}'", section.title, figure.title);
                }
                None => {
                    warn!(
                        "章节 '{}' 中找不到定位句 '{}', 丢弃图表 '{}'",
                        section.title,
                        truncate_text(&figure.position_sentence, 60),
                        figure.title
                    );
                    report.dropped_missing_anchor += 1;
                }
            }
        }
    }

    report
}
