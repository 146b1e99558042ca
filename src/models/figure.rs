use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 图表类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureKind {
    /// mermaid 绘图
    Mermaid,
    /// markdown 表格等块
    Markdown,
}

impl FigureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FigureKind::Mermaid => "mermaid",
            FigureKind::Markdown => "markdown",
        }
    }
}

impl fmt::Display for FigureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FigureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mermaid" => Ok(FigureKind::Mermaid),
            "markdown" => Ok(FigureKind::Markdown),
            other => Err(format!("未知的图表类型: {}", other)),
        }
    }
}

/// 从 LLM 输出中抽取的一条图表记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    /// 定位句，图表插在它上方
    pub position_sentence: String,
    pub title: String,
    pub kind: FigureKind,
    pub body: String,
}

impl Figure {
    /// 序列化为插入正文的单行标记
    ///
    /// 正文中的换行转义为 `\n`，单引号转义为 `&#39;`。
    pub fn marker(&self) -> String {
        format!(
            "<figure-link title='{}' type='{}' content='{}'></figure-link>",
            escape_attr(&self.title),
            self.kind,
            escape_attr(&self.body)
        )
    }
}

fn escape_attr(text: &str) -> String {
    text.replace('\n', "\\n").replace('\'', "&#39;")
}

/// 章节标题（已归一化）→ 该章节的图表
pub type FigureMap = BTreeMap<String, Vec<Figure>>;
