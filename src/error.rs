//! 错误类型
//!
//! 按来源分层：LLM 调用、LLM 输出解析、精修流程、配置、文件。
//! 其中 [`ParseError`] 是唯一可重试的错误集合，见 [`AppError::is_retryable`]。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// LLM 输出解析/校验错误（可重试）
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 精修流程错误
    #[error("精修错误: {0}")]
    Refine(#[from] RefineError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 构建请求失败
    #[error("构建LLM请求失败: {message}")]
    RequestBuildFailed { message: String },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// LLM 输出解析/校验错误
///
/// 封闭集合，全部可重试：每次重试都从头重新调用模型。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// 引用了不存在的文献 key
    #[error("引用的文献 key 不存在: {bibkey}")]
    BibkeyNotFound { bibkey: String },
    /// 解析出的结构与预期不符
    #[error("结构不符: {reason}")]
    StructureNotCorresponding { reason: String },
    /// 引用了文档中不存在的章节
    #[error("章节不存在: {section}")]
    SectionNotFound { section: String },
    /// 文本格式错误，无法解析
    #[error("格式错误: {reason}")]
    MalformedValue { reason: String },
}

/// 精修流程错误
#[derive(Debug, Error)]
pub enum RefineError {
    /// 一轮中所有候选均失败
    #[error("第 {round} 轮的 {width} 个候选全部失败, 最后一个错误: {last_error}")]
    AllCandidatesFailed {
        round: usize,
        width: usize,
        last_error: String,
    },
    /// 候选任务被中止或 panic
    #[error("候选 {candidate} 任务异常退出: {message}")]
    CandidateAborted { candidate: usize, message: String },
    /// 候选数量为 0
    #[error("best-of 宽度必须至少为 1")]
    ZeroWidth,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置项取值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 解析/序列化失败
    #[error("JSON处理失败 ({path}): {source}")]
    JsonFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AppError {
    /// 是否属于可重试的错误类型
    ///
    /// 只有 LLM 输出解析/校验失败会重试，其余错误立即向上传播。
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Parse(_))
    }

    // ========== 便捷构造函数 ==========

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建格式错误
    pub fn malformed(reason: impl Into<String>) -> Self {
        AppError::Parse(ParseError::MalformedValue {
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
