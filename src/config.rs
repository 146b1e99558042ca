use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 提示词语言 ("en" / "zh")
    pub language: String,
    /// 每轮生成的候选数量
    pub best_of: usize,
    /// 精修轮数
    pub refine_count: usize,
    /// 一轮内同时运行的候选数量，未设置时等于 `best_of`
    pub max_concurrent_candidates: Option<usize>,
    /// suggest / modify / evaluate 各步骤解析失败时的最大尝试次数
    pub step_max_attempts: usize,
    /// 图表抽取的最大尝试次数
    pub figure_max_attempts: usize,
    /// 连续多少轮最高分未提升即提前结束，0 表示关闭
    pub early_stop_patience: usize,
    /// 是否运行图表抽取阶段
    pub enable_figures: bool,
    /// 输入综述 JSON
    pub input_path: String,
    /// 输出综述 JSON
    pub output_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub suggest_model: Option<String>,
    pub modify_model: Option<String>,
    pub eval_model: Option<String>,
    pub chart_model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            best_of: 3,
            refine_count: 3,
            max_concurrent_candidates: None,
            step_max_attempts: 3,
            figure_max_attempts: 10,
            early_stop_patience: 0,
            enable_figures: true,
            input_path: "survey.json".to_string(),
            output_path: "survey.refined.json".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            suggest_model: None,
            modify_model: None,
            eval_model: None,
            chart_model: None,
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

impl Config {
    /// 加载配置：TOML 文件（可选）→ 环境变量覆盖 → 校验
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，缺省字段取默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(display.clone(), e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::File(FileError::TomlParseFailed { source, .. }) => {
                AppError::File(FileError::TomlParseFailed {
                    path: display,
                    source,
                })
            }
            other => other,
        })
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: String::new(),
                source: Box::new(e),
            })
        })
    }

    /// 使用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            language: env_string("SURVEY_LANGUAGE").unwrap_or(self.language),
            best_of: env_parse("SURVEY_BEST_OF", "usize")?.unwrap_or(self.best_of),
            refine_count: env_parse("SURVEY_REFINE_COUNT", "usize")?
                .unwrap_or(self.refine_count),
            max_concurrent_candidates: env_parse("SURVEY_MAX_CONCURRENT_CANDIDATES", "usize")?
                .or(self.max_concurrent_candidates),
            step_max_attempts: env_parse("SURVEY_STEP_MAX_ATTEMPTS", "usize")?
                .unwrap_or(self.step_max_attempts),
            figure_max_attempts: env_parse("SURVEY_FIGURE_MAX_ATTEMPTS", "usize")?
                .unwrap_or(self.figure_max_attempts),
            early_stop_patience: env_parse("SURVEY_EARLY_STOP_PATIENCE", "usize")?
                .unwrap_or(self.early_stop_patience),
            enable_figures: env_parse("SURVEY_ENABLE_FIGURES", "bool")?
                .unwrap_or(self.enable_figures),
            input_path: env_string("SURVEY_INPUT").unwrap_or(self.input_path),
            output_path: env_string("SURVEY_OUTPUT").unwrap_or(self.output_path),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            suggest_model: env_string("LLM_SUGGEST_MODEL").or(self.suggest_model),
            modify_model: env_string("LLM_MODIFY_MODEL").or(self.modify_model),
            eval_model: env_string("LLM_EVAL_MODEL").or(self.eval_model),
            chart_model: env_string("LLM_CHART_MODEL").or(self.chart_model),
            temperature: env_parse("LLM_TEMPERATURE", "f32")?.unwrap_or(self.temperature),
            max_tokens: env_parse("LLM_MAX_TOKENS", "u32")?.unwrap_or(self.max_tokens),
        })
    }

    /// 校验配置取值
    pub fn validate(&self) -> AppResult<()> {
        let positive = [
            ("best_of", self.best_of),
            ("max_concurrent_candidates", self.max_concurrent_candidates()),
            ("step_max_attempts", self.step_max_attempts),
            ("figure_max_attempts", self.figure_max_attempts),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "必须大于 0".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// 实际的候选并发数
    pub fn max_concurrent_candidates(&self) -> usize {
        self.max_concurrent_candidates.unwrap_or(self.best_of)
    }

    /// 各阶段实际使用的模型名
    pub fn suggest_model(&self) -> &str {
        self.suggest_model.as_deref().unwrap_or(&self.llm_model_name)
    }

    pub fn modify_model(&self) -> &str {
        self.modify_model.as_deref().unwrap_or(&self.llm_model_name)
    }

    pub fn eval_model(&self) -> &str {
        self.eval_model.as_deref().unwrap_or(&self.llm_model_name)
    }

    pub fn chart_model(&self) -> &str {
        self.chart_model.as_deref().unwrap_or(&self.llm_model_name)
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_missing_keys_use_defaults() {
        let config = Config::from_toml_str(
            r#"
            best_of = 5
            language = "zh"
            eval_model = "judge-model"
            "#,
        )
        .unwrap();

        assert_eq!(config.best_of, 5);
        assert_eq!(config.language, "zh");
        assert_eq!(config.refine_count, 3);
        assert_eq!(config.figure_max_attempts, 10);
        assert_eq!(config.eval_model(), "judge-model");
        assert_eq!(config.modify_model(), config.llm_model_name);
    }

    #[test]
    fn test_concurrency_follows_best_of_unless_set() {
        let config = Config::from_toml_str("best_of = 5").unwrap();
        assert_eq!(config.max_concurrent_candidates, None);
        assert_eq!(config.max_concurrent_candidates(), 5);

        let config = Config::from_toml_str("best_of = 5\nmax_concurrent_candidates = 2").unwrap();
        assert_eq!(config.max_concurrent_candidates(), 2);

        assert_eq!(Config::default().max_concurrent_candidates(), 3);
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrent_candidates: Some(0),
            ..Config::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            AppError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "max_concurrent_candidates"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_width() {
        let config = Config {
            best_of: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "best_of"
        ));
    }

    #[test]
    fn test_bad_toml_is_file_error() {
        let err = Config::from_toml_str("best_of = \"many\"").unwrap_err();
        assert!(matches!(err, AppError::File(FileError::TomlParseFailed { .. })));
    }
}
