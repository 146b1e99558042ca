//! LLM 服务 - 业务能力层
//!
//! 只负责 "prompt 进, 文本出"，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

/// LLM 调用接口
///
/// 精修和图表抽取只通过这个接口访问模型，测试中用脚本化的实现替换。
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 发送一条 prompt，返回模型的文本回复
    async fn complete(&self, prompt: &str) -> AppResult<String>;

    /// 模型名称（仅用于日志）
    fn model_name(&self) -> &str;
}

/// 基于 OpenAI 兼容接口的 LLM 服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 使用配置中的默认模型创建
    pub fn new(config: &Config) -> Self {
        Self::with_model(config, config.llm_model_name.clone())
    }

    /// 使用指定模型创建
    pub fn with_model(config: &Config, model_name: impl Into<String>) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: model_name.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn build_error(&self, e: impl std::fmt::Display) -> AppError {
        AppError::Llm(LlmError::RequestBuildFailed {
            message: format!("{} (模型: {})", e, self.model_name),
        })
    }
}

#[async_trait]
impl LlmClient for LlmService {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| self.build_error(e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| self.build_error(e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let choice = response.choices.first().ok_or_else(|| LlmError::EmptyResponse {
            model: self.model_name.clone(),
        })?;

        let content = choice
            .message
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// 各阶段使用的 LLM 客户端
///
/// suggest / modify / evaluate / chart 可以配置不同的模型。
#[derive(Clone)]
pub struct StageClients {
    pub suggest: Arc<dyn LlmClient>,
    pub modify: Arc<dyn LlmClient>,
    pub evaluate: Arc<dyn LlmClient>,
    pub chart: Arc<dyn LlmClient>,
}

impl StageClients {
    /// 所有阶段共用同一个客户端
    pub fn uniform(client: Arc<dyn LlmClient>) -> Self {
        Self {
            suggest: client.clone(),
            modify: client.clone(),
            evaluate: client.clone(),
            chart: client,
        }
    }

    /// 按配置为每个阶段创建 OpenAI 兼容客户端
    pub fn from_config(config: &Config) -> Self {
        let make = |model: &str| -> Arc<dyn LlmClient> {
            Arc::new(LlmService::with_model(config, model))
        };
        Self {
            suggest: make(config.suggest_model()),
            modify: make(config.modify_model()),
            evaluate: make(config.eval_model()),
            chart: make(config.chart_model()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_models_follow_config() {
        let config = Config {
            llm_model_name: "base".to_string(),
            eval_model: Some("judge".to_string()),
            ..Config::default()
        };
        let clients = StageClients::from_config(&config);
        assert_eq!(clients.suggest.model_name(), "base");
        assert_eq!(clients.modify.model_name(), "base");
        assert_eq!(clients.evaluate.model_name(), "judge");
        assert_eq!(clients.chart.model_name(), "base");
    }

    /// 测试真实 API 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_complete_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_complete_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::load(None).unwrap();
        let service = LlmService::new(&config);

        let response = service
            .complete("Reply with the single word: pong")
            .await
            .unwrap();
        println!("LLM 响应: {}", response);
        assert!(!response.is_empty());
    }
}
