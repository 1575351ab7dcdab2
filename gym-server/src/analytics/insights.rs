//! AI 文本服务客户端
//!
//! generateContent 风格的 HTTP 接口，整个调用包在硬超时里，
//! 超时即放弃，不重试、不缓存失败结果。运行期失败原样上抛，
//! 绝不静默替换成编造文案；未配置的分流在调用方。

use std::time::Duration;

use crate::core::Config;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct InsightsClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl InsightsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.ai_api_url.clone(),
            api_key: config.ai_api_key.clone(),
            model: config.ai_model.clone(),
            timeout: Duration::from_millis(config.upstream_timeout_ms),
        }
    }

    /// AI 能力是否已配置 (未配置时调用方走降级文案)
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty()
    }

    /// 生成一段自由文本
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        if !self.is_configured() {
            return Err(AppError::upstream("AI text service is not configured"));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let call = async {
            let resp = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| AppError::upstream(format!("AI request failed: {e}")))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(AppError::upstream(format!(
                    "AI service returned HTTP {status}"
                )));
            }

            let value: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| AppError::upstream(format!("AI response unreadable: {e}")))?;

            value
                .pointer("/candidates/0/content/parts/0/text")
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::upstream("AI response contained no text"))
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::upstream_timeout(format!(
                "AI call exceeded {} ms",
                self.timeout.as_millis()
            ))),
        }
    }
}
