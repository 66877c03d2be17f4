use chrono::Local;
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::llm::{ChatCompletionRequest, ChatCompletionResponse, ModelList, ProbeClient, Usage};
use crate::report::{preview, ProbeReport};

/// What list-models saw
#[derive(Debug, Clone)]
pub enum ModelListing {
    Models { status: u16, ids: Vec<String> },
    /// Body was not the expected JSON; kept verbatim
    Unparsed { status: u16, body: String },
    Failed { error: String },
}

/// What a single chat probe saw. Only `Success` counts as a pass.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Success {
        status: u16,
        /// Model name echoed back by the server
        model: Option<String>,
        content_chars: usize,
        preview: String,
        usage: Option<Usage>,
    },
    HttpError { status: u16, body: String },
    /// 200 whose body lacks `choices[0].message.content`; body kept verbatim
    Malformed {
        status: u16,
        reason: String,
        body: String,
    },
    Transport { error: String },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}

pub struct Prober {
    config: ProbeConfig,
    client: ProbeClient,
}

impl Prober {
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        let client = ProbeClient::new(&config)?;
        Ok(Prober { config, client })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Never fails: transport and decode errors come back as listing variants.
    pub async fn list_models(&self) -> ModelListing {
        let raw = match self.client.fetch_models().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("模型列表请求失败: {}", e);
                return ModelListing::Failed {
                    error: e.to_string(),
                };
            }
        };

        match ModelList::parse(&raw.body) {
            Ok(list) => {
                let ids = list.ids();
                info!("获取到 {} 个模型", ids.len());
                ModelListing::Models {
                    status: raw.status,
                    ids,
                }
            }
            Err(e) => {
                warn!("模型列表解析失败: {}", e);
                ModelListing::Unparsed {
                    status: raw.status,
                    body: raw.body,
                }
            }
        }
    }

    /// One attempt, no retry. `prompt` falls back to the configured default.
    pub async fn chat_probe(&self, model: &str, prompt: Option<&str>) -> ProbeOutcome {
        let prompt = prompt.unwrap_or(self.config.prompt.as_str());
        let request = ChatCompletionRequest::single_turn(model, prompt, self.config.temperature);

        let raw = match self.client.send_chat(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(model = %model, "对话请求失败: {}", e);
                return ProbeOutcome::Transport {
                    error: e.to_string(),
                };
            }
        };

        if !raw.is_ok() {
            warn!(model = %model, status = raw.status, "对话接口返回非 200");
            return ProbeOutcome::HttpError {
                status: raw.status,
                body: raw.body,
            };
        }

        let response: ChatCompletionResponse = match serde_json::from_str(&raw.body) {
            Ok(response) => response,
            Err(e) => {
                warn!(model = %model, "对话响应解析失败: {}", e);
                return ProbeOutcome::Malformed {
                    status: raw.status,
                    reason: ProbeError::from(e).to_string(),
                    body: raw.body,
                };
            }
        };

        let Some(content) = response.first_content() else {
            warn!(model = %model, "对话响应缺少内容");
            return ProbeOutcome::Malformed {
                status: raw.status,
                reason: "缺少 choices[0].message.content".to_string(),
                body: raw.body,
            };
        };

        info!(model = %model, chars = content.chars().count(), "对话请求成功");
        ProbeOutcome::Success {
            status: raw.status,
            model: response.model.clone(),
            content_chars: content.chars().count(),
            preview: preview(content),
            usage: response.usage,
        }
    }

    /// List models once, then probe every configured model in order,
    /// pausing after each probe. Only a failed write to `out` is an error.
    pub async fn run_all<W: Write>(&self, out: &mut W) -> Result<ProbeReport, ProbeError> {
        let started = Instant::now();
        let mut report = ProbeReport::new(Local::now());

        writeln!(out, "🚀 Sider API 模型全面测试")?;

        writeln!(out, "\n===== 测试模型列表获取 =====")?;
        let listing = self.list_models().await;
        writeln!(out, "{}", listing)?;
        out.flush()?;

        for model in &self.config.models {
            writeln!(out, "\n===== 测试模型: {} =====", model)?;
            let outcome = self.chat_probe(model, None).await;
            writeln!(out, "{}", outcome)?;
            out.flush()?;
            report.record(model, outcome.is_success());

            // Rate-limit guard; applied whatever the outcome.
            tokio::time::sleep(self.config.pause).await;
        }

        report.finish(started.elapsed());
        writeln!(out, "{}", report)?;
        out.flush()?;

        info!(
            passed = report.passed_count(),
            total = report.len(),
            "测试完成"
        );
        Ok(report)
    }
}
