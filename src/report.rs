//! Console rendering of probe outcomes and the end-of-run report.
//!
//! Wording follows the relay's Chinese-speaking audience; every outcome
//! starts with the HTTP status when one was received.

use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

use crate::probe::{ModelListing, ProbeOutcome};

pub const PREVIEW_CHARS: usize = 200;

/// First `PREVIEW_CHARS` characters of `content`, always followed by `...`.
///
/// Counts `char`s, not bytes, so CJK replies are never cut mid code point.
pub fn preview(content: &str) -> String {
    let head: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}

fn count(tokens: Option<u64>) -> String {
    tokens.map_or_else(|| "-".to_string(), |n| n.to_string())
}

impl fmt::Display for ModelListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelListing::Models { status, ids } => {
                writeln!(f, "响应状态码: {}", status)?;
                write!(f, "模型列表:")?;
                for id in ids {
                    write!(f, "\n- {}", id)?;
                }
                Ok(())
            }
            ModelListing::Unparsed { status, body } => {
                writeln!(f, "响应状态码: {}", status)?;
                writeln!(f, "响应解析失败")?;
                write!(f, "{}", body)
            }
            ModelListing::Failed { error } => write!(f, "请求发生错误: {}", error),
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Success {
                status,
                model,
                content_chars,
                preview,
                usage,
            } => {
                writeln!(f, "响应状态码: {}", status)?;
                writeln!(f, "模型: {}", model.as_deref().unwrap_or("None"))?;
                writeln!(f, "响应长度: {} 字符", content_chars)?;
                if let Some(usage) = usage {
                    writeln!(
                        f,
                        "Token 用量: prompt={} completion={} total={}",
                        count(usage.prompt_tokens),
                        count(usage.completion_tokens),
                        count(usage.total_tokens)
                    )?;
                }
                writeln!(f, "响应预览:")?;
                write!(f, "{}", preview)
            }
            ProbeOutcome::HttpError { status, body } => {
                writeln!(f, "响应状态码: {}", status)?;
                writeln!(f, "请求失败")?;
                write!(f, "{}", body)
            }
            ProbeOutcome::Malformed {
                status,
                reason,
                body,
            } => {
                writeln!(f, "响应状态码: {}", status)?;
                writeln!(f, "响应格式异常: {}", reason)?;
                write!(f, "{}", body)
            }
            ProbeOutcome::Transport { error } => write!(f, "请求发生错误: {}", error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub model: String,
    pub passed: bool,
}

/// Pass/fail per model, kept in the order the models were first probed
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    results: Vec<ProbeResult>,
}

impl ProbeReport {
    pub fn new(started_at: DateTime<Local>) -> Self {
        ProbeReport {
            started_at,
            elapsed: Duration::ZERO,
            results: Vec::new(),
        }
    }

    /// A model probed twice keeps its original position and takes the latest result.
    pub fn record(&mut self, model: &str, passed: bool) {
        match self.results.iter_mut().find(|r| r.model == model) {
            Some(existing) => existing.passed = passed,
            None => self.results.push(ProbeResult {
                model: model.to_string(),
                passed,
            }),
        }
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn get(&self, model: &str) -> Option<bool> {
        self.results
            .iter()
            .find(|r| r.model == model)
            .map(|r| r.passed)
    }

    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n🏁 测试报告:")?;
        for result in &self.results {
            let status = if result.passed { "✅ 成功" } else { "❌ 失败" };
            writeln!(f, "{}: {}", result.model, status)?;
        }
        write!(
            f,
            "通过 {}/{}，开始于 {}，耗时 {:.1}s",
            self.passed_count(),
            self.len(),
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.elapsed.as_secs_f64()
        )
    }
}
