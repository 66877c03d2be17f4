use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request never produced a response (connect, timeout, TLS...)
    #[error("请求失败: {0}")]
    Request(String),

    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Classify a reqwest failure the way it will be shown to the user.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "超时"
        } else if err.is_connect() {
            "连接失败"
        } else {
            "传输错误"
        };
        ProbeError::Request(format!("{}: {}", kind, err))
    }
}
