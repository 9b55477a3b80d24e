//! 错误类型模块
//!
//! 错误只出现在构造和配置阶段。指针交互路径从不返回错误，
//! 非法输入只记录日志并被忽略。

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("zoom must be a finite value greater than zero, got {0}")]
    InvalidZoom(f64),
    #[error("pixels per second must be a finite value greater than zero, got {0}")]
    InvalidScale(f64),
    #[error("invalid timeline options: {0}")]
    InvalidOptions(String),
    #[error("failed to parse timeline options: {0}")]
    Config(#[from] serde_json::Error),
}
