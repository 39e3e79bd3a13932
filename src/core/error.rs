//! 统一错误处理模块
//!
//! 分析流程的顶层错误类型。
//!
//! ## 错误类型分层
//!
//! - **配置错误** (`config::ConfigError`): 未知预设、格式错误的覆盖项
//! - **检测器错误** (`analysis::DetectorError`): 单个检测器 `detect` 调用返回的错误
//! - **分析错误** (`AnalysisError`): 只包含会中止整个分析的两类错误
//!
//! 可选检测器的失败不会成为 `AnalysisError`，而是以字符串形式记录在
//! `AnalysisResult::errors` 中。

use crate::analysis::DetectorError;
use crate::config::ConfigError;
use thiserror::Error;

/// 分析中止错误
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Critical detector '{detector}' failed: {source}")]
    CriticalDetection {
        detector: String,
        #[source]
        source: DetectorError,
    },
}

impl AnalysisError {
    /// 失败的必需检测器名称（配置错误时为 `None`）
    pub fn detector(&self) -> Option<&str> {
        match self {
            AnalysisError::CriticalDetection { detector, .. } => Some(detector),
            AnalysisError::Configuration(_) => None,
        }
    }
}

/// 分析结果类型别名
pub type AnalyzeResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::PresetNotFound {
            name: "handheld".to_string(),
            available: "mobile-aggressive".to_string(),
        };
        let err: AnalysisError = config_err.into();
        assert!(matches!(err, AnalysisError::Configuration(_)));
        assert!(err.detector().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::CriticalDetection {
            detector: "draw_call_count".to_string(),
            source: DetectorError::InvalidInput("negative count".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Critical detector 'draw_call_count' failed: Invalid detector input: negative count"
        );
        assert_eq!(err.detector(), Some("draw_call_count"));
    }
}
