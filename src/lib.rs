//! # GPU Frame Analyzer
//!
//! Threshold-driven performance analysis of a single captured GPU frame.
//!
//! ## Features
//!
//! - **Presets & Overrides**: Built-in threshold presets per platform class, merged field-by-field with typed overrides
//! - **Rule Detectors**: Draw calls, triangles, per-model triangles, pass duration, state switches, shader instructions, textures
//! - **Aggregators**: Model statistics and state-switch tallies computed in a single forward pass
//! - **Fault Isolation**: Mandatory detectors abort the run, optional detector failures are recorded and skipped
//! - **Shader Cycles**: Optional offline compiler integration (Mali `malioc`) with a bounded timeout
//! - **Reports**: Deterministic text report and JSON export
//!
//! ## Architecture Design
//!
//! 输入是外部抓帧转换工具生成的不可变记录（[`frame::FrameCapture`]），分析器只读取：
//! - **Config**: 阈值模型与预设解析
//! - **Detector**: 每条规则一个实现，只拿到自己需要的阈值组和数据切片
//! - **Analyzer**: 编排检测器、分类失败、汇总结果
//!
//! ### Example
//!
//! ```
//! use gpu_frame_analyzer::analysis::Analyzer;
//! use gpu_frame_analyzer::config::AnalyzerSettings;
//! use gpu_frame_analyzer::frame::{ApiKind, FrameCapture, FrameSummary};
//!
//! let frame = FrameCapture::new(FrameSummary::new(ApiKind::OpenGL, 1500, 40));
//! let analyzer = Analyzer::new(AnalyzerSettings::new().with_preset("mobile-aggressive"));
//! let result = analyzer.analyze(&frame).unwrap();
//!
//! assert_eq!(result.issues.critical.len(), 1);
//! println!("{}", gpu_frame_analyzer::report::render_text(&result, &frame));
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Threshold model, presets and analyzer settings
//! - [`frame`]: Captured frame records
//! - [`analysis`]: Detectors, aggregators and the orchestrator
//! - [`tools`]: External shader analysis tools
//! - [`report`]: Text and JSON rendering

/// Error types and shared macros
pub mod core;
/// Threshold configuration system
pub mod config;
/// Captured frame data model
pub mod frame;
/// Detection engine
pub mod analysis;
/// External tool integration
pub mod tools;
/// Report rendering
pub mod report;

pub use crate::analysis::{AnalysisResult, Analyzer, AnalyzerBuilder, Issue, IssueKind, Severity};
pub use crate::config::{AnalyzerSettings, ConfigError, PresetResolver, ThresholdOverrides, ThresholdSet};
pub use crate::core::{AnalysisError, AnalyzeResult};
pub use crate::frame::FrameCapture;
