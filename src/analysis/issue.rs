//! 问题记录
//!
//! 检测器输出的最小单元：类型标签、严重程度、描述、位置与影响。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 问题严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 定性影响
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 问题类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ExcessiveDrawCalls,
    ExcessiveTriangles,
    HeavyModel,
    ExpensiveShader,
    LargeTexture,
    UncompressedTexture,
    SlowPass,
    PassSwitches,
    ShaderToolUnavailable,
    HighCycleCount,
    HighRegisterUsage,
    StackSpilling,
    ExcessiveTextureSamples,
    ExcessiveBranching,
    ManyComplexShaders,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::ExcessiveDrawCalls => "excessive_draw_calls",
            IssueKind::ExcessiveTriangles => "excessive_triangles",
            IssueKind::HeavyModel => "heavy_model",
            IssueKind::ExpensiveShader => "expensive_shader",
            IssueKind::LargeTexture => "large_texture",
            IssueKind::UncompressedTexture => "uncompressed_texture",
            IssueKind::SlowPass => "slow_pass",
            IssueKind::PassSwitches => "pass_switches",
            IssueKind::ShaderToolUnavailable => "shader_tool_unavailable",
            IssueKind::HighCycleCount => "high_cycle_count",
            IssueKind::HighRegisterUsage => "high_register_usage",
            IssueKind::StackSpilling => "stack_spilling",
            IssueKind::ExcessiveTextureSamples => "excessive_texture_samples",
            IssueKind::ExcessiveBranching => "excessive_branching",
            IssueKind::ManyComplexShaders => "many_complex_shaders",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub location: String,
    pub impact: Impact,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let impact = match severity {
            Severity::Critical => Impact::High,
            Severity::Warning => Impact::Medium,
            Severity::Suggestion => Impact::Low,
        };
        Self {
            kind,
            severity,
            description: description.into(),
            location: location.into(),
            impact,
        }
    }

    pub fn critical(kind: IssueKind, description: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(kind, Severity::Critical, description, location)
    }

    pub fn warning(kind: IssueKind, description: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(kind, Severity::Warning, description, location)
    }

    pub fn suggestion(kind: IssueKind, description: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(kind, Severity::Suggestion, description, location)
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {}: {} (impact: {})",
            self.severity, self.kind, self.location, self.description, self.impact
        )
    }
}
