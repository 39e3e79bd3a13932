//! 着色器周期检测
//!
//! 把带源码的着色器交给外部离线编译器，按周期数、寄存器、栈溢出、
//! 纹理采样和分支指令数给出问题。工具不可用时只给出一条提示。

use crate::analysis::{Detector, DetectorResult, Issue, IssueKind, Severity};
use crate::config::ShaderCycleSettings;
use crate::frame::ShaderRecord;
use crate::tools::{ShaderCycleReport, ShaderCycleTool, ToolError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 复杂着色器数量上限
const MAX_COMPLEX_SHADERS: usize = 3;

pub struct ShaderCycleDetector {
    settings: ShaderCycleSettings,
    tool: Arc<dyn ShaderCycleTool>,
}

impl ShaderCycleDetector {
    pub const NAME: &'static str = "shader_cycles";

    pub fn new(settings: ShaderCycleSettings, tool: Arc<dyn ShaderCycleTool>) -> Self {
        Self { settings, tool }
    }

    fn evaluate(&self, name: &str, report: &ShaderCycleReport) -> Vec<Issue> {
        let settings = &self.settings;
        let location = format!("Shader: {}", name);
        let mut issues = Vec::new();

        if report.total_cycles > settings.max_cycles {
            let severity = if report.total_cycles > settings.max_cycles * 2.0 {
                Severity::Critical
            } else {
                Severity::Warning
            };
            issues.push(Issue::new(
                IssueKind::HighCycleCount,
                severity,
                format!(
                    "Shader '{}' needs {} cycles, exceeding threshold {} (bound by {})",
                    name,
                    report.total_cycles,
                    settings.max_cycles,
                    report.bound_unit()
                ),
                location.clone(),
            ));
        }

        if report.work_registers > settings.max_registers {
            issues.push(Issue::warning(
                IssueKind::HighRegisterUsage,
                format!(
                    "Shader '{}' uses {} work registers, exceeding threshold {}",
                    name, report.work_registers, settings.max_registers
                ),
                location.clone(),
            ));
        }

        if report.stack_spilling {
            issues.push(Issue::warning(
                IssueKind::StackSpilling,
                format!(
                    "Shader '{}' spills registers to the stack ({} work registers)",
                    name, report.work_registers
                ),
                location.clone(),
            ));
        }

        // 纹理指令数近似代表采样次数
        if report.texture_instructions > settings.max_texture_samples {
            issues.push(Issue::warning(
                IssueKind::ExcessiveTextureSamples,
                format!(
                    "Shader '{}' issues {} texture samples, exceeding threshold {}",
                    name, report.texture_instructions, settings.max_texture_samples
                ),
                location.clone(),
            ));
        }

        if report.branch_instructions > settings.max_branches {
            issues.push(Issue::suggestion(
                IssueKind::ExcessiveBranching,
                format!(
                    "Shader '{}' has {} branch instructions, exceeding threshold {}",
                    name, report.branch_instructions, settings.max_branches
                ),
                location,
            ));
        }

        issues
    }
}

impl Detector for ShaderCycleDetector {
    type Input = BTreeMap<String, ShaderRecord>;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, shaders: &BTreeMap<String, ShaderRecord>) -> DetectorResult<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut complex = Vec::new();

        for (name, shader) in shaders {
            let Some(source) = shader.source.as_deref().filter(|s| !s.trim().is_empty()) else {
                continue;
            };

            let report = match self.tool.analyze(source, shader.stage) {
                Ok(report) => report,
                Err(ToolError::Unavailable(reason)) => {
                    tracing::info!(target: "shader_tool", "{} unavailable: {}", self.tool.name(), reason);
                    return Ok(vec![Issue::suggestion(
                        IssueKind::ShaderToolUnavailable,
                        format!(
                            "Shader cycle analysis skipped: {} is unavailable ({})",
                            self.tool.name(),
                            reason
                        ),
                        "Shaders",
                    )]);
                }
                Err(err) => return Err(err.into()),
            };

            tracing::debug!(
                target: "shader_tool",
                "{}: {} cycles, {} registers",
                name,
                report.total_cycles,
                report.work_registers
            );

            issues.extend(self.evaluate(name, &report));
            if report.is_complex(self.settings.max_cycles, self.settings.max_registers) {
                complex.push(name.as_str());
            }
        }

        if complex.len() > MAX_COMPLEX_SHADERS {
            issues.push(Issue::warning(
                IssueKind::ManyComplexShaders,
                format!(
                    "{} complex shaders exceed threshold {}: {}",
                    complex.len(),
                    MAX_COMPLEX_SHADERS,
                    complex.join(", ")
                ),
                "Shaders",
            ));
        }

        Ok(issues)
    }
}
