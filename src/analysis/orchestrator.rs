//! 分析编排器
//!
//! 一次 [`Analyzer::analyze`] 调用的顺序：
//!
//! 1. 解析阈值配置（只解析一次）
//! 2. 运行必需检测器，任何失败都中止分析
//! 3. 运行可选检测器，失败记录为 `"<检测器名>: <消息>"` 后继续
//! 4. 有 Draw Call 数据时构建模型统计与状态切换统计
//! 5. 计算指标并组装结果
//!
//! 所需数据缺失的检测器静默跳过。

use super::aggregators::{extract_model_stats_in_passes, tally_switches, ModelStatsTable, SwitchTally};
use super::detectors::{
    geometry, DrawCallCountDetector, ModelStatsDetector, PassDurationDetector, PassSwitchDetector,
    ShaderCycleDetector, ShaderInstructionDetector, TextureCompressionDetector,
    TextureSizeDetector, TriangleCountDetector,
};
use super::{AnalysisResult, Detector, FrameCheck, IssueBuckets};
use crate::config::{AnalyzerSettings, ShaderCycleSettings, ThresholdOverrides, ThresholdSet};
use crate::core::{AnalysisError, AnalyzeResult};
use crate::frame::{DrawCall, FrameCapture};
use crate::tools::{MaliocRunner, ShaderCycleTool};
use std::collections::BTreeMap;
use std::sync::Arc;

type CheckList = Vec<Box<dyn FrameCheck>>;

/// 帧分析器
pub struct Analyzer {
    settings: AnalyzerSettings,
    custom_mandatory: CheckList,
    custom_optional: CheckList,
    shader_tool: Option<Arc<dyn ShaderCycleTool>>,
}

impl Analyzer {
    /// 使用给定设置创建分析器
    pub fn new(settings: AnalyzerSettings) -> Self {
        AnalyzerBuilder::new().with_settings(settings).build()
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// 解析本分析器使用的阈值集
    pub fn resolve_thresholds(&self) -> AnalyzeResult<ThresholdSet> {
        Ok(self.settings.resolve_thresholds()?)
    }

    /// 分析一帧
    pub fn analyze(&self, frame: &FrameCapture) -> AnalyzeResult<AnalysisResult> {
        let span = tracing::info_span!(
            target: "analysis",
            "analyze",
            api = %frame.summary.api,
            draws = frame.draw_calls.len()
        );
        let _guard = span.enter();

        let thresholds = self.resolve_thresholds()?;
        if self.shader_tool.is_some() {
            self.settings.shader_cycles.validate()?;
        }

        let mandatory = self.builtin_mandatory(&thresholds);
        let optional = self.builtin_optional(&thresholds);
        let mut issues = IssueBuckets::new();
        let mut errors = Vec::new();

        for check in chain(&mandatory, &self.custom_mandatory) {
            match check.check(frame) {
                None => {
                    tracing::debug!(target: "analysis", "Skipping '{}': input not available", check.name())
                }
                Some(Ok(found)) => issues.extend(found),
                Some(Err(source)) => {
                    tracing::error!(target: "analysis", "Mandatory detector '{}' failed: {}", check.name(), source);
                    return Err(AnalysisError::CriticalDetection {
                        detector: check.name().to_string(),
                        source,
                    });
                }
            }
        }

        for check in chain(&optional, &self.custom_optional) {
            match check.check(frame) {
                None => {
                    tracing::debug!(target: "analysis", "Skipping '{}': input not available", check.name())
                }
                Some(Ok(found)) => issues.extend(found),
                Some(Err(err)) => {
                    tracing::warn!(target: "analysis", "Optional detector '{}' failed: {}", check.name(), err);
                    errors.push(format!("{}: {}", check.name(), err));
                }
            }
        }

        let (model_stats, switch_tally) = match frame.draws() {
            Some(draws) => (
                extract_model_stats_in_passes(draws, frame.passes.as_deref().unwrap_or_default()),
                Some(tally_switches(draws)),
            ),
            None => (ModelStatsTable::new(), None),
        };

        let metrics = compute_metrics(
            frame,
            &thresholds,
            &issues,
            errors.len(),
            &model_stats,
            switch_tally.as_ref(),
        );

        tracing::info!(
            target: "analysis",
            "Analysis finished: {} issues ({} critical), {} detector errors",
            issues.len(),
            issues.critical.len(),
            errors.len()
        );

        Ok(AnalysisResult {
            summary: frame.summary.clone(),
            issues,
            metrics,
            errors,
            model_stats,
            switch_tally,
        })
    }

    fn builtin_mandatory(&self, thresholds: &ThresholdSet) -> CheckList {
        vec![
            boxed(DrawCallCountDetector::new(thresholds.geometry.clone()).bind(FrameCapture::frame_summary)),
            boxed(PassDurationDetector::new(thresholds.pass.clone()).bind(FrameCapture::render_passes)),
        ]
    }

    fn builtin_optional(&self, thresholds: &ThresholdSet) -> CheckList {
        let mut checks = vec![
            boxed(TriangleCountDetector::new(thresholds.geometry.clone()).bind(FrameCapture::draws)),
            boxed(ModelStatsDetector::new(thresholds.geometry.clone()).bind(FrameCapture::draws)),
            boxed(PassSwitchDetector::new(thresholds.pass.clone()).bind(FrameCapture::draws)),
            boxed(ShaderInstructionDetector::new(thresholds.shader.clone()).bind(FrameCapture::shader_map)),
            boxed(TextureSizeDetector::new(thresholds.memory.clone()).bind(FrameCapture::texture_list)),
            boxed(TextureCompressionDetector::new(thresholds.memory.clone()).bind(FrameCapture::texture_list)),
        ];

        if let Some(tool) = &self.shader_tool {
            checks.push(boxed(
                ShaderCycleDetector::new(self.settings.shader_cycles.clone(), Arc::clone(tool))
                    .bind(FrameCapture::shader_map),
            ));
        }

        checks
    }
}

fn boxed(check: impl FrameCheck + 'static) -> Box<dyn FrameCheck> {
    Box::new(check)
}

fn chain<'a>(
    builtin: &'a [Box<dyn FrameCheck>],
    custom: &'a [Box<dyn FrameCheck>],
) -> impl Iterator<Item = &'a dyn FrameCheck> {
    builtin.iter().chain(custom.iter()).map(|check| &**check)
}

/// 计算结果指标
fn compute_metrics(
    frame: &FrameCapture,
    thresholds: &ThresholdSet,
    issues: &IssueBuckets,
    error_count: usize,
    model_stats: &ModelStatsTable,
    switch_tally: Option<&SwitchTally>,
) -> BTreeMap<String, f64> {
    let passes = frame.passes.as_deref().unwrap_or_default();
    let draws = frame.draw_calls.as_slice();

    let entries = [
        ("total_issues", issues.len() as f64),
        ("critical_count", issues.critical.len() as f64),
        ("warning_count", issues.warnings.len() as f64),
        ("suggestion_count", issues.suggestions.len() as f64),
        ("draw_calls", frame.summary.total_draw_calls as f64),
        ("shader_count", frame.summary.total_shaders as f64),
        ("frame_count", frame.summary.frame_count as f64),
        ("texture_count", frame.textures.len() as f64),
        ("pass_count", passes.len() as f64),
        ("total_triangles", geometry::total_triangles(draws) as f64),
        (
            "total_vertices",
            draws.iter().fold(0u64, |acc, d| acc.saturating_add(d.vertex_count)) as f64,
        ),
        ("model_count", model_stats.len() as f64),
        ("total_switches", switch_tally.map_or(0, |t| t.total) as f64),
        ("texture_memory_mb", frame.textures.iter().map(|t| t.estimated_mb()).sum::<f64>()),
        ("total_pass_duration_ms", passes.iter().map(|p| p.duration_ms).sum::<f64>()),
        ("total_gpu_duration_ms", draws.iter().filter_map(DrawCall::gpu_duration_ms).sum::<f64>()),
        ("detector_errors", error_count as f64),
        ("threshold.max_draw_calls", thresholds.geometry.max_draw_calls as f64),
        ("threshold.max_triangles", thresholds.geometry.max_triangles as f64),
        ("threshold.max_triangles_per_model", thresholds.geometry.max_triangles_per_model as f64),
        ("threshold.max_pass_duration_ms", thresholds.pass.max_duration_ms),
        ("threshold.max_switches_per_frame", thresholds.pass.max_switches_per_frame as f64),
        ("threshold.max_texture_size", thresholds.memory.max_texture_size as f64),
    ];

    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// 分析器构建器
#[derive(Default)]
pub struct AnalyzerBuilder {
    settings: AnalyzerSettings,
    custom_mandatory: CheckList,
    custom_optional: CheckList,
    shader_tool: Option<Arc<dyn ShaderCycleTool>>,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: AnalyzerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.settings.preset = Some(preset.into());
        self
    }

    pub fn with_overrides(mut self, overrides: ThresholdOverrides) -> Self {
        self.settings.overrides = overrides;
        self
    }

    pub fn with_shader_cycles(mut self, shader_cycles: ShaderCycleSettings) -> Self {
        self.settings.shader_cycles = shader_cycles;
        self
    }

    /// 注入着色器周期分析工具
    ///
    /// 只在 `shader_cycles.enabled` 时使用；未注入时默认使用 [`MaliocRunner`]。
    pub fn with_shader_tool(mut self, tool: Arc<dyn ShaderCycleTool>) -> Self {
        self.shader_tool = Some(tool);
        self
    }

    /// 追加必需检测项（失败会中止分析）
    pub fn with_mandatory_check(mut self, check: impl FrameCheck + 'static) -> Self {
        self.custom_mandatory.push(Box::new(check));
        self
    }

    /// 追加可选检测项（失败只记录到结果中）
    pub fn with_optional_check(mut self, check: impl FrameCheck + 'static) -> Self {
        self.custom_optional.push(Box::new(check));
        self
    }

    pub fn build(self) -> Analyzer {
        let shader_tool = if self.settings.shader_cycles.enabled {
            Some(self.shader_tool.unwrap_or_else(|| {
                Arc::new(MaliocRunner::from_settings(&self.settings.shader_cycles)) as Arc<dyn ShaderCycleTool>
            }))
        } else {
            None
        };

        Analyzer {
            settings: self.settings,
            custom_mandatory: self.custom_mandatory,
            custom_optional: self.custom_optional,
            shader_tool,
        }
    }
}
