use gpu_frame_analyzer::analysis::{Detector, DetectorError, DetectorResult};
use gpu_frame_analyzer::config::{GeometryOverrides, PassOverrides, ShaderCycleSettings};
use gpu_frame_analyzer::frame::{ApiKind, DrawCall, FrameSummary, RenderPass, ShaderRecord, ShaderStage};
use gpu_frame_analyzer::tools::{ShaderCycleReport, ShaderCycleTool, ToolError};
use gpu_frame_analyzer::{
    report, AnalysisError, Analyzer, AnalyzerSettings, ConfigError, FrameCapture, Issue, IssueKind,
    PresetResolver, Severity, ThresholdOverrides,
};
use std::sync::Arc;

/// 总是失败的检测器
struct BrokenDetector;

impl Detector for BrokenDetector {
    type Input = [DrawCall];

    fn name(&self) -> &'static str {
        "broken"
    }

    fn detect(&self, _draws: &[DrawCall]) -> DetectorResult<Vec<Issue>> {
        Err(DetectorError::InvalidInput("draw 7 references a missing pipeline".to_string()))
    }
}

/// 模拟未安装的离线编译器
struct AbsentCompiler;

impl ShaderCycleTool for AbsentCompiler {
    fn name(&self) -> &str {
        "malioc"
    }

    fn analyze(&self, _source: &str, _stage: ShaderStage) -> Result<ShaderCycleReport, ToolError> {
        Err(ToolError::Unavailable("not on PATH".to_string()))
    }
}

/// 模拟超时的离线编译器
struct HangingCompiler;

impl ShaderCycleTool for HangingCompiler {
    fn name(&self) -> &str {
        "malioc"
    }

    fn analyze(&self, _source: &str, _stage: ShaderStage) -> Result<ShaderCycleReport, ToolError> {
        Err(ToolError::Timeout { after_ms: 30_000 })
    }
}

fn character_frame() -> FrameCapture {
    FrameCapture::new(FrameSummary::new(ApiKind::OpenGL, 3, 1)).with_draw_calls(vec![
        DrawCall::new(1, "glDrawElements", 3000).with_marker("Character"),
        DrawCall::new(2, "glDrawElements", 4500).with_marker("Character"),
        DrawCall::new(3, "glDrawArrays", 1000).with_marker("UI"),
    ])
}

#[test]
fn test_draw_call_scenario_with_mobile_aggressive() {
    let frame = FrameCapture::new(FrameSummary::new(ApiKind::OpenGL, 1500, 40));
    let analyzer = Analyzer::new(AnalyzerSettings::new().with_preset("mobile-aggressive"));

    let result = analyzer.analyze(&frame).unwrap();

    let draw_issues: Vec<&Issue> = result
        .issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::ExcessiveDrawCalls)
        .collect();
    assert_eq!(draw_issues.len(), 1);
    assert_eq!(draw_issues[0].severity, Severity::Critical);
    assert!(draw_issues[0].description.contains("1500"));
    assert!(draw_issues[0].description.contains("500"));
    assert_eq!(result.metric("threshold.max_draw_calls"), Some(500.0));
}

#[test]
fn test_model_stats_scenario() {
    let result = Analyzer::new(AnalyzerSettings::default())
        .analyze(&character_frame())
        .unwrap();

    let character = result.model_stats.get("Character").unwrap();
    assert_eq!(character.triangle_count, 2500);
    assert_eq!(character.draw_calls, 2);
    assert_eq!(result.model_stats.get("UI").unwrap().triangle_count, 333);
    assert_eq!(
        result.model_stats.total_triangles() as f64,
        result.metric("total_triangles").unwrap()
    );
}

#[test]
fn test_slow_pass_scenario() {
    let frame = FrameCapture::new(FrameSummary::new(ApiKind::Vulkan, 12, 4)).with_passes(vec![
        RenderPass::new("Geometry", 0.3),
        RenderPass::new("Shadow", 5.2),
        RenderPass::new("Transparent", 0.4),
    ]);
    let overrides = ThresholdOverrides::new().with_pass(PassOverrides {
        max_duration_ms: Some(0.5),
        ..Default::default()
    });

    let result = Analyzer::builder()
        .with_overrides(overrides)
        .build()
        .analyze(&frame)
        .unwrap();

    let slow: Vec<&Issue> = result
        .issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::SlowPass)
        .collect();
    assert_eq!(slow.len(), 1);
    assert!(slow[0].description.contains("Shadow"));
    assert!(slow[0].description.contains("5.2"));
    assert_eq!(result.metric("total_pass_duration_ms"), Some(0.3 + 5.2 + 0.4));
}

#[test]
fn test_optional_failure_degrades_result() {
    let analyzer = Analyzer::builder()
        .with_optional_check(BrokenDetector.bind(FrameCapture::draws))
        .build();

    let result = analyzer.analyze(&character_frame()).unwrap();

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("broken: "));
    assert!(result.is_degraded());
    assert!(result.issues.is_empty());
    assert_eq!(result.metric("total_issues"), Some(0.0));
}

#[test]
fn test_mandatory_failure_yields_no_result() {
    let analyzer = Analyzer::builder()
        .with_mandatory_check(BrokenDetector.bind(FrameCapture::draws))
        .build();

    let err = analyzer.analyze(&character_frame()).unwrap_err();
    assert_eq!(err.detector(), Some("broken"));
    assert!(matches!(
        err,
        AnalysisError::CriticalDetection {
            source: DetectorError::InvalidInput(_),
            ..
        }
    ));
}

#[test]
fn test_invalid_pass_duration_is_critical() {
    let frame = character_frame().with_passes(vec![RenderPass::new("Broken", -1.0)]);
    let err = Analyzer::new(AnalyzerSettings::default())
        .analyze(&frame)
        .unwrap_err();
    assert_eq!(err.detector(), Some("pass_duration"));
}

#[test]
fn test_unknown_preset_is_configuration_error() {
    let analyzer = Analyzer::new(AnalyzerSettings::new().with_preset("handheld-ultra"));
    let err = analyzer.analyze(&character_frame()).unwrap_err();

    match err {
        AnalysisError::Configuration(ConfigError::PresetNotFound { name, available }) => {
            assert_eq!(name, "handheld-ultra");
            assert!(available.contains("mobile-aggressive"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_override_field_is_rejected() {
    let err = ThresholdOverrides::from_toml_str("[geometry]\nmax_drawcalls = 10\n").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));

    let err = ThresholdOverrides::from_json_str(r#"{"lighting": {"max_lights": 4}}"#).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_override_merges_per_field() {
    let overrides = ThresholdOverrides::new().with_geometry(GeometryOverrides {
        max_triangles: Some(75_000),
        ..Default::default()
    });
    let set = PresetResolver::resolve(Some("mobile-aggressive"), Some(&overrides)).unwrap();

    assert_eq!(set.geometry.max_triangles, 75_000);
    assert_eq!(set.geometry.max_draw_calls, 500);
    assert_eq!(set.geometry.max_triangles_per_model, 10_000);
    assert_eq!(set.pass.max_switches_per_frame, 8);
}

#[test]
fn test_shader_tool_unavailable_is_informational() {
    let frame = character_frame()
        .with_shader(ShaderRecord::new("lit_fs", ShaderStage::Fragment, 90).with_source("void main() {}"));
    let analyzer = Analyzer::builder()
        .with_shader_cycles(ShaderCycleSettings {
            enabled: true,
            ..Default::default()
        })
        .with_shader_tool(Arc::new(AbsentCompiler))
        .build();

    let result = analyzer.analyze(&frame).unwrap();
    assert!(result.errors.is_empty());
    assert_eq!(result.issues.suggestions.len(), 1);
    assert_eq!(result.issues.suggestions[0].kind, IssueKind::ShaderToolUnavailable);
}

#[test]
fn test_shader_tool_timeout_is_recorded() {
    let frame = character_frame()
        .with_shader(ShaderRecord::new("lit_fs", ShaderStage::Fragment, 90).with_source("void main() {}"));
    let analyzer = Analyzer::builder()
        .with_shader_cycles(ShaderCycleSettings {
            enabled: true,
            ..Default::default()
        })
        .with_shader_tool(Arc::new(HangingCompiler))
        .build();

    let result = analyzer.analyze(&frame).unwrap();
    assert_eq!(
        result.errors,
        vec!["shader_cycles: External tool error: Tool timed out after 30000ms".to_string()]
    );
}

#[test]
fn test_full_capture_document() -> anyhow::Result<()> {
    let frame = FrameCapture::from_json_str(
        r#"{
            "summary": {"api": "OpenGL", "total_draw_calls": 4, "total_shaders": 2, "frame_count": 1},
            "draw_calls": [
                {"draw_id": 1, "event_id": 10, "name": "glDrawElements", "vertex_count": 36000,
                 "marker": "Terrain", "duration_ns": 1200000, "framebuffer": "fbo_main",
                 "bound_textures": ["grass", "dirt"], "shader_program": "terrain"},
                {"draw_id": 2, "event_id": 11, "name": "glDrawElements", "vertex_count": 900,
                 "marker": "Terrain", "duration_ns": 90000, "framebuffer": "fbo_main",
                 "bound_textures": ["grass", "rock"], "shader_program": "terrain"},
                {"draw_id": 3, "event_id": 12, "name": "DrawModel_Tree", "vertex_count": 6000,
                 "duration_ns": 300000, "framebuffer": "fbo_main", "shader_program": "foliage"},
                {"draw_id": 4, "event_id": 13, "name": "glDrawArrays", "vertex_count": 6,
                 "marker": "UI", "framebuffer": "backbuffer", "shader_program": "ui"}
            ],
            "shaders": {
                "terrain": {"name": "terrain", "stage": "fragment", "instruction_count": 340},
                "ui": {"name": "ui", "stage": "vertex", "instruction_count": 20}
            },
            "textures": [
                {"name": "grass", "width": 4096, "height": 4096, "mip_levels": 12, "format": "RGBA8"},
                {"name": "rock", "width": 1024, "height": 1024, "format": "ASTC_6x6"}
            ],
            "passes": [
                {"name": "Main", "duration_ms": 1.6, "resolution": "1280x720"},
                {"name": "UI", "duration_ms": 0.1}
            ]
        }"#,
    )?;

    let result = Analyzer::new(AnalyzerSettings::new().with_preset("mobile-balanced")).analyze(&frame)?;

    let kinds: Vec<IssueKind> = result.issues.iter().map(|issue| issue.kind).collect();
    assert_eq!(
        kinds,
        vec![
            IssueKind::SlowPass,
            IssueKind::ExpensiveShader,
            IssueKind::LargeTexture,
            IssueKind::UncompressedTexture,
        ]
    );
    assert!(result.model_stats.contains("Tree"));

    let tally = result.switch_tally.expect("draw calls present");
    assert_eq!(tally.marker_switches, 3);
    assert_eq!(tally.framebuffer_switches, 2);
    assert_eq!(tally.texture_binding_changes, 2 + 2 + 2);
    assert_eq!(tally.shader_switches, 3);
    assert_eq!(tally.total, 3 + 2 + 6 + 3);

    let text = report::render_text(&result, &frame);
    assert!(text.contains("## State Switches"));
    assert!(text.contains("1. #1 glDrawElements [Terrain]: 1.200 ms"));
    Ok(())
}
