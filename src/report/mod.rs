//! 报告生成
//!
//! 把分析结果渲染为确定性的文本报告（Markdown 风格），或导出为 JSON。
//! 空的部分整体省略，不输出空标题。

use crate::analysis::{AnalysisResult, Issue, Severity};
use crate::frame::{DrawCall, FrameCapture, RenderPass};

/// 模型统计显示条数
pub const TOP_MODELS: usize = 10;
/// 最慢 Pass 显示条数
pub const TOP_PASSES: usize = 5;
/// 最慢 Draw Call 显示条数
pub const TOP_DRAW_CALLS: usize = 10;

/// 渲染文本报告
///
/// `frame` 提供 Pass 与 Draw Call 的原始耗时，用于"最慢"两节。
pub fn render_text(result: &AnalysisResult, frame: &FrameCapture) -> String {
    let mut report = String::from("# Frame Analysis\n");

    push_summary(&mut report, result);

    for (severity, title) in [
        (Severity::Critical, "Critical Issues"),
        (Severity::Warning, "Warnings"),
        (Severity::Suggestion, "Suggestions"),
    ] {
        push_issues(&mut report, title, result.issues.bucket(severity));
    }

    push_model_stats(&mut report, result);
    push_switches(&mut report, result);

    if let Some(passes) = frame.render_passes() {
        push_slowest_passes(&mut report, passes);
    }
    push_slowest_draws(&mut report, &frame.draw_calls);

    if !result.errors.is_empty() {
        report.push_str("\n## Detector Errors\n");
        for error in &result.errors {
            report.push_str(&format!("- {}\n", error));
        }
    }

    report
}

/// 导出为格式化的 JSON
pub fn to_json(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

fn push_summary(report: &mut String, result: &AnalysisResult) {
    let summary = &result.summary;
    let issues = &result.issues;

    report.push_str("\n## Summary\n");
    report.push_str(&format!("- API: {}\n", summary.api));
    report.push_str(&format!("- Frames: {}\n", summary.frame_count));
    report.push_str(&format!("- Draw calls: {}\n", summary.total_draw_calls));
    report.push_str(&format!("- Shaders: {}\n", summary.total_shaders));
    if let Some(triangles) = result.metric("total_triangles") {
        report.push_str(&format!("- Triangles: {}\n", triangles));
    }
    report.push_str(&format!(
        "- Issues: {} ({} critical, {} warnings, {} suggestions)\n",
        issues.len(),
        issues.critical.len(),
        issues.warnings.len(),
        issues.suggestions.len()
    ));
    if result.is_degraded() {
        report.push_str(&format!(
            "- Incomplete: {} detector(s) could not run\n",
            result.errors.len()
        ));
    }
}

fn push_issues(report: &mut String, title: &str, issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }

    report.push_str(&format!("\n## {}\n", title));
    for (index, issue) in issues.iter().enumerate() {
        report.push_str(&format!(
            "{}. [{}] {}: {} (impact: {})\n",
            index + 1,
            issue.kind,
            issue.location,
            issue.description,
            issue.impact
        ));
    }
}

fn push_model_stats(report: &mut String, result: &AnalysisResult) {
    if result.model_stats.is_empty() {
        return;
    }

    report.push_str("\n## Model Statistics\n");
    report.push_str("| Model | Draw Calls | Triangles | Vertices | Passes |\n");
    report.push_str("|---|---|---|---|---|\n");
    for model in result.model_stats.top_by_triangles(TOP_MODELS) {
        let passes: Vec<&str> = model.passes.iter().map(String::as_str).collect();
        report.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            model.name,
            model.draw_calls,
            model.triangle_count,
            model.vertex_count,
            passes.join(", ")
        ));
    }
}

fn push_switches(report: &mut String, result: &AnalysisResult) {
    let Some(tally) = result.switch_tally.filter(|tally| tally.total > 0) else {
        return;
    };

    report.push_str("\n## State Switches\n");
    report.push_str(&format!("- Marker switches: {}\n", tally.marker_switches));
    report.push_str(&format!("- Framebuffer switches: {}\n", tally.framebuffer_switches));
    report.push_str(&format!("- Texture binding changes: {}\n", tally.texture_binding_changes));
    report.push_str(&format!("- Shader switches: {}\n", tally.shader_switches));
    report.push_str(&format!("- Total: {}\n", tally.total));
}

fn push_slowest_passes(report: &mut String, passes: &[RenderPass]) {
    let mut sorted: Vec<&RenderPass> = passes.iter().collect();
    sorted.sort_by(|a, b| b.duration_ms.total_cmp(&a.duration_ms));

    report.push_str("\n## Slowest Passes\n");
    for (index, pass) in sorted.into_iter().take(TOP_PASSES).enumerate() {
        let resolution = pass
            .resolution
            .as_deref()
            .map(|r| format!(" @ {}", r))
            .unwrap_or_default();
        report.push_str(&format!(
            "{}. {}: {:.2} ms{} ({} draw calls)\n",
            index + 1,
            pass.name,
            pass.duration_ms,
            resolution,
            pass.draw_calls.len()
        ));
    }
}

fn push_slowest_draws(report: &mut String, draws: &[DrawCall]) {
    let mut timed: Vec<(&DrawCall, f64)> = draws
        .iter()
        .filter_map(|draw| draw.gpu_duration_ms().map(|ms| (draw, ms)))
        .collect();
    if timed.is_empty() {
        return;
    }
    timed.sort_by(|a, b| b.1.total_cmp(&a.1));

    report.push_str("\n## Slowest Draw Calls\n");
    for (index, (draw, ms)) in timed.into_iter().take(TOP_DRAW_CALLS).enumerate() {
        let marker = draw
            .marker_label()
            .map(|m| format!(" [{}]", m))
            .unwrap_or_default();
        report.push_str(&format!(
            "{}. #{} {}{}: {:.3} ms ({} vertices)\n",
            index + 1,
            draw.draw_id,
            draw.name,
            marker,
            ms,
            draw.vertex_count
        ));
    }
}
