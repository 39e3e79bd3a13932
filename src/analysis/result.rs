//! 分析结果
//!
//! 一次分析产生的不可变记录：帧摘要、按严重程度分桶的问题、数值指标、
//! 非致命检测器错误、模型统计以及可选的状态切换统计。

use super::aggregators::{ModelStatsTable, SwitchTally};
use super::{Issue, Severity};
use crate::frame::FrameSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 按严重程度分桶的问题，桶内保持插入顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueBuckets {
    pub critical: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub suggestions: Vec<Issue>,
}

impl IssueBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Critical => self.critical.push(issue),
            Severity::Warning => self.warnings.push(issue),
            Severity::Suggestion => self.suggestions.push(issue),
        }
    }

    pub fn bucket(&self, severity: Severity) -> &[Issue] {
        match severity {
            Severity::Critical => &self.critical,
            Severity::Warning => &self.warnings,
            Severity::Suggestion => &self.suggestions,
        }
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.warnings.len() + self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按 严重 → 警告 → 建议 的顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.critical
            .iter()
            .chain(self.warnings.iter())
            .chain(self.suggestions.iter())
    }
}

impl Extend<Issue> for IssueBuckets {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        for issue in iter {
            self.push(issue);
        }
    }
}

/// 分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: FrameSummary,
    pub issues: IssueBuckets,
    pub metrics: BTreeMap<String, f64>,
    /// 可选检测器的失败，格式为 `"<检测器名>: <消息>"`
    pub errors: Vec<String>,
    pub model_stats: ModelStatsTable,
    pub switch_tally: Option<SwitchTally>,
}

impl AnalysisResult {
    pub fn total_issues(&self) -> usize {
        self.issues.len()
    }

    /// 是否有检测器未能运行
    ///
    /// 用来区分"没有发现问题"和"部分检测器失败"。
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    pub fn has_critical(&self) -> bool {
        !self.issues.critical.is_empty()
    }
}
