//! 模型统计
//!
//! 按推断出的模型名对 Draw Call 分组，累计 Draw Call 数、三角形数、顶点数，
//! 以及出现过的 Pass 名称集合。

use crate::frame::{DrawCall, RenderPass};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 无法推断时使用的模型名
pub const UNKNOWN_MODEL: &str = "Unknown";

/// API 调用名中模型名前的标记词（按优先级）
const NAME_TOKENS: &[&str] = &["model", "draw", "mesh"];

/// 单个模型的统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub name: String,
    pub draw_calls: u64,
    pub triangle_count: u64,
    pub vertex_count: u64,
    pub passes: BTreeSet<String>,
}

impl ModelStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            draw_calls: 0,
            triangle_count: 0,
            vertex_count: 0,
            passes: BTreeSet::new(),
        }
    }

    /// 计数按饱和加法累计，输入来自外部文档
    fn accumulate(&mut self, draw: &DrawCall, pass: Option<&str>) {
        self.draw_calls = self.draw_calls.saturating_add(1);
        self.triangle_count = self.triangle_count.saturating_add(draw.triangle_count());
        self.vertex_count = self.vertex_count.saturating_add(draw.vertex_count);
        if let Some(pass) = pass {
            if !self.passes.contains(pass) {
                self.passes.insert(pass.to_string());
            }
        }
    }
}

/// 按首次出现顺序保存的模型统计表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ModelStats>", into = "Vec<ModelStats>")]
pub struct ModelStatsTable {
    models: Vec<ModelStats>,
    index: HashMap<String, usize>,
}

impl ModelStatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut ModelStats {
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                self.models.push(ModelStats::new(name));
                self.index.insert(name.to_string(), self.models.len() - 1);
                self.models.len() - 1
            }
        };
        &mut self.models[slot]
    }

    pub fn get(&self, name: &str) -> Option<&ModelStats> {
        self.index.get(name).map(|&slot| &self.models[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// 按首次出现顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &ModelStats> {
        self.models.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.name.as_str())
    }

    pub fn total_triangles(&self) -> u64 {
        self.models.iter().fold(0u64, |acc, m| acc.saturating_add(m.triangle_count))
    }

    pub fn total_vertices(&self) -> u64 {
        self.models.iter().fold(0u64, |acc, m| acc.saturating_add(m.vertex_count))
    }

    /// 三角形数最多的 N 个模型；数量相同时保持首次出现顺序
    pub fn top_by_triangles(&self, count: usize) -> Vec<&ModelStats> {
        let mut sorted: Vec<&ModelStats> = self.models.iter().collect();
        sorted.sort_by(|a, b| b.triangle_count.cmp(&a.triangle_count));
        sorted.truncate(count);
        sorted
    }
}

impl From<Vec<ModelStats>> for ModelStatsTable {
    fn from(models: Vec<ModelStats>) -> Self {
        let mut table = Self::new();
        for model in models {
            match table.index.get(&model.name) {
                Some(&slot) => table.models[slot] = model,
                None => {
                    table.index.insert(model.name.clone(), table.models.len());
                    table.models.push(model);
                }
            }
        }
        table
    }
}

impl From<ModelStatsTable> for Vec<ModelStats> {
    fn from(table: ModelStatsTable) -> Self {
        table.models
    }
}

/// 推断 Draw Call 所属的模型名
///
/// 规则按顺序匹配，首个命中即返回：
/// 1. 非空的标注名称；
/// 2. API 调用名中 `Model` / `Draw` / `Mesh` 标记词（不区分大小写）之后，
///    经 `_` 或空白分隔的字母序列；
/// 3. `"Unknown"`。
pub fn infer_model_name(draw: &DrawCall) -> &str {
    if let Some(marker) = draw.marker_label() {
        return marker;
    }

    NAME_TOKENS
        .iter()
        .find_map(|token| word_after_token(&draw.name, token))
        .unwrap_or(UNKNOWN_MODEL)
}

/// 查找 `token[_\s]+([A-Za-z]+)` 的第一个匹配
fn word_after_token<'a>(name: &'a str, token: &str) -> Option<&'a str> {
    // ASCII 小写化不改变字节偏移
    let lower = name.to_ascii_lowercase();
    let bytes = name.as_bytes();
    let mut from = 0;

    while let Some(pos) = lower[from..].find(token) {
        let start = from + pos;
        let mut cursor = start + token.len();

        let separator_start = cursor;
        while cursor < bytes.len() && (bytes[cursor] == b'_' || bytes[cursor].is_ascii_whitespace()) {
            cursor += 1;
        }

        if cursor > separator_start {
            let word_start = cursor;
            while cursor < bytes.len() && bytes[cursor].is_ascii_alphabetic() {
                cursor += 1;
            }
            if cursor > word_start {
                return Some(&name[word_start..cursor]);
            }
        }

        from = start + 1;
    }

    None
}

/// 单次遍历提取模型统计
///
/// 没有 Pass 信息时，Pass 集合取 Draw Call 的标注名称。
pub fn extract_model_stats(draws: &[DrawCall]) -> ModelStatsTable {
    extract_model_stats_in_passes(draws, &[])
}

/// 提取模型统计，Pass 集合按 `draw_id` 归属到 [`RenderPass::name`]
///
/// 不属于任何 Pass 的 Draw Call 退回到标注名称。
pub fn extract_model_stats_in_passes(draws: &[DrawCall], passes: &[RenderPass]) -> ModelStatsTable {
    let owners: HashMap<u64, &str> = passes
        .iter()
        .flat_map(|pass| {
            pass.draw_calls
                .iter()
                .map(move |draw| (draw.draw_id, pass.name.as_str()))
        })
        .collect();

    let mut table = ModelStatsTable::new();
    for draw in draws {
        let pass = owners
            .get(&draw.draw_id)
            .copied()
            .or_else(|| draw.marker_label());
        table.entry(infer_model_name(draw)).accumulate(draw, pass);
    }
    table
}
