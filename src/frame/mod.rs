//! 帧数据模型
//!
//! 由外部抓帧转换工具生成、已经过校验的不可变记录。分析器只读取这些记录，
//! 从不自己打开抓帧文件或解析标记语言。

pub mod texture;

pub use texture::TextureRecord;

use crate::impl_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 图形 API 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApiKind {
    #[serde(alias = "opengl", alias = "OpenGLES", alias = "GLES")]
    OpenGL,
    #[serde(alias = "vulkan")]
    Vulkan,
    #[serde(alias = "D3D11", alias = "D3D12", alias = "directx")]
    DirectX,
    #[serde(alias = "metal")]
    Metal,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ApiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::OpenGL => "OpenGL",
            ApiKind::Vulkan => "Vulkan",
            ApiKind::DirectX => "DirectX",
            ApiKind::Metal => "Metal",
            ApiKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 帧摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub api: ApiKind,
    pub total_draw_calls: u64,
    pub total_shaders: u64,
    #[serde(default = "default_frame_count")]
    pub frame_count: u64,
}

fn default_frame_count() -> u64 {
    1
}

impl FrameSummary {
    pub fn new(api: ApiKind, total_draw_calls: u64, total_shaders: u64) -> Self {
        Self {
            api,
            total_draw_calls,
            total_shaders,
            frame_count: 1,
        }
    }
}

/// 单个 Draw Call
///
/// 在序列中的位置即提交顺序，所有顺序聚合都依赖于此。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawCall {
    pub draw_id: u64,
    pub event_id: u64,
    /// 发起调用的 API 名称，例如 `glDrawElements`
    pub name: String,
    pub vertex_count: u64,
    pub index_count: u64,
    pub instance_count: u32,
    /// 人工标注的作用域名称
    pub marker: Option<String>,
    /// GPU 耗时（纳秒）
    pub duration_ns: Option<u64>,
    /// 绑定的帧缓冲
    pub framebuffer: Option<String>,
    /// 绑定的纹理
    pub bound_textures: Vec<String>,
    /// 绑定的着色器程序
    pub shader_program: Option<String>,
}

impl_default!(DrawCall {
    draw_id: 0,
    event_id: 0,
    name: String::new(),
    vertex_count: 0,
    index_count: 0,
    instance_count: 1,
    marker: None,
    duration_ns: None,
    framebuffer: None,
    bound_textures: Vec::new(),
    shader_program: None,
});

impl DrawCall {
    pub fn new(draw_id: u64, name: impl Into<String>, vertex_count: u64) -> Self {
        Self {
            draw_id,
            event_id: draw_id,
            name: name.into(),
            vertex_count,
            ..Default::default()
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_duration_ns(mut self, duration_ns: u64) -> Self {
        self.duration_ns = Some(duration_ns);
        self
    }

    pub fn with_framebuffer(mut self, framebuffer: impl Into<String>) -> Self {
        self.framebuffer = Some(framebuffer.into());
        self
    }

    pub fn with_textures<I, S>(mut self, textures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bound_textures = textures.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_shader(mut self, shader: impl Into<String>) -> Self {
        self.shader_program = Some(shader.into());
        self
    }

    /// 非空的标注名称
    pub fn marker_label(&self) -> Option<&str> {
        self.marker.as_deref().filter(|m| !m.is_empty())
    }

    /// 三角形数（`vertex_count / 3`）
    pub fn triangle_count(&self) -> u64 {
        self.vertex_count / 3
    }

    /// GPU 耗时（毫秒）
    pub fn gpu_duration_ms(&self) -> Option<f64> {
        self.duration_ns.map(|ns| ns as f64 / 1_000_000.0)
    }
}

/// 着色器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    #[serde(alias = "Vertex", alias = "vs")]
    Vertex,
    #[serde(alias = "Fragment", alias = "Pixel", alias = "pixel", alias = "fs")]
    Fragment,
    #[serde(alias = "Compute", alias = "cs")]
    Compute,
}

impl ShaderStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }

    /// 离线编译器识别阶段所用的源文件扩展名
    pub fn file_extension(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => ".vert",
            ShaderStage::Fragment => ".frag",
            ShaderStage::Compute => ".comp",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 着色器记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderRecord {
    pub name: String,
    pub stage: ShaderStage,
    #[serde(default)]
    pub instruction_count: u32,
    #[serde(default)]
    pub source: Option<String>,
}

impl ShaderRecord {
    pub fn new(name: impl Into<String>, stage: ShaderStage, instruction_count: u32) -> Self {
        Self {
            name: name.into(),
            stage,
            instruction_count,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// 渲染 Pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderPass {
    pub name: String,
    pub draw_calls: Vec<DrawCall>,
    pub duration_ms: f64,
    pub resolution: Option<String>,
}

impl RenderPass {
    pub fn new(name: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            ..Default::default()
        }
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_draw_calls(mut self, draw_calls: Vec<DrawCall>) -> Self {
        self.draw_calls = draw_calls;
        self
    }

    pub fn triangle_count(&self) -> u64 {
        self.draw_calls
            .iter()
            .fold(0u64, |acc, draw| acc.saturating_add(draw.triangle_count()))
    }
}

/// 一次分析的完整输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameCapture {
    pub summary: FrameSummary,
    #[serde(default)]
    pub draw_calls: Vec<DrawCall>,
    #[serde(default)]
    pub shaders: BTreeMap<String, ShaderRecord>,
    #[serde(default)]
    pub textures: Vec<TextureRecord>,
    #[serde(default)]
    pub passes: Option<Vec<RenderPass>>,
}

impl FrameCapture {
    pub fn new(summary: FrameSummary) -> Self {
        Self {
            summary,
            draw_calls: Vec::new(),
            shaders: BTreeMap::new(),
            textures: Vec::new(),
            passes: None,
        }
    }

    pub fn with_draw_calls(mut self, draw_calls: Vec<DrawCall>) -> Self {
        self.draw_calls = draw_calls;
        self
    }

    pub fn with_shader(mut self, shader: ShaderRecord) -> Self {
        self.shaders.insert(shader.name.clone(), shader);
        self
    }

    pub fn with_textures(mut self, textures: Vec<TextureRecord>) -> Self {
        self.textures = textures;
        self
    }

    pub fn with_passes(mut self, passes: Vec<RenderPass>) -> Self {
        self.passes = Some(passes);
        self
    }

    /// 从JSON字符串解析
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// 帧摘要（总是存在）
    pub fn frame_summary(&self) -> Option<&FrameSummary> {
        Some(&self.summary)
    }

    /// Draw Call 序列（为空时视为未提供）
    pub fn draws(&self) -> Option<&[DrawCall]> {
        (!self.draw_calls.is_empty()).then_some(self.draw_calls.as_slice())
    }

    /// Pass 列表（为空时视为未提供）
    pub fn render_passes(&self) -> Option<&[RenderPass]> {
        self.passes.as_deref().filter(|passes| !passes.is_empty())
    }

    /// 着色器表（为空时视为未提供）
    pub fn shader_map(&self) -> Option<&BTreeMap<String, ShaderRecord>> {
        (!self.shaders.is_empty()).then_some(&self.shaders)
    }

    /// 纹理列表（为空时视为未提供）
    pub fn texture_list(&self) -> Option<&[TextureRecord]> {
        (!self.textures.is_empty()).then_some(self.textures.as_slice())
    }
}
