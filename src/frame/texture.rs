//! 纹理记录
//!
//! 纹理尺寸、格式标签以及按格式估算的显存占用。

use serde::{Deserialize, Serialize};

/// 图形 API 的格式名前缀，分类前去掉
const API_PREFIXES: &[&str] = &["DXGI_FORMAT_", "VK_FORMAT_", "GL_COMPRESSED_", "GL_"];

/// 块压缩格式族（格式标签前缀）
const COMPRESSED_FAMILIES: &[&str] = &["ASTC", "ETC", "EAC", "BC", "DXT", "PVRTC", "S3TC"];

/// 深度格式前缀
const DEPTH_PREFIXES: &[&str] = &["D16", "D24", "D32", "DEPTH", "X8_D24"];

/// 每像素字节数表，按匹配优先级排列
const BYTES_PER_PIXEL: &[(&str, f64)] = &[
    ("RGBA32F", 16.0),
    ("RGBA16F", 8.0),
    ("RG16F", 4.0),
    ("R16F", 2.0),
    ("DEPTH24_STENCIL8", 4.0),
    ("DEPTH32F", 4.0),
    ("DEPTH16", 2.0),
    ("D32_SFLOAT_S8", 5.0),
    ("D32", 4.0),
    ("D24", 4.0),
    ("D16", 2.0),
    ("ASTC_4X4", 1.0),
    ("ASTC_6X6", 0.89),
    ("ASTC_8X8", 0.5),
    ("ETC2_RGBA", 1.0),
    ("ETC2_RGB", 0.5),
    ("ETC1", 0.5),
    ("BC1", 0.5),
    ("BC4", 0.5),
    ("DXT1", 0.5),
    ("BC2", 1.0),
    ("BC3", 1.0),
    ("BC5", 1.0),
    ("BC6", 1.0),
    ("BC7", 1.0),
    ("DXT3", 1.0),
    ("DXT5", 1.0),
    ("PVRTC_2", 0.25),
    ("PVRTC", 0.5),
    ("R32G32B32A32", 16.0),
    ("R16G16B16A16", 8.0),
    ("R8G8B8A8", 4.0),
    ("B8G8R8A8", 4.0),
    ("R8G8B8", 3.0),
    ("R8G8", 2.0),
    ("RGBA8", 4.0),
    ("RGB8", 3.0),
    ("RG8", 2.0),
    ("R8", 1.0),
];

/// 纹理记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRecord {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "one")]
    pub depth: u32,
    #[serde(default = "one")]
    pub mip_levels: u32,
    #[serde(default = "one")]
    pub array_layers: u32,
    #[serde(default)]
    pub format: String,
}

fn one() -> u32 {
    1
}

impl TextureRecord {
    pub fn new(name: impl Into<String>, width: u32, height: u32, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            depth: 1,
            mip_levels: 1,
            array_layers: 1,
            format: format.into(),
        }
    }

    pub fn with_mips(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    pub fn with_layers(mut self, array_layers: u32) -> Self {
        self.array_layers = array_layers;
        self
    }

    /// 最大边长
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }

    /// 大写、统一分隔符并去掉 API 前缀后的格式名
    fn normalized_format(&self) -> String {
        let format = self.upper_format();
        match API_PREFIXES.iter().find_map(|prefix| format.strip_prefix(prefix)) {
            Some(stripped) => stripped.to_string(),
            None => format.clone(),
        }
    }

    fn upper_format(&self) -> String {
        self.format.to_ascii_uppercase().replace(['-', ' '], "_")
    }

    /// 是否为块压缩格式
    ///
    /// `GL_COMPRESSED_*` 标签的族名在中间（如 `GL_COMPRESSED_RGBA_ASTC_4x4_KHR`）。
    pub fn is_compressed(&self) -> bool {
        if self.upper_format().starts_with("GL_COMPRESSED_") {
            return true;
        }
        let format = self.normalized_format();
        COMPRESSED_FAMILIES
            .iter()
            .any(|family| format.starts_with(family))
    }

    /// 是否为深度/模板格式
    pub fn is_depth_stencil(&self) -> bool {
        let format = self.normalized_format();
        DEPTH_PREFIXES.iter().any(|prefix| format.starts_with(prefix))
            || format.starts_with("S8")
            || format.starts_with("STENCIL")
    }

    /// 每像素字节数，未知格式按 RGBA8 计算
    pub fn bytes_per_pixel(&self) -> f64 {
        let format = self.normalized_format();
        BYTES_PER_PIXEL
            .iter()
            .find(|(tag, _)| format.starts_with(tag))
            .or_else(|| BYTES_PER_PIXEL.iter().find(|(tag, _)| format.contains(tag)))
            .map(|(_, bpp)| *bpp)
            .unwrap_or(4.0)
    }


    /// 估算显存占用（字节）
    ///
    /// 完整 mip 链约为基础层的 1.33 倍。
    pub fn estimated_bytes(&self) -> u64 {
        let texels = self.width as f64 * self.height as f64 * self.depth.max(1) as f64;
        let mut bytes = texels * self.bytes_per_pixel();
        if self.mip_levels > 1 {
            bytes *= 1.33;
        }
        (bytes * self.array_layers.max(1) as f64) as u64
    }

    /// 估算显存占用（MB）
    pub fn estimated_mb(&self) -> f64 {
        self.estimated_bytes() as f64 / (1024.0 * 1024.0)
    }
}
