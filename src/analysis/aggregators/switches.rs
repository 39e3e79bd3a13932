//! 状态切换统计
//!
//! 对有序 Draw Call 序列维护四个独立的"上一次"状态（标注、帧缓冲、纹理绑定集合、
//! 着色器），逐个比较并累计变化次数。

use crate::frame::DrawCall;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 状态切换计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchTally {
    pub marker_switches: u64,
    pub framebuffer_switches: u64,
    pub texture_binding_changes: u64,
    pub shader_switches: u64,
    /// 四项之和
    pub total: u64,
}

impl SwitchTally {
    pub fn new(
        marker_switches: u64,
        framebuffer_switches: u64,
        texture_binding_changes: u64,
        shader_switches: u64,
    ) -> Self {
        Self {
            marker_switches,
            framebuffer_switches,
            texture_binding_changes,
            shader_switches,
            total: marker_switches + framebuffer_switches + texture_binding_changes + shader_switches,
        }
    }
}

/// 单次前向遍历统计状态切换
///
/// 第一个 Draw Call 总是计为一次标注切换（从"无状态"进入第一个标注）。
/// 纹理绑定变化按相邻两次绑定集合的对称差大小计数。
pub fn tally_switches(draws: &[DrawCall]) -> SwitchTally {
    let mut marker_switches = 0u64;
    let mut framebuffer_switches = 0u64;
    let mut texture_binding_changes = 0u64;
    let mut shader_switches = 0u64;

    let mut last_marker: Option<Option<&str>> = None;
    let mut last_framebuffer: Option<&str> = None;
    let mut last_textures: BTreeSet<&str> = BTreeSet::new();
    let mut last_shader: Option<&str> = None;

    for draw in draws {
        let marker = draw.marker_label();
        if last_marker != Some(marker) {
            marker_switches += 1;
            last_marker = Some(marker);
        }

        let framebuffer = draw.framebuffer.as_deref();
        if framebuffer != last_framebuffer {
            framebuffer_switches += 1;
            last_framebuffer = framebuffer;
        }

        let textures: BTreeSet<&str> = draw.bound_textures.iter().map(String::as_str).collect();
        if textures != last_textures {
            texture_binding_changes += textures.symmetric_difference(&last_textures).count() as u64;
            last_textures = textures;
        }

        let shader = draw.shader_program.as_deref();
        if shader != last_shader {
            shader_switches += 1;
            last_shader = shader;
        }
    }

    SwitchTally::new(
        marker_switches,
        framebuffer_switches,
        texture_binding_changes,
        shader_switches,
    )
}
