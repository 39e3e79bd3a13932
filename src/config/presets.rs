//! 预设解析器
//!
//! 预设以 TOML 文档的形式编译进二进制，第一次查询时解析并在进程内缓存，
//! 之后只读。解析流程是两级合并：
//!
//! 1. 从内置默认 [`ThresholdSet`] 开始；
//! 2. 预设中出现的组整体替换对应的组（组内缺省字段回落到类型默认值）；
//! 3. 覆盖项中出现的组逐字段合并，未出现的组保持不变。

use super::thresholds::{
    GeometryThresholds, MemoryThresholds, PassThresholds, ShaderThresholds, ThresholdOverrides,
    ThresholdSet,
};
use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// 内置预设源文件
const BUILTIN_PRESETS: &[(&str, &str)] = &[
    (
        "mobile-aggressive",
        include_str!("presets/mobile_aggressive.toml"),
    ),
    ("mobile-balanced", include_str!("presets/mobile_balanced.toml")),
    ("pc-balanced", include_str!("presets/pc_balanced.toml")),
    ("pc-high", include_str!("presets/pc_high.toml")),
    ("console", include_str!("presets/console.toml")),
];

/// 预设定义
///
/// 每个组要么完整出现，要么不出现。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetDefinition {
    #[serde(default)]
    pub description: String,
    pub geometry: Option<GeometryThresholds>,
    pub shader: Option<ShaderThresholds>,
    pub pass: Option<PassThresholds>,
    pub memory: Option<MemoryThresholds>,
}

impl PresetDefinition {
    /// 从TOML字符串解析预设
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 用预设中出现的组整体替换阈值集中的对应组
    pub fn apply_to(&self, set: &mut ThresholdSet) {
        if let Some(geometry) = &self.geometry {
            set.geometry = geometry.clone();
        }
        if let Some(shader) = &self.shader {
            set.shader = shader.clone();
        }
        if let Some(pass) = &self.pass {
            set.pass = pass.clone();
        }
        if let Some(memory) = &self.memory {
            set.memory = memory.clone();
        }
    }
}

type PresetTable = BTreeMap<&'static str, Result<PresetDefinition, String>>;

/// 全局预设缓存
static PRESETS: OnceLock<PresetTable> = OnceLock::new();

fn preset_table() -> &'static PresetTable {
    PRESETS.get_or_init(|| {
        BUILTIN_PRESETS
            .iter()
            .map(|(name, source)| {
                let parsed = PresetDefinition::from_toml_str(source).map_err(|e| e.to_string());
                tracing::debug!(target: "config", "Loaded preset '{}' (ok: {})", name, parsed.is_ok());
                (*name, parsed)
            })
            .collect()
    })
}

/// 预设解析器
pub struct PresetResolver;

impl PresetResolver {
    /// 所有可用预设名称（按字母排序）
    pub fn available_presets() -> Vec<&'static str> {
        preset_table().keys().copied().collect()
    }

    /// 查找预设定义
    pub fn preset(name: &str) -> ConfigResult<&'static PresetDefinition> {
        match preset_table().get(name) {
            Some(Ok(definition)) => Ok(definition),
            Some(Err(reason)) => Err(ConfigError::ParseError(format!(
                "preset '{}' is malformed: {}",
                name, reason
            ))),
            None => Err(ConfigError::PresetNotFound {
                name: name.to_string(),
                available: Self::available_presets().join(", "),
            }),
        }
    }

    /// 解析最终阈值集
    ///
    /// 相同的预设名与覆盖项总是得到相同的结果。
    pub fn resolve(
        preset: Option<&str>,
        overrides: Option<&ThresholdOverrides>,
    ) -> ConfigResult<ThresholdSet> {
        let mut set = ThresholdSet::default();

        if let Some(name) = preset {
            Self::preset(name)?.apply_to(&mut set);
        }

        if let Some(overrides) = overrides {
            overrides.apply_to(&mut set);
        }

        set.validate()?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::thresholds::{
        GeometryOverrides, MemoryOverrides, PassOverrides, ShaderOverrides,
    };
    use proptest::prelude::*;

    #[test]
    fn test_all_builtin_presets_parse() {
        for name in PresetResolver::available_presets() {
            let set = PresetResolver::resolve(Some(name), None);
            assert!(set.is_ok(), "preset {} failed: {:?}", name, set.err());
        }
        assert_eq!(PresetResolver::available_presets().len(), BUILTIN_PRESETS.len());
    }

    #[test]
    fn test_mobile_aggressive_values() {
        let set = PresetResolver::resolve(Some("mobile-aggressive"), None).unwrap();

        assert_eq!(set.geometry.max_draw_calls, 500);
        assert_eq!(set.geometry.max_triangles, 50_000);
        assert_eq!(set.geometry.max_triangles_per_model, 10_000);
        assert_eq!(set.shader.max_vs_instructions, 100);
        assert_eq!(set.shader.max_fs_instructions, 150);
        assert_eq!(set.shader.max_cs_instructions, 200);
        assert_eq!(set.pass.max_duration_ms, 0.3);
        assert_eq!(set.pass.max_overdraw_ratio, 2.0);
        assert_eq!(set.pass.max_switches_per_frame, 8);
        assert_eq!(set.memory.max_texture_size, 2048);
        assert!(set.memory.require_compressed_textures);
    }

    #[test]
    fn test_no_preset_yields_defaults() {
        let set = PresetResolver::resolve(None, None).unwrap();
        assert_eq!(set, ThresholdSet::default());
    }

    #[test]
    fn test_unknown_preset() {
        let err = PresetResolver::resolve(Some("handheld-ultra"), None).unwrap_err();
        match err {
            ConfigError::PresetNotFound { name, available } => {
                assert_eq!(name, "handheld-ultra");
                assert!(available.contains("mobile-aggressive"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_preset_missing_groups_keep_defaults() {
        let set = PresetResolver::resolve(Some("console"), None).unwrap();
        assert_eq!(set.geometry.max_draw_calls, 2500);
        assert_eq!(set.pass, PassThresholds::default());
        assert_eq!(set.memory, MemoryThresholds::default());
    }

    #[test]
    fn test_partial_preset_group_uses_type_defaults() {
        let preset = PresetDefinition::from_toml_str("[geometry]\nmax_draw_calls = 10\n").unwrap();
        let mut set = ThresholdSet::default();
        set.geometry.max_triangles = 1;
        preset.apply_to(&mut set);

        assert_eq!(set.geometry.max_draw_calls, 10);
        assert_eq!(
            set.geometry.max_triangles,
            GeometryThresholds::default().max_triangles
        );
    }

    #[test]
    fn test_overrides_merge_per_field() {
        let overrides = ThresholdOverrides::new()
            .with_geometry(GeometryOverrides {
                max_draw_calls: Some(200),
                ..Default::default()
            })
            .with_pass(PassOverrides {
                max_duration_ms: Some(0.5),
                ..Default::default()
            });

        let set = PresetResolver::resolve(Some("mobile-aggressive"), Some(&overrides)).unwrap();

        assert_eq!(set.geometry.max_draw_calls, 200);
        assert_eq!(set.geometry.max_triangles, 50_000);
        assert_eq!(set.pass.max_duration_ms, 0.5);
        assert_eq!(set.pass.max_switches_per_frame, 8);
        assert_eq!(set.shader.max_fs_instructions, 150);
    }

    #[test]
    fn test_empty_overrides_identity() {
        let base = PresetResolver::resolve(Some("pc-balanced"), None).unwrap();
        let with_empty =
            PresetResolver::resolve(Some("pc-balanced"), Some(&ThresholdOverrides::new())).unwrap();
        assert_eq!(base, with_empty);
    }

    #[test]
    fn test_empty_overrides_identity_for_every_preset() {
        let empty = ThresholdOverrides::new();
        let all_groups_empty = ThresholdOverrides::new()
            .with_geometry(GeometryOverrides::default())
            .with_shader(ShaderOverrides::default())
            .with_pass(PassOverrides::default())
            .with_memory(MemoryOverrides::default());

        for name in PresetResolver::available_presets() {
            let base = PresetResolver::resolve(Some(name), None).unwrap();
            assert_eq!(base, PresetResolver::resolve(Some(name), Some(&empty)).unwrap(), "{}", name);
            assert_eq!(
                base,
                PresetResolver::resolve(Some(name), Some(&all_groups_empty)).unwrap(),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = ThresholdOverrides::new().with_pass(PassOverrides {
            max_overdraw_ratio: Some(-2.0),
            ..Default::default()
        });
        let err = PresetResolver::resolve(None, Some(&overrides)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    fn geometry_overrides() -> impl Strategy<Value = GeometryOverrides> {
        (
            prop::option::of(0u64..100_000),
            prop::option::of(0u64..10_000_000),
            prop::option::of(0u64..1_000_000),
        )
            .prop_map(|(max_draw_calls, max_triangles, max_triangles_per_model)| GeometryOverrides {
                max_draw_calls,
                max_triangles,
                max_triangles_per_model,
            })
    }

    fn shader_overrides() -> impl Strategy<Value = ShaderOverrides> {
        (
            prop::option::of(0u32..10_000),
            prop::option::of(0u32..10_000),
            prop::option::of(0u32..10_000),
        )
            .prop_map(|(max_vs_instructions, max_fs_instructions, max_cs_instructions)| {
                ShaderOverrides {
                    max_vs_instructions,
                    max_fs_instructions,
                    max_cs_instructions,
                }
            })
    }

    fn pass_overrides() -> impl Strategy<Value = PassOverrides> {
        (
            prop::option::of(0.0f64..50.0),
            prop::option::of(0.0f64..10.0),
            prop::option::of(0u64..1_000),
        )
            .prop_map(|(max_duration_ms, max_overdraw_ratio, max_switches_per_frame)| PassOverrides {
                max_duration_ms,
                max_overdraw_ratio,
                max_switches_per_frame,
            })
    }

    fn memory_overrides() -> impl Strategy<Value = MemoryOverrides> {
        (prop::option::of(1u32..16_384), prop::option::of(any::<bool>())).prop_map(
            |(max_texture_size, require_compressed_textures)| MemoryOverrides {
                max_texture_size,
                require_compressed_textures,
            },
        )
    }

    fn threshold_overrides() -> impl Strategy<Value = ThresholdOverrides> {
        (
            prop::option::of(geometry_overrides()),
            prop::option::of(shader_overrides()),
            prop::option::of(pass_overrides()),
            prop::option::of(memory_overrides()),
        )
            .prop_map(|(geometry, shader, pass, memory)| ThresholdOverrides {
                geometry,
                shader,
                pass,
                memory,
            })
    }

    proptest! {
        #[test]
        fn resolve_is_idempotent(
            preset_index in prop::option::of(0usize..BUILTIN_PRESETS.len()),
            overrides in threshold_overrides(),
        ) {
            let presets = PresetResolver::available_presets();
            let preset = preset_index.map(|i| presets[i]);

            let first = PresetResolver::resolve(preset, Some(&overrides)).unwrap();
            let second = PresetResolver::resolve(preset, Some(&overrides)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
