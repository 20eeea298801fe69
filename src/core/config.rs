//! 配置管理模块
//!
//! 提供设备与顶点声明配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [graphics]
//! backend = "vulkan"  # vulkan, dx12, wgpu, null
//!
//! [graphics.null]
//! fail_create = false
//! capacity = 64
//!
//! [limits]
//! max_vertex_streams = 16
//! max_vertex_attributes = 16
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = true
//!
//! [declarations.position_uv]
//! elements = [
//!   { offset = 0,  type = "float3", usage = "position" },
//!   { offset = 12, type = "float2", usage = "texcoord" },
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::error::{ConfigError, Result};
use crate::renderer::layout::DeclarationLayout;
use crate::renderer::vertex::VertexDeclarationParameters;

/// 配置
///
/// 可以从配置文件加载，也可以通过代码构建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 设备限制覆盖
    #[serde(default)]
    pub limits: LimitsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 具名的顶点声明
    #[serde(default)]
    pub declarations: BTreeMap<String, VertexDeclarationParameters>,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 图形后端选择
    #[serde(default = "default_backend")]
    pub backend: GraphicsBackend,

    /// Null 后端选项
    #[serde(default)]
    pub null: NullBackendConfig,
}

/// 图形后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsBackend {
    /// Vulkan 后端
    Vulkan,
    /// DirectX 12 后端
    Dx12,
    /// wgpu 后端
    Wgpu,
    /// 不调用图形 API 的后端
    Null,
}

/// Null 后端选项
///
/// 用于在测试中模拟后端分配失败。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullBackendConfig {
    /// 每次创建都失败
    #[serde(default)]
    pub fail_create: bool,

    /// 存活顶点格式的上限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

/// 设备限制覆盖
///
/// 未设置的项使用后端默认值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_vertex_streams: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_vertex_attributes: Option<u32>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_backend() -> GraphicsBackend { GraphicsBackend::Vulkan }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "vertex_decl.log".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            graphics: GraphicsConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
            declarations: BTreeMap::new(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            null: NullBackendConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use vertex_decl::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), vertex_decl::core::RenderError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--vulkan`: 使用 Vulkan 后端
    /// - `--dx12`: 使用 DirectX 12 后端
    /// - `--wgpu`: 使用 wgpu 后端
    /// - `--null`: 使用 Null 后端
    ///
    /// 出现多个后端参数时，最后一个生效。
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for arg in args {
            let backend = match arg.as_ref() {
                "--vulkan" => GraphicsBackend::Vulkan,
                "--dx12" => GraphicsBackend::Dx12,
                "--wgpu" => GraphicsBackend::Wgpu,
                "--null" => GraphicsBackend::Null,
                _ => continue,
            };
            self.graphics.backend = backend;
        }
    }

    /// 验证配置的有效性
    ///
    /// 限制覆盖必须大于 0，每个具名声明都必须通过布局校验。
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_vertex_streams == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_vertex_streams".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.limits.max_vertex_attributes == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_vertex_attributes".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        for (name, params) in &self.declarations {
            if let Err(e) = DeclarationLayout::from_elements(params.elements()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("declarations.{}", name),
                    reason: e.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// 取出具名声明
    ///
    /// 没有设置 `label` 的声明使用其名称作为调试名称。
    pub fn declaration(&self, name: &str) -> Option<VertexDeclarationParameters> {
        let params = self.declarations.get(name)?;
        let mut params = params.clone();
        if params.label.is_none() {
            params.label = Some(name.to_string());
        }
        Some(params)
    }
}

impl GraphicsBackend {
    /// 获取后端名称
    pub fn name(&self) -> &'static str {
        match self {
            GraphicsBackend::Vulkan => "Vulkan",
            GraphicsBackend::Dx12 => "DirectX 12",
            GraphicsBackend::Wgpu => "wgpu",
            GraphicsBackend::Null => "Null",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::{VertexElement, VertexElementType, VertexSemantic};

    const SAMPLE: &str = r#"
        [graphics]
        backend = "null"

        [graphics.null]
        capacity = 4

        [limits]
        max_vertex_streams = 2

        [declarations.position_uv]
        elements = [
          { offset = 0,  type = "float3", usage = "position" },
          { offset = 12, type = "float2", usage = "texcoord", usage_index = 0 },
        ]

        [declarations.skinned]
        label = "skinned mesh"
        elements = [
          { offset = 0,  type = "float3", usage = "position" },
          { stream = 1, offset = 0, type = "float4", usage = "blend_weight" },
          { stream = 1, offset = 16, type = 4, usage = "blend_indices" },
        ]
    "#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.graphics.backend, GraphicsBackend::Vulkan);
        assert_eq!(config.logging.log_file, "vertex_decl.log");
        assert!(config.declarations.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sample() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.graphics.backend, GraphicsBackend::Null);
        assert_eq!(config.graphics.null.capacity, Some(4));
        assert!(!config.graphics.null.fail_create);
        assert_eq!(config.limits.max_vertex_streams, Some(2));
        assert_eq!(config.limits.max_vertex_attributes, None);

        let position_uv = config.declaration("position_uv").unwrap();
        assert_eq!(position_uv.label.as_deref(), Some("position_uv"));
        assert_eq!(
            position_uv.elements(),
            &[VertexElement::position(0), VertexElement::texcoord(12, 0)]
        );

        let skinned = config.declaration("skinned").unwrap();
        assert_eq!(skinned.label.as_deref(), Some("skinned mesh"));
        assert_eq!(skinned.elements()[1].usage, VertexSemantic::BlendWeight);
        assert_eq!(
            skinned.elements()[2].element_type,
            VertexElementType::Unrecognized(4)
        );

        assert!(config.declaration("missing").is_none());
    }

    #[test]
    fn test_unrecognized_type_fails_validation() {
        // skinned 的第三个元素使用了未知字节码 4
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("declarations.skinned"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.limits.max_vertex_attributes = Some(0);
        assert!(config.validate().is_err());

        config.limits.max_vertex_attributes = None;
        config.declarations.insert(
            "overlap".to_string(),
            VertexDeclarationParameters::from_elements([
                VertexElement::position(0),
                VertexElement::normal(8),
            ]),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["app", "--wgpu"]);
        assert_eq!(config.graphics.backend, GraphicsBackend::Wgpu);

        config.apply_args(["--dx12", "--null"]);
        assert_eq!(config.graphics.backend, GraphicsBackend::Null);

        config.apply_args(["--width", "800"]);
        assert_eq!(config.graphics.backend, GraphicsBackend::Null);
    }

    #[test]
    fn test_save_and_reload() {
        let mut config = Config::default();
        config.graphics.backend = GraphicsBackend::Wgpu;
        config.declarations.insert(
            "position_color".to_string(),
            VertexDeclarationParameters::from_elements([
                VertexElement::position(0),
                VertexElement::color(12),
            ]),
        );

        let path = std::env::temp_dir().join(format!("vertex_decl_config_{}.toml", std::process::id()));
        config.save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.graphics.backend, GraphicsBackend::Wgpu);
        assert_eq!(loaded.declarations, config.declarations);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        assert!(Config::from_file("does/not/exist.toml").is_err());
        let config = Config::from_file_or_default("does/not/exist.toml");
        assert_eq!(config.graphics.backend, GraphicsBackend::Vulkan);
    }
}
