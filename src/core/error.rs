//! 错误处理模块
//!
//! 定义了顶点声明层使用的统一错误类型。
//!
//! # 错误分类
//!
//! - `LayoutError`：`initialize` 阶段的布局校验失败
//! - `ResourceError`：资源生命周期错误（后端分配失败、调用顺序违例）
//! - `ConfigError`：配置文件加载与校验失败

use std::fmt;

/// 统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, RenderError>;

/// 顶点声明层的错误类型
#[derive(Debug)]
pub enum RenderError {
    /// 配置错误
    Config(ConfigError),

    /// 顶点布局无效
    Layout(LayoutError),

    /// 资源生命周期错误
    Resource(ResourceError),

    /// IO 错误
    Io(std::io::Error),

    /// 日志系统错误
    Log(String),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 顶点布局校验错误
///
/// 由 `initialize` 返回，调用方不应继续 `create`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// 参数中没有任何元素
    Empty,

    /// 元素类型不是已知的 `VertexElementType`
    UnrecognizedType { index: usize, tag: u8 },

    /// 同一流内两个元素的字节区间重叠
    Overlap { stream: u32, first: usize, second: usize },

    /// 偏移量加元素大小超出 u32 范围
    OffsetOverflow { index: usize },

    /// 流索引超出任何图形 API 支持的范围
    StreamOutOfRange { index: usize, stream: u32 },

    /// 未知的元素类型字节码（严格大小查询）
    UnknownTypeTag(u8),
}

/// 资源生命周期错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// `create` 在 `initialize` 成功之前被调用
    NotInitialized,

    /// `create` 在未 `free` 的情况下再次调用
    AlreadyCreated,

    /// 后端状态仍然存活时重新 `initialize`
    StillCreated,

    /// `bind` 在 `create` 成功之前（或 `free` 之后）被调用
    NotCreated,

    /// 布局超出设备能力
    Unsupported(String),

    /// 后端无法实现该布局
    CreationFailed(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Config(e) => write!(f, "Configuration error: {}", e),
            RenderError::Layout(e) => write!(f, "Invalid vertex layout: {}", e),
            RenderError::Resource(e) => write!(f, "Resource error: {}", e),
            RenderError::Io(e) => write!(f, "IO error: {}", e),
            RenderError::Log(msg) => write!(f, "Log error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Empty => write!(f, "declaration has no elements"),
            LayoutError::UnrecognizedType { index, tag } => {
                write!(f, "element {} has unrecognized type tag {}", index, tag)
            }
            LayoutError::Overlap { stream, first, second } => write!(
                f,
                "elements {} and {} overlap in stream {}",
                first, second, stream
            ),
            LayoutError::OffsetOverflow { index } => {
                write!(f, "element {} extends past the addressable stride", index)
            }
            LayoutError::StreamOutOfRange { index, stream } => {
                write!(f, "element {} references out-of-range stream {}", index, stream)
            }
            LayoutError::UnknownTypeTag(tag) => write!(f, "unknown element type tag {}", tag),
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotInitialized => write!(f, "resource has not been initialized"),
            ResourceError::AlreadyCreated => write!(f, "resource is already created"),
            ResourceError::StillCreated => {
                write!(f, "resource must be freed before it is re-initialized")
            }
            ResourceError::NotCreated => write!(f, "resource has not been created"),
            ResourceError::Unsupported(msg) => write!(f, "Unsupported by device: {}", msg),
            ResourceError::CreationFailed(msg) => write!(f, "Resource creation failed: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(e) => Some(e),
            RenderError::Config(e) => Some(e),
            RenderError::Layout(e) => Some(e),
            RenderError::Resource(e) => Some(e),
            RenderError::Log(_) => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for LayoutError {}
impl std::error::Error for ResourceError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err)
    }
}

impl From<ConfigError> for RenderError {
    fn from(err: ConfigError) -> Self {
        RenderError::Config(err)
    }
}

impl From<LayoutError> for RenderError {
    fn from(err: LayoutError) -> Self {
        RenderError::Layout(err)
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}

impl RenderError {
    /// 如果是布局错误，返回其内部值
    pub fn as_layout(&self) -> Option<&LayoutError> {
        match self {
            RenderError::Layout(e) => Some(e),
            _ => None,
        }
    }

    /// 如果是资源错误，返回其内部值
    pub fn as_resource(&self) -> Option<&ResourceError> {
        match self {
            RenderError::Resource(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: RenderError = LayoutError::Overlap { stream: 1, first: 0, second: 2 }.into();
        assert_eq!(
            err.to_string(),
            "Invalid vertex layout: elements 0 and 2 overlap in stream 1"
        );

        let err: RenderError = ResourceError::NotCreated.into();
        assert_eq!(err.to_string(), "Resource error: resource has not been created");
    }

    #[test]
    fn test_error_accessors() {
        let err: RenderError = ResourceError::AlreadyCreated.into();
        assert_eq!(err.as_resource(), Some(&ResourceError::AlreadyCreated));
        assert!(err.as_layout().is_none());
    }
}
