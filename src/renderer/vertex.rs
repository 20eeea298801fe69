//! 顶点元素定义
//!
//! 本模块定义了描述顶点格式所需的基础类型：
//!
//! - `VertexSemantic`：属性的语义（位置、法线、纹理坐标……）
//! - `VertexElementType`：属性在内存中的编码方式
//! - `VertexElement`：一个属性的完整描述（语义、编码、偏移、所属流）
//! - `VertexDeclarationParameters`：传给 `initialize` 的有序元素列表
//!
//! 以及一张与任何设备、实例无关的元素大小表 `element_to_size`。
//!
//! # 元素类型编码
//!
//! 原始字节码沿用引擎历史上的取值：
//!
//! | 类型 | 字节码 | 大小 |
//! |---|---|---|
//! | FLOAT1 | 0 | 4 |
//! | FLOAT2 | 1 | 8 |
//! | FLOAT3 | 2 | 12 |
//! | FLOAT4 | 3 | 16 |
//! | UBYTE4 | 5 | 4 |
//!
//! 其他字节码解析为 `VertexElementType::Unrecognized`，大小为 0。

use std::fmt;
use std::mem::size_of;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::core::error::LayoutError;

const FLOAT_SIZE: u32 = size_of::<f32>() as u32;
const UBYTE_SIZE: u32 = size_of::<u8>() as u32;

/// 顶点属性的语义
///
/// 用于把顶点缓冲区中的数据与着色器输入对应起来。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexSemantic {
    /// 顶点位置
    Position,
    /// 蒙皮权重
    BlendWeight,
    /// 蒙皮骨骼索引
    BlendIndices,
    /// 法线
    Normal,
    /// 纹理坐标
    #[serde(alias = "texcoord")]
    TexCoord,
    /// 切线
    Tangent,
    /// 副法线
    Binormal,
    /// 顶点颜色
    Color,
}

impl VertexSemantic {
    /// HLSL 语义名（DirectX 输入布局使用）
    pub fn hlsl_name(&self) -> &'static str {
        match self {
            VertexSemantic::Position => "POSITION",
            VertexSemantic::BlendWeight => "BLENDWEIGHT",
            VertexSemantic::BlendIndices => "BLENDINDICES",
            VertexSemantic::Normal => "NORMAL",
            VertexSemantic::TexCoord => "TEXCOORD",
            VertexSemantic::Tangent => "TANGENT",
            VertexSemantic::Binormal => "BINORMAL",
            VertexSemantic::Color => "COLOR",
        }
    }
}

/// 顶点元素的编码类型
///
/// 已知类型是封闭的；来自外部数据的未知字节码保存在
/// `Unrecognized` 中，它是大小表里唯一的默认分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexElementType {
    /// 1 个 32 位浮点
    Float1,
    /// 2 个 32 位浮点
    Float2,
    /// 3 个 32 位浮点
    Float3,
    /// 4 个 32 位浮点
    Float4,
    /// 4 个 8 位无符号整数
    UByte4,
    /// 未识别的原始字节码
    Unrecognized(u8),
}

impl VertexElementType {
    /// 所有已知类型
    pub const ALL: [VertexElementType; 5] = [
        VertexElementType::Float1,
        VertexElementType::Float2,
        VertexElementType::Float3,
        VertexElementType::Float4,
        VertexElementType::UByte4,
    ];

    /// 从原始字节码解析
    pub const fn from_raw(tag: u8) -> Self {
        match tag {
            0 => VertexElementType::Float1,
            1 => VertexElementType::Float2,
            2 => VertexElementType::Float3,
            3 => VertexElementType::Float4,
            5 => VertexElementType::UByte4,
            other => VertexElementType::Unrecognized(other),
        }
    }

    /// 原始字节码
    pub const fn raw(self) -> u8 {
        match self {
            VertexElementType::Float1 => 0,
            VertexElementType::Float2 => 1,
            VertexElementType::Float3 => 2,
            VertexElementType::Float4 => 3,
            VertexElementType::UByte4 => 5,
            VertexElementType::Unrecognized(tag) => tag,
        }
    }

    /// 是否为已知类型
    pub const fn is_recognized(self) -> bool {
        !matches!(self, VertexElementType::Unrecognized(_))
    }

    /// 编码后的字节大小，见 [`element_to_size`]
    pub const fn size(self) -> u32 {
        element_to_size(self)
    }

    /// 分量个数
    pub const fn component_count(self) -> u32 {
        match self {
            VertexElementType::Float1 => 1,
            VertexElementType::Float2 => 2,
            VertexElementType::Float3 => 3,
            VertexElementType::Float4 | VertexElementType::UByte4 => 4,
            VertexElementType::Unrecognized(_) => 0,
        }
    }

    /// 配置文件中使用的名称
    pub fn name(self) -> Option<&'static str> {
        match self {
            VertexElementType::Float1 => Some("float1"),
            VertexElementType::Float2 => Some("float2"),
            VertexElementType::Float3 => Some("float3"),
            VertexElementType::Float4 => Some("float4"),
            VertexElementType::UByte4 => Some("ubyte4"),
            VertexElementType::Unrecognized(_) => None,
        }
    }

    /// 按名称解析（不区分大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }
}

impl From<u8> for VertexElementType {
    fn from(tag: u8) -> Self {
        Self::from_raw(tag)
    }
}

impl fmt::Display for VertexElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unrecognized({})", self.raw()),
        }
    }
}

impl Serialize for VertexElementType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_u8(self.raw()),
        }
    }
}

// 配置文件里既可以写名称也可以写原始字节码
#[derive(Deserialize)]
#[serde(untagged)]
enum ElementTypeRepr {
    Tag(u8),
    Name(String),
}

impl<'de> Deserialize<'de> for VertexElementType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match ElementTypeRepr::deserialize(deserializer)? {
            ElementTypeRepr::Tag(tag) => Ok(Self::from_raw(tag)),
            ElementTypeRepr::Name(name) => Self::from_name(&name).ok_or_else(|| {
                de::Error::custom(format!("unknown vertex element type '{}'", name))
            }),
        }
    }
}

/// 元素大小表
///
/// 纯函数，不依赖任何设备或声明实例。未识别的类型返回 0，
/// 累加大小的调用方会因此得到偏小的步长；需要显式报错时使用
/// [`try_element_to_size`]。
pub const fn element_to_size(ty: VertexElementType) -> u32 {
    match ty {
        VertexElementType::Float1 => FLOAT_SIZE,
        VertexElementType::Float2 => 2 * FLOAT_SIZE,
        VertexElementType::Float3 => 3 * FLOAT_SIZE,
        VertexElementType::Float4 => 4 * FLOAT_SIZE,
        VertexElementType::UByte4 => 4 * UBYTE_SIZE,
        VertexElementType::Unrecognized(_) => 0,
    }
}

/// 按原始字节码查询大小，未知字节码返回 0
pub const fn element_to_size_raw(tag: u8) -> u32 {
    element_to_size(VertexElementType::from_raw(tag))
}

/// 严格模式：未知字节码返回错误
pub fn try_element_to_size(tag: u8) -> std::result::Result<u32, LayoutError> {
    match VertexElementType::from_raw(tag) {
        VertexElementType::Unrecognized(tag) => Err(LayoutError::UnknownTypeTag(tag)),
        ty => Ok(element_to_size(ty)),
    }
}

/// 顶点中的一个属性
///
/// # 字段说明
///
/// - `stream`：所属的顶点缓冲区槽位
/// - `offset`：在该流的顶点步长内的字节偏移
/// - `element_type`：编码类型
/// - `usage` / `usage_index`：语义及语义索引（如 TEXCOORD1）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexElement {
    /// 流索引
    #[serde(default)]
    pub stream: u32,

    /// 字节偏移
    pub offset: u32,

    /// 编码类型
    #[serde(rename = "type")]
    pub element_type: VertexElementType,

    /// 语义
    pub usage: VertexSemantic,

    /// 语义索引
    #[serde(default)]
    pub usage_index: u8,
}

impl VertexElement {
    /// 创建一个新的顶点元素
    pub fn new(
        stream: u32,
        offset: u32,
        element_type: VertexElementType,
        usage: VertexSemantic,
        usage_index: u8,
    ) -> Self {
        Self {
            stream,
            offset,
            element_type,
            usage,
            usage_index,
        }
    }

    /// 位置属性（float3，流 0）
    pub fn position(offset: u32) -> Self {
        Self::new(0, offset, VertexElementType::Float3, VertexSemantic::Position, 0)
    }

    /// 法线属性（float3，流 0）
    pub fn normal(offset: u32) -> Self {
        Self::new(0, offset, VertexElementType::Float3, VertexSemantic::Normal, 0)
    }

    /// 纹理坐标属性（float2，流 0）
    pub fn texcoord(offset: u32, usage_index: u8) -> Self {
        Self::new(0, offset, VertexElementType::Float2, VertexSemantic::TexCoord, usage_index)
    }

    /// 切线属性（float3，流 0）
    pub fn tangent(offset: u32) -> Self {
        Self::new(0, offset, VertexElementType::Float3, VertexSemantic::Tangent, 0)
    }

    /// 顶点颜色（ubyte4，流 0）
    pub fn color(offset: u32) -> Self {
        Self::new(0, offset, VertexElementType::UByte4, VertexSemantic::Color, 0)
    }

    /// 修改所属流
    pub fn at_stream(mut self, stream: u32) -> Self {
        self.stream = stream;
        self
    }

    /// 编码后的字节大小
    #[inline]
    pub fn size(&self) -> u32 {
        element_to_size(self.element_type)
    }

    /// 元素结束位置（不含），溢出时返回 `None`
    #[inline]
    pub fn end(&self) -> Option<u32> {
        self.offset.checked_add(self.size())
    }
}

/// 顶点声明参数
///
/// 描述一个声明期望的有序元素序列。由调用方持有，
/// `initialize` 只复制所需内容，不保留引用。
///
/// # 示例
///
/// ```
/// use vertex_decl::renderer::vertex::{VertexDeclarationParameters, VertexElement};
///
/// let params = VertexDeclarationParameters::new()
///     .with_element(VertexElement::position(0))
///     .with_element(VertexElement::texcoord(12, 0))
///     .with_label("position_uv");
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexDeclarationParameters {
    /// 调试名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// 有序元素列表，顺序即管线槽位绑定顺序
    #[serde(default)]
    pub elements: Vec<VertexElement>,
}

impl VertexDeclarationParameters {
    /// 创建空参数
    pub fn new() -> Self {
        Self::default()
    }

    /// 从元素序列创建
    pub fn from_elements(elements: impl IntoIterator<Item = VertexElement>) -> Self {
        Self {
            label: None,
            elements: elements.into_iter().collect(),
        }
    }

    /// 追加一个元素
    pub fn with_element(mut self, element: VertexElement) -> Self {
        self.elements.push(element);
        self
    }

    /// 设置调试名称
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// 元素列表
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// 元素数量
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// 是否没有任何元素
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
