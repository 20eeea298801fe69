//! 渲染器模块
//!
//! 本模块提供与图形 API 无关的顶点声明接口。应用程序通过 `Device`
//! 创建顶点声明，而不需要关心设备使用的是哪个图形 API。
//!
//! # 架构设计
//!
//! - `vertex`：顶点元素、语义和编码类型，以及元素大小表
//! - `layout`：布局校验与步长推导
//! - `resource`：`RenderResource` 生命周期契约
//! - `declaration`：`VertexDeclaration` 接口及其通用实现
//! - `device`：设备、能力限制和管线状态
//! - 各 API 的翻译实现在 `gfx` 模块中

pub mod vertex;
pub mod layout;
pub mod resource;
pub mod declaration;
pub mod device;

pub use declaration::{BackendDeclaration, DeclarationState, VertexDeclaration};
pub use device::{BoundVertexInput, Device, DeviceLimits, VertexFormatRecord};
pub use layout::{DeclarationLayout, MAX_VERTEX_STREAMS};
pub use resource::{RenderResource, ResourceHandle};
pub use vertex::{
    element_to_size, element_to_size_raw, try_element_to_size, VertexDeclarationParameters,
    VertexElement, VertexElementType, VertexSemantic,
};
