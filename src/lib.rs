//! vertex_decl - 多后端顶点声明
//!
//! 用与图形 API 无关的方式描述顶点数据的内存布局，并交给具体后端
//! （Vulkan、DirectX 12、wgpu）实现和绑定。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理）
//! - `renderer`: 顶点元素、布局校验、资源生命周期与设备
//! - `gfx`: 各图形 API 的顶点输入翻译
//! - `geometry`: 网格数据及按声明打包顶点流
//!
//! # 使用示例
//!
//! ```
//! use vertex_decl::core::config::GraphicsBackend;
//! use vertex_decl::renderer::{Device, VertexDeclarationParameters, VertexElement};
//!
//! let device = Device::new(GraphicsBackend::Null)?;
//! let mut decl = device.create_vertex_declaration();
//!
//! decl.initialize(&VertexDeclarationParameters::from_elements([
//!     VertexElement::position(0),
//!     VertexElement::texcoord(12, 0),
//! ]))?;
//! assert_eq!(decl.vertex_stride(), 20);
//!
//! decl.create()?;
//! decl.bind()?;
//! decl.free()?;
//! # Ok::<(), vertex_decl::core::RenderError>(())
//! ```

pub mod core;
pub mod geometry;
pub mod renderer;
pub mod gfx;
