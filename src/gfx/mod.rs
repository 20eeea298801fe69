//! 图形后端模块
//!
//! 本模块把经过校验的顶点布局翻译为各图形 API 的原生顶点输入描述：
//! - Vulkan：通过 vulkano 生成 `VertexInputState`
//! - DirectX 12：生成 `D3D12_INPUT_ELEMENT_DESC` 数组（仅 Windows）
//! - wgpu：生成 `VertexBufferLayout` 列表
//! - Null：不调用任何 API，用于测试
//!
//! 所有后端都实现了统一的 `VertexInputBackend` trait，
//! 声明的状态机只需实现一次。

pub mod backend;
pub mod null;
pub mod vulkan;
#[cfg(target_os = "windows")]
pub mod dx12;
pub mod wgpu;

pub use backend::VertexInputBackend;
pub use null::{NullInput, NullVertexDeclaration, NullVertexFormat};
pub use vulkan::{VulkanInput, VulkanVertexDeclaration, VulkanVertexInput};
#[cfg(target_os = "windows")]
pub use dx12::{Dx12Input, Dx12InputLayout, Dx12VertexDeclaration};
pub use self::wgpu::{WgpuInput, WgpuStreamLayout, WgpuVertexDeclaration, WgpuVertexInput};
