//! 顶点输入后端的统一抽象接口
//!
//! 每个图形 API 都实现此 trait，把校验后的 `DeclarationLayout`
//! 翻译为该 API 的原生顶点输入描述。状态机、句柄和绑定逻辑由
//! `BackendDeclaration` 统一处理，后端只关心翻译本身。

use crate::core::config::GraphicsBackend;
use crate::core::error::Result;
use crate::renderer::device::Device;
use crate::renderer::layout::DeclarationLayout;

/// 顶点输入后端
///
/// 实现者通常是零大小的标记类型。
pub trait VertexInputBackend {
    /// 原生顶点输入对象
    type Native;

    /// 对应的后端类型
    const KIND: GraphicsBackend;

    /// 把布局实现为原生对象
    ///
    /// 后端无法表达该布局时返回 `ResourceError::CreationFailed`。
    fn realize(device: &Device, layout: &DeclarationLayout) -> Result<Self::Native>;

    /// 释放原生对象
    ///
    /// 默认直接丢弃，持有外部句柄的后端需要重写。
    fn release(_device: &Device, native: Self::Native) {
        drop(native);
    }
}
