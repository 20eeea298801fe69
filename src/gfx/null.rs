//! Null 后端
//!
//! 不调用任何图形 API，只记录布局信息。用于测试和没有 GPU 的环境，
//! 可以通过 `NullBackendConfig` 模拟分配失败：
//!
//! - `fail_create`：每次实现都失败
//! - `capacity`：存活的顶点格式达到上限后失败

use tracing::trace;

use crate::core::config::GraphicsBackend;
use crate::core::error::{ResourceError, Result};
use crate::renderer::declaration::BackendDeclaration;
use crate::renderer::device::Device;
use crate::renderer::layout::DeclarationLayout;

use super::backend::VertexInputBackend;

/// Null 后端的"原生"顶点格式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullVertexFormat {
    /// 属性数量
    pub attribute_count: u32,
    /// 每个流的步长
    pub stream_strides: Vec<u32>,
}

/// Null 后端标记类型
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInput;

/// Null 后端的顶点声明
pub type NullVertexDeclaration<'d> = BackendDeclaration<'d, NullInput>;

impl VertexInputBackend for NullInput {
    type Native = NullVertexFormat;

    const KIND: GraphicsBackend = GraphicsBackend::Null;

    fn realize(device: &Device, layout: &DeclarationLayout) -> Result<Self::Native> {
        let config = device.null_config();

        if config.fail_create {
            return Err(ResourceError::CreationFailed(
                "null backend is configured to fail".to_string(),
            )
            .into());
        }

        if let Some(capacity) = config.capacity {
            if device.live_vertex_formats() >= capacity {
                return Err(ResourceError::CreationFailed(format!(
                    "null backend is out of vertex format slots ({})",
                    capacity
                ))
                .into());
            }
        }

        trace!(
            attributes = layout.elements().len(),
            streams = layout.stream_count(),
            "NullBackend: realizing vertex format"
        );
        Ok(NullVertexFormat {
            attribute_count: layout.elements().len() as u32,
            stream_strides: layout.stream_strides().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::resource::RenderResource;
    use crate::renderer::vertex::{VertexDeclarationParameters, VertexElement};
    use crate::renderer::VertexDeclaration;

    #[test]
    fn test_native_format() {
        let device = Device::new(GraphicsBackend::Null).unwrap();
        let mut decl = NullVertexDeclaration::new(&device);
        decl.initialize(&VertexDeclarationParameters::from_elements([
            VertexElement::position(0),
            VertexElement::color(0).at_stream(1),
        ]))
        .unwrap();
        assert!(decl.native().is_none());

        decl.create().unwrap();
        let native = decl.native().unwrap();
        assert_eq!(native.attribute_count, 2);
        assert_eq!(native.stream_strides, vec![12, 4]);
    }
}
