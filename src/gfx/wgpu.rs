//! wgpu 后端
//!
//! wgpu 的顶点缓冲区布局按槽位排列，槽位编号就是 `buffers` 切片中的下标，
//! 所以这里为 `0..stream_count` 的每个流都生成一项，没有元素的流得到一个
//! 空布局。着色器位置（`@location`）取元素在声明中的位置。

use tracing::trace;

use crate::core::config::GraphicsBackend;
use crate::core::error::{ResourceError, Result};
use crate::renderer::declaration::BackendDeclaration;
use crate::renderer::device::Device;
use crate::renderer::layout::DeclarationLayout;
use crate::renderer::vertex::VertexElementType;

use super::backend::VertexInputBackend;

/// 元素类型对应的 wgpu 顶点格式
pub fn wgpu_format(ty: VertexElementType) -> Option<::wgpu::VertexFormat> {
    match ty {
        VertexElementType::Float1 => Some(::wgpu::VertexFormat::Float32),
        VertexElementType::Float2 => Some(::wgpu::VertexFormat::Float32x2),
        VertexElementType::Float3 => Some(::wgpu::VertexFormat::Float32x3),
        VertexElementType::Float4 => Some(::wgpu::VertexFormat::Float32x4),
        VertexElementType::UByte4 => Some(::wgpu::VertexFormat::Uint8x4),
        VertexElementType::Unrecognized(_) => None,
    }
}

/// 单个顶点缓冲区槽位的布局
#[derive(Debug, Clone, PartialEq)]
pub struct WgpuStreamLayout {
    /// 每个顶点占用的字节数
    pub array_stride: ::wgpu::BufferAddress,
    /// 该槽位中的属性
    pub attributes: Vec<::wgpu::VertexAttribute>,
}

/// wgpu 顶点输入描述
#[derive(Debug, Clone, PartialEq)]
pub struct WgpuVertexInput {
    streams: Vec<WgpuStreamLayout>,
}

impl WgpuVertexInput {
    /// 各槽位的布局
    pub fn streams(&self) -> &[WgpuStreamLayout] {
        &self.streams
    }

    /// 生成 `VertexState::buffers` 所需的布局列表
    pub fn buffer_layouts(&self) -> Vec<::wgpu::VertexBufferLayout<'_>> {
        self.streams
            .iter()
            .map(|stream| ::wgpu::VertexBufferLayout {
                array_stride: stream.array_stride,
                step_mode: ::wgpu::VertexStepMode::Vertex,
                attributes: &stream.attributes,
            })
            .collect()
    }
}

/// wgpu 后端标记类型
#[derive(Debug, Clone, Copy, Default)]
pub struct WgpuInput;

/// wgpu 后端的顶点声明
pub type WgpuVertexDeclaration<'d> = BackendDeclaration<'d, WgpuInput>;

impl VertexInputBackend for WgpuInput {
    type Native = WgpuVertexInput;

    const KIND: GraphicsBackend = GraphicsBackend::Wgpu;

    fn realize(_device: &Device, layout: &DeclarationLayout) -> Result<Self::Native> {
        let max_stride = u64::from(::wgpu::Limits::default().max_vertex_buffer_array_stride);
        let mut streams = Vec::with_capacity(layout.stream_count() as usize);

        for stream in 0..layout.stream_count() {
            let array_stride = u64::from(layout.stream_stride(stream));
            if array_stride % ::wgpu::VERTEX_STRIDE_ALIGNMENT != 0 {
                return Err(ResourceError::CreationFailed(format!(
                    "stream {} stride {} is not a multiple of {}",
                    stream,
                    array_stride,
                    ::wgpu::VERTEX_STRIDE_ALIGNMENT
                ))
                .into());
            }
            if array_stride > max_stride {
                return Err(ResourceError::CreationFailed(format!(
                    "stream {} stride {} exceeds max_vertex_buffer_array_stride {}",
                    stream, array_stride, max_stride
                ))
                .into());
            }

            let mut attributes = Vec::new();
            for (location, element) in layout.elements_in_stream(stream) {
                let format = wgpu_format(element.element_type).ok_or_else(|| {
                    ResourceError::CreationFailed(format!(
                        "no wgpu vertex format for element type {}",
                        element.element_type
                    ))
                })?;

                let offset = u64::from(element.offset);
                if offset % ::wgpu::VERTEX_STRIDE_ALIGNMENT != 0 {
                    return Err(ResourceError::CreationFailed(format!(
                        "attribute offset {} is not a multiple of {}",
                        offset,
                        ::wgpu::VERTEX_STRIDE_ALIGNMENT
                    ))
                    .into());
                }

                attributes.push(::wgpu::VertexAttribute {
                    format,
                    offset,
                    shader_location: location,
                });
            }

            streams.push(WgpuStreamLayout {
                array_stride,
                attributes,
            });
        }

        trace!(slots = streams.len(), "wgpu: built vertex buffer layouts");
        Ok(WgpuVertexInput { streams })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RenderError;
    use crate::renderer::resource::RenderResource;
    use crate::renderer::vertex::{VertexDeclarationParameters, VertexElement, VertexSemantic};
    use crate::renderer::VertexDeclaration;

    fn wgpu_device() -> Device {
        Device::new(GraphicsBackend::Wgpu).unwrap()
    }

    #[test]
    fn test_buffer_layouts() {
        let device = wgpu_device();
        let mut decl = WgpuVertexDeclaration::new(&device);
        decl.initialize(&VertexDeclarationParameters::from_elements([
            VertexElement::position(0),
            VertexElement::normal(12),
            VertexElement::color(0).at_stream(1),
        ]))
        .unwrap();
        decl.create().unwrap();

        let input = decl.native().unwrap();
        let layouts = input.buffer_layouts();
        assert_eq!(layouts.len(), 2);
        assert_eq!(layouts[0].array_stride, 24);
        assert_eq!(layouts[0].attributes.len(), 2);
        assert_eq!(layouts[0].attributes[1].shader_location, 1);
        assert_eq!(layouts[0].attributes[1].format, ::wgpu::VertexFormat::Float32x3);
        assert_eq!(layouts[1].array_stride, 4);
        assert_eq!(layouts[1].attributes[0].format, ::wgpu::VertexFormat::Uint8x4);
        assert_eq!(layouts[1].attributes[0].shader_location, 2);
    }

    #[test]
    fn test_empty_slot_between_streams() {
        let device = wgpu_device();
        let mut decl = WgpuVertexDeclaration::new(&device);
        decl.initialize(&VertexDeclarationParameters::from_elements([
            VertexElement::position(0),
            VertexElement::texcoord(0, 0).at_stream(2),
        ]))
        .unwrap();
        decl.create().unwrap();

        let streams = decl.native().unwrap().streams();
        assert_eq!(streams.len(), 3);
        assert_eq!(streams[1].array_stride, 0);
        assert!(streams[1].attributes.is_empty());
        assert_eq!(streams[2].array_stride, 8);
    }

    #[test]
    fn test_unaligned_offset_fails() {
        let device = wgpu_device();
        let mut decl = WgpuVertexDeclaration::new(&device);
        decl.initialize(&VertexDeclarationParameters::from_elements([
            VertexElement::new(0, 2, VertexElementType::Float1, VertexSemantic::BlendWeight, 0),
        ]))
        .unwrap();

        let err = decl.create().unwrap_err();
        assert!(matches!(
            err,
            RenderError::Resource(ResourceError::CreationFailed(_))
        ));
        assert!(!decl.is_created());
        assert_eq!(device.live_vertex_formats(), 0);
    }
}
