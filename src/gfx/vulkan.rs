//! Vulkan 后端
//!
//! 把顶点布局翻译为 vulkano 的顶点输入描述：
//!
//! - 每个被引用的流对应一个 binding，binding 编号即流索引
//! - 每个元素对应一个 attribute，location 即元素在声明中的位置
//!
//! 生成的 `VertexInputState` 可以直接放进
//! `GraphicsPipelineCreateInfo::vertex_input_state`。

use tracing::trace;
use vulkano::format::Format;
use vulkano::pipeline::graphics::vertex_input::{
    VertexInputAttributeDescription, VertexInputBindingDescription, VertexInputRate,
    VertexInputState,
};

use crate::core::config::GraphicsBackend;
use crate::core::error::{ResourceError, Result};
use crate::renderer::declaration::BackendDeclaration;
use crate::renderer::device::Device;
use crate::renderer::layout::DeclarationLayout;
use crate::renderer::vertex::VertexElementType;

use super::backend::VertexInputBackend;

/// `maxVertexInputAttributeOffset` 的规范最小值
const MAX_ATTRIBUTE_OFFSET: u32 = 2047;

/// `maxVertexInputBindingStride` 的规范最小值
const MAX_BINDING_STRIDE: u32 = 2048;

/// 元素类型对应的 Vulkan 格式
pub fn vk_format(ty: VertexElementType) -> Option<Format> {
    match ty {
        VertexElementType::Float1 => Some(Format::R32_SFLOAT),
        VertexElementType::Float2 => Some(Format::R32G32_SFLOAT),
        VertexElementType::Float3 => Some(Format::R32G32B32_SFLOAT),
        VertexElementType::Float4 => Some(Format::R32G32B32A32_SFLOAT),
        VertexElementType::UByte4 => Some(Format::R8G8B8A8_UINT),
        VertexElementType::Unrecognized(_) => None,
    }
}

/// Vulkan 顶点输入描述
#[derive(Debug, Clone)]
pub struct VulkanVertexInput {
    bindings: Vec<(u32, VertexInputBindingDescription)>,
    attributes: Vec<(u32, VertexInputAttributeDescription)>,
}

impl VulkanVertexInput {
    /// `(binding, description)` 列表
    pub fn bindings(&self) -> &[(u32, VertexInputBindingDescription)] {
        &self.bindings
    }

    /// `(location, description)` 列表
    pub fn attributes(&self) -> &[(u32, VertexInputAttributeDescription)] {
        &self.attributes
    }

    /// 构建管线使用的顶点输入状态
    pub fn state(&self) -> VertexInputState {
        let mut state = VertexInputState::new();
        for (binding, desc) in &self.bindings {
            state = state.binding(*binding, desc.clone());
        }
        for (location, desc) in &self.attributes {
            state = state.attribute(*location, desc.clone());
        }
        state
    }
}

/// Vulkan 后端标记类型
#[derive(Debug, Clone, Copy, Default)]
pub struct VulkanInput;

/// Vulkan 后端的顶点声明
pub type VulkanVertexDeclaration<'d> = BackendDeclaration<'d, VulkanInput>;

impl VertexInputBackend for VulkanInput {
    type Native = VulkanVertexInput;

    const KIND: GraphicsBackend = GraphicsBackend::Vulkan;

    fn realize(_device: &Device, layout: &DeclarationLayout) -> Result<Self::Native> {
        let mut bindings = Vec::new();
        let mut attributes = Vec::new();

        for stream in 0..layout.stream_count() {
            let mut used = false;

            for (location, element) in layout.elements_in_stream(stream) {
                let format = vk_format(element.element_type).ok_or_else(|| {
                    ResourceError::CreationFailed(format!(
                        "no Vulkan format for element type {}",
                        element.element_type
                    ))
                })?;

                if element.offset > MAX_ATTRIBUTE_OFFSET {
                    return Err(ResourceError::CreationFailed(format!(
                        "attribute offset {} exceeds maxVertexInputAttributeOffset",
                        element.offset
                    ))
                    .into());
                }

                attributes.push((
                    location,
                    VertexInputAttributeDescription {
                        binding: stream,
                        format,
                        offset: element.offset,
                    },
                ));
                used = true;
            }

            if !used {
                continue;
            }

            let stride = layout.stream_stride(stream);
            if stride > MAX_BINDING_STRIDE {
                return Err(ResourceError::CreationFailed(format!(
                    "binding stride {} exceeds maxVertexInputBindingStride",
                    stride
                ))
                .into());
            }
            bindings.push((
                stream,
                VertexInputBindingDescription {
                    stride,
                    input_rate: VertexInputRate::Vertex,
                },
            ));
        }

        // location 按声明顺序排列
        attributes.sort_by_key(|(location, _)| *location);

        trace!(
            bindings = bindings.len(),
            attributes = attributes.len(),
            "Vulkan: built vertex input state"
        );
        Ok(VulkanVertexInput { bindings, attributes })
    }
}
