//! DirectX 12 后端（仅 Windows）
//!
//! 把顶点布局翻译为 `D3D12_INPUT_ELEMENT_DESC` 数组。流索引对应
//! `InputSlot`，语义及语义索引对应 HLSL 输入签名中的 `SemanticName`
//! 与 `SemanticIndex`。

use tracing::trace;
use windows::core::{s, PCSTR};
use windows::Win32::Graphics::Direct3D12::{
    D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA, D3D12_INPUT_ELEMENT_DESC, D3D12_INPUT_LAYOUT_DESC,
};
use windows::Win32::Graphics::Dxgi::Common::{
    DXGI_FORMAT, DXGI_FORMAT_R32G32B32A32_FLOAT, DXGI_FORMAT_R32G32B32_FLOAT,
    DXGI_FORMAT_R32G32_FLOAT, DXGI_FORMAT_R32_FLOAT, DXGI_FORMAT_R8G8B8A8_UINT,
};

use crate::core::config::GraphicsBackend;
use crate::core::error::{ResourceError, Result};
use crate::renderer::declaration::BackendDeclaration;
use crate::renderer::device::Device;
use crate::renderer::layout::DeclarationLayout;
use crate::renderer::vertex::{VertexElementType, VertexSemantic};

use super::backend::VertexInputBackend;

/// 单个输入槽位中一个顶点的最大字节数
const MAX_SLOT_STRIDE: u32 = 2048;

/// 元素类型对应的 DXGI 格式
pub fn dxgi_format(ty: VertexElementType) -> Option<DXGI_FORMAT> {
    match ty {
        VertexElementType::Float1 => Some(DXGI_FORMAT_R32_FLOAT),
        VertexElementType::Float2 => Some(DXGI_FORMAT_R32G32_FLOAT),
        VertexElementType::Float3 => Some(DXGI_FORMAT_R32G32B32_FLOAT),
        VertexElementType::Float4 => Some(DXGI_FORMAT_R32G32B32A32_FLOAT),
        VertexElementType::UByte4 => Some(DXGI_FORMAT_R8G8B8A8_UINT),
        VertexElementType::Unrecognized(_) => None,
    }
}

fn semantic_name(semantic: VertexSemantic) -> PCSTR {
    match semantic {
        VertexSemantic::Position => s!("POSITION"),
        VertexSemantic::BlendWeight => s!("BLENDWEIGHT"),
        VertexSemantic::BlendIndices => s!("BLENDINDICES"),
        VertexSemantic::Normal => s!("NORMAL"),
        VertexSemantic::TexCoord => s!("TEXCOORD"),
        VertexSemantic::Tangent => s!("TANGENT"),
        VertexSemantic::Binormal => s!("BINORMAL"),
        VertexSemantic::Color => s!("COLOR"),
    }
}

/// DirectX 12 输入布局
#[derive(Debug, Clone)]
pub struct Dx12InputLayout {
    elements: Vec<D3D12_INPUT_ELEMENT_DESC>,
}

impl Dx12InputLayout {
    /// 输入元素描述
    pub fn elements(&self) -> &[D3D12_INPUT_ELEMENT_DESC] {
        &self.elements
    }

    /// 管线状态描述中使用的输入布局
    ///
    /// 返回值借用 `self` 的内存，必须在 `self` 存活期间使用。
    pub fn desc(&self) -> D3D12_INPUT_LAYOUT_DESC {
        D3D12_INPUT_LAYOUT_DESC {
            pInputElementDescs: self.elements.as_ptr(),
            NumElements: self.elements.len() as u32,
        }
    }
}

/// DirectX 12 后端标记类型
#[derive(Debug, Clone, Copy, Default)]
pub struct Dx12Input;

/// DirectX 12 后端的顶点声明
pub type Dx12VertexDeclaration<'d> = BackendDeclaration<'d, Dx12Input>;

impl VertexInputBackend for Dx12Input {
    type Native = Dx12InputLayout;

    const KIND: GraphicsBackend = GraphicsBackend::Dx12;

    fn realize(_device: &Device, layout: &DeclarationLayout) -> Result<Self::Native> {
        if let Some((stream, stride)) = layout
            .stream_strides()
            .iter()
            .enumerate()
            .find(|(_, stride)| **stride > MAX_SLOT_STRIDE)
        {
            return Err(ResourceError::CreationFailed(format!(
                "input slot {} stride {} exceeds {} bytes",
                stream, stride, MAX_SLOT_STRIDE
            ))
            .into());
        }

        // HLSL 输入签名按语义匹配，同一语义与索引只能出现一次
        let elements = layout.elements();
        for (first, a) in elements.iter().enumerate() {
            if let Some(second) = elements[first + 1..]
                .iter()
                .position(|b| a.usage == b.usage && a.usage_index == b.usage_index)
            {
                return Err(ResourceError::CreationFailed(format!(
                    "elements {} and {} both use semantic {}{}",
                    first,
                    first + 1 + second,
                    a.usage.hlsl_name(),
                    a.usage_index
                ))
                .into());
            }
        }

        let elements = elements
            .iter()
            .map(|element| {
                let format = dxgi_format(element.element_type).ok_or_else(|| {
                    ResourceError::CreationFailed(format!(
                        "no DXGI format for element type {}",
                        element.element_type
                    ))
                })?;
                Ok(D3D12_INPUT_ELEMENT_DESC {
                    SemanticName: semantic_name(element.usage),
                    SemanticIndex: u32::from(element.usage_index),
                    Format: format,
                    InputSlot: element.stream,
                    AlignedByteOffset: element.offset,
                    InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        trace!(elements = elements.len(), "DX12: built input layout");
        Ok(Dx12InputLayout { elements })
    }
}
