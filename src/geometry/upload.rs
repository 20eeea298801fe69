/// 顶点流打包
///
/// 按任意顶点声明把标准顶点重新编码为每个流一块的字节缓冲区，
/// 结果可以直接上传到对应槽位的顶点缓冲区。
///
/// 声明中的语义从 `Vertex` 的字段取值：
///
/// | 语义 | 来源 |
/// |---|---|
/// | POSITION | `position` |
/// | NORMAL | `normal` |
/// | TEXCOORD0 | `texcoord` |
/// | TANGENT | `tangent` |
///
/// 其他语义在标准顶点中没有数据，打包时报错。

use tracing::debug;

use crate::core::error::{ResourceError, Result};
use crate::renderer::layout::DeclarationLayout;
use crate::renderer::vertex::{VertexElement, VertexElementType, VertexSemantic};

use super::vertex::Vertex;

/// 单个流中一个顶点的最大字节数，与 Vulkan 和 D3D12 的下限一致
pub const MAX_STREAM_STRIDE: u32 = 2048;

/// 按流拆分的顶点数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexStreams {
    vertex_count: usize,
    strides: Vec<u32>,
    buffers: Vec<Vec<u8>>,
}

impl VertexStreams {
    /// 按声明打包顶点
    ///
    /// 声明先经过与 `initialize` 相同的校验。流之间没有元素覆盖的字节填 0。
    /// 每个流的步长不能超过 `MAX_STREAM_STRIDE`，缓冲区分配失败时返回错误。
    pub fn pack(vertices: &[Vertex], elements: &[VertexElement]) -> Result<Self> {
        let layout = DeclarationLayout::from_elements(elements)?;
        let strides = layout.stream_strides().to_vec();

        // 数据来源只取决于声明，与顶点数量无关
        let sources = layout
            .elements()
            .iter()
            .map(source_field)
            .collect::<Result<Vec<_>>>()?;

        let mut buffers = Vec::with_capacity(strides.len());
        for (stream, stride) in strides.iter().enumerate() {
            buffers.push(zeroed_buffer(stream, *stride, vertices.len())?);
        }

        for (element, source) in layout.elements().iter().zip(sources) {
            let stride = strides[element.stream as usize] as usize;
            let buffer = &mut buffers[element.stream as usize];

            for (index, vertex) in vertices.iter().enumerate() {
                let start = index * stride + element.offset as usize;
                let end = start + element.size() as usize;
                encode(element.element_type, source(vertex), &mut buffer[start..end]);
            }
        }

        debug!(
            vertices = vertices.len(),
            streams = buffers.len(),
            "packed vertex streams"
        );
        Ok(Self {
            vertex_count: vertices.len(),
            strides,
            buffers,
        })
    }

    /// 顶点数量
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// 流数量
    pub fn stream_count(&self) -> usize {
        self.buffers.len()
    }

    /// 指定流的步长
    pub fn stride(&self, stream: usize) -> Option<u32> {
        self.strides.get(stream).copied()
    }

    /// 指定流的字节数据
    pub fn stream(&self, stream: usize) -> Option<&[u8]> {
        self.buffers.get(stream).map(Vec::as_slice)
    }
}

type SourceField = fn(&Vertex) -> &[f32];

fn position(vertex: &Vertex) -> &[f32] {
    &vertex.position
}

fn normal(vertex: &Vertex) -> &[f32] {
    &vertex.normal
}

fn texcoord(vertex: &Vertex) -> &[f32] {
    &vertex.texcoord
}

fn tangent(vertex: &Vertex) -> &[f32] {
    &vertex.tangent
}

fn source_field(element: &VertexElement) -> Result<SourceField> {
    match (element.usage, element.usage_index) {
        (VertexSemantic::Position, 0) => Ok(position as SourceField),
        (VertexSemantic::Normal, 0) => Ok(normal as SourceField),
        (VertexSemantic::TexCoord, 0) => Ok(texcoord as SourceField),
        (VertexSemantic::Tangent, 0) => Ok(tangent as SourceField),
        (usage, usage_index) => Err(ResourceError::Unsupported(format!(
            "standard vertex has no data for {}{}",
            usage.hlsl_name(),
            usage_index
        ))
        .into()),
    }
}

fn zeroed_buffer(stream: usize, stride: u32, vertex_count: usize) -> Result<Vec<u8>> {
    if stride > MAX_STREAM_STRIDE {
        return Err(ResourceError::Unsupported(format!(
            "stream {} stride {} exceeds {} bytes",
            stream, stride, MAX_STREAM_STRIDE
        ))
        .into());
    }

    let len = (stride as usize).checked_mul(vertex_count).ok_or_else(|| {
        ResourceError::Unsupported(format!(
            "stream {} needs more than usize::MAX bytes for {} vertices",
            stream, vertex_count
        ))
    })?;

    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|e| {
        ResourceError::Unsupported(format!(
            "cannot allocate {} bytes for stream {}: {}",
            len, stream, e
        ))
    })?;
    buffer.resize(len, 0u8);
    Ok(buffer)
}

/// 按元素类型写入一个属性
///
/// 浮点类型截断或补 0；UBYTE4 把 [0, 1] 范围的浮点映射到 0..=255。
fn encode(ty: VertexElementType, source: &[f32], out: &mut [u8]) {
    match ty {
        VertexElementType::UByte4 => {
            for (byte, value) in out.iter_mut().zip(source) {
                *byte = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }
        _ => {
            let count = ty.component_count() as usize;
            let mut components = [0.0f32; 4];
            let n = count.min(source.len());
            components[..n].copy_from_slice(&source[..n]);
            out.copy_from_slice(bytemuck::cast_slice(&components[..count]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RenderError;

    // Vec<u8> 不保证 4 字节对齐，逐个读取
    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes.chunks_exact(4).map(bytemuck::pod_read_unaligned).collect()
    }

    fn quad_corner(x: f32) -> Vertex {
        Vertex::new([x, 1.0, 2.0], [0.0, 1.0, 0.0], [x, 0.5], [1.0, 0.0, 0.0])
    }

    #[test]
    fn test_standard_layout_matches_struct_bytes() {
        let vertices = vec![quad_corner(0.0), quad_corner(1.0), quad_corner(2.0)];
        let streams = VertexStreams::pack(&vertices, &Vertex::declaration_elements()).unwrap();

        assert_eq!(streams.stream_count(), 1);
        assert_eq!(streams.stride(0), Some(44));
        assert_eq!(streams.stream(0).unwrap(), bytemuck::cast_slice::<Vertex, u8>(&vertices));
    }

    #[test]
    fn test_split_streams() {
        let vertices = vec![quad_corner(3.0), quad_corner(4.0)];
        let elements = [
            VertexElement::position(0),
            VertexElement::texcoord(0, 0).at_stream(1),
        ];
        let streams = VertexStreams::pack(&vertices, &elements).unwrap();

        assert_eq!(streams.vertex_count(), 2);
        assert_eq!(streams.stride(0), Some(12));
        assert_eq!(streams.stride(1), Some(8));

        assert_eq!(floats(streams.stream(1).unwrap()), &[3.0, 0.5, 4.0, 0.5]);
    }

    #[test]
    fn test_narrow_and_widen() {
        let vertices = vec![quad_corner(7.0)];
        let elements = [
            VertexElement::new(0, 0, VertexElementType::Float1, VertexSemantic::Position, 0),
            VertexElement::new(0, 4, VertexElementType::Float4, VertexSemantic::Normal, 0),
        ];
        let streams = VertexStreams::pack(&vertices, &elements).unwrap();

        assert_eq!(
            floats(streams.stream(0).unwrap()),
            &[7.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_ubyte4_encoding() {
        let vertices = vec![Vertex::new([0.0; 3], [1.0, 0.5, -1.0], [0.0; 2], [0.0; 3])];
        let elements = [VertexElement::new(
            0,
            0,
            VertexElementType::UByte4,
            VertexSemantic::Normal,
            0,
        )];
        let streams = VertexStreams::pack(&vertices, &elements).unwrap();

        // 标准顶点的法线只有 3 个分量，第 4 个字节保持 0
        assert_eq!(streams.stream(0).unwrap(), &[255, 128, 0, 0]);
    }

    #[test]
    fn test_missing_source_data() {
        let vertices = vec![quad_corner(0.0)];
        let err = VertexStreams::pack(&vertices, &[VertexElement::color(0)]).unwrap_err();
        assert!(matches!(err, RenderError::Resource(ResourceError::Unsupported(_))));

        let err = VertexStreams::pack(&vertices, &[VertexElement::texcoord(0, 1)]).unwrap_err();
        assert!(err.to_string().contains("TEXCOORD1"));
    }

    #[test]
    fn test_missing_source_data_without_vertices() {
        let err = VertexStreams::pack(&[], &[VertexElement::color(0)]).unwrap_err();
        assert!(matches!(err, RenderError::Resource(ResourceError::Unsupported(_))));
    }

    #[test]
    fn test_oversized_stride_is_rejected() {
        let vertices = vec![Vertex::default(); 4096];
        let err = VertexStreams::pack(&vertices, &[VertexElement::position(u32::MAX - 12)])
            .unwrap_err();
        assert!(matches!(err, RenderError::Resource(ResourceError::Unsupported(_))));

        // 恰好等于上限时可以打包
        let at_limit = [VertexElement::position(MAX_STREAM_STRIDE - 12)];
        let streams = VertexStreams::pack(&vertices[..2], &at_limit).unwrap();
        assert_eq!(streams.stride(0), Some(MAX_STREAM_STRIDE));
        assert_eq!(streams.stream(0).map(<[u8]>::len), Some(2 * MAX_STREAM_STRIDE as usize));
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        assert!(matches!(
            VertexStreams::pack(&[], &[]),
            Err(RenderError::Layout(_))
        ));
    }
}
