/// 几何体顶点定义模块
///
/// 定义引擎标准的交错顶点结构，以及描述它的顶点声明。

use bytemuck::{Pod, Zeroable};

use crate::renderer::vertex::{VertexDeclarationParameters, VertexElement};

/// 标准顶点结构
///
/// 内存布局与GPU兼容，使用 `#[repr(C)]` 保证顺序和对齐。
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)，偏移 0
/// - normal: 12 bytes (3 * f32)，偏移 12
/// - texcoord: 8 bytes (2 * f32)，偏移 24
/// - tangent: 12 bytes (3 * f32)，偏移 32
/// - **总计**: 44 bytes
///
/// # 示例
///
/// ```rust
/// use vertex_decl::geometry::vertex::Vertex;
///
/// let params = Vertex::declaration_parameters();
/// assert_eq!(params.len(), 4);
/// ```
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// 顶点位置 (x, y, z)
    pub position: [f32; 3],

    /// 法线向量 (nx, ny, nz)
    pub normal: [f32; 3],

    /// 纹理坐标 (u, v)
    pub texcoord: [f32; 2],

    /// 切线向量 (tx, ty, tz)
    pub tangent: [f32; 3],
}

impl Vertex {
    /// 创建一个新的顶点
    #[inline]
    pub fn new(
        position: [f32; 3],
        normal: [f32; 3],
        texcoord: [f32; 2],
        tangent: [f32; 3],
    ) -> Self {
        Self {
            position,
            normal,
            texcoord,
            tangent,
        }
    }

    /// 描述本结构的顶点元素，全部位于流 0
    pub fn declaration_elements() -> [VertexElement; 4] {
        [
            VertexElement::position(0),
            VertexElement::normal(12),
            VertexElement::texcoord(24, 0),
            VertexElement::tangent(32),
        ]
    }

    /// 描述本结构的顶点声明参数
    pub fn declaration_parameters() -> VertexDeclarationParameters {
        VertexDeclarationParameters::from_elements(Self::declaration_elements())
            .with_label("standard_vertex")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::layout::DeclarationLayout;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_vertex_size() {
        // 3*4 + 3*4 + 2*4 + 3*4 = 44 bytes
        assert_eq!(size_of::<Vertex>(), 44);
        assert_eq!(std::mem::align_of::<Vertex>(), 4);
    }

    #[test]
    fn test_declaration_matches_struct() {
        let layout = DeclarationLayout::from_elements(&Vertex::declaration_elements()).unwrap();
        assert_eq!(layout.vertex_stride() as usize, size_of::<Vertex>());
        assert_eq!(layout.stream_count(), 1);

        let offsets: Vec<u32> = layout.elements().iter().map(|e| e.offset).collect();
        assert_eq!(
            offsets,
            vec![
                offset_of!(Vertex, position) as u32,
                offset_of!(Vertex, normal) as u32,
                offset_of!(Vertex, texcoord) as u32,
                offset_of!(Vertex, tangent) as u32,
            ]
        );
    }

    #[test]
    fn test_vertex_creation() {
        let vertex = Vertex::new(
            [1.0, 2.0, 3.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.5],
            [1.0, 0.0, 0.0],
        );

        assert_eq!(vertex.position, [1.0, 2.0, 3.0]);
        assert_eq!(vertex.texcoord, [0.5, 0.5]);
        assert_eq!(Vertex::default().tangent, [0.0, 0.0, 0.0]);
    }
}
