/// 网格数据结构模块
///
/// CPU 侧的网格数据容器。上传到 GPU 之前，按顶点声明把顶点打包为各个流。

use crate::core::error::Result;
use crate::renderer::declaration::VertexDeclaration;

use super::upload::VertexStreams;
use super::vertex::Vertex;

/// CPU侧网格数据
///
/// 一个简单的数据持有者，不包含GPU资源。
///
/// # 示例
///
/// ```rust
/// use vertex_decl::geometry::{MeshData, Vertex};
///
/// let mut mesh = MeshData::with_name("Triangle");
/// mesh.vertices.push(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0], [1.0, 0.0, 0.0]));
/// mesh.vertices.push(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0], [1.0, 0.0, 0.0]));
/// mesh.vertices.push(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0], [1.0, 0.0, 0.0]));
/// mesh.indices.extend_from_slice(&[0, 1, 2]);
///
/// assert!(mesh.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// 顶点数组
    pub vertices: Vec<Vertex>,

    /// 三角形顶点索引，每3个索引定义一个三角形
    pub indices: Vec<u32>,

    /// 网格名称（可选）
    pub name: Option<String>,
}

impl MeshData {
    /// 创建一个空的网格数据
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个指定名称的空网格数据
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// 获取顶点数量
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// 获取三角形数量
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 验证网格数据的有效性
    ///
    /// 检查索引数量是3的倍数，并且所有索引都在顶点范围内。
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "索引数量必须是3的倍数，当前为: {}",
                self.indices.len()
            ));
        }

        let vertex_count = self.vertices.len() as u32;
        if let Some((i, index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, index)| **index >= vertex_count)
        {
            return Err(format!(
                "索引 {} 处的值 {} 超出顶点范围 (共 {} 个顶点)",
                i, index, vertex_count
            ));
        }

        Ok(())
    }

    /// 按顶点声明打包顶点流
    ///
    /// 声明必须已经初始化，否则没有元素可用于打包。
    pub fn vertex_streams(&self, declaration: &dyn VertexDeclaration) -> Result<VertexStreams> {
        VertexStreams::pack(&self.vertices, declaration.declaration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GraphicsBackend;
    use crate::renderer::device::Device;

    fn triangle() -> MeshData {
        let mut mesh = MeshData::with_name("Triangle");
        mesh.vertices.extend([Vertex::default(); 3]);
        mesh.indices.extend_from_slice(&[0, 1, 2]);
        mesh
    }

    #[test]
    fn test_mesh_data_counts() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.name.as_deref(), Some("Triangle"));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_mesh_data_validation_invalid() {
        let mut mesh = triangle();
        mesh.indices.push(0);
        assert!(mesh.validate().is_err());

        let mut mesh = triangle();
        mesh.indices[2] = 5;
        assert!(mesh.validate().unwrap_err().contains("超出顶点范围"));
    }

    #[test]
    fn test_vertex_streams_follow_declaration() {
        let device = Device::new(GraphicsBackend::Null).unwrap();
        let mut decl = device.create_vertex_declaration();
        let mesh = triangle();

        // 未初始化的声明没有元素
        assert!(mesh.vertex_streams(decl.as_ref()).is_err());

        decl.initialize(&Vertex::declaration_parameters()).unwrap();
        let streams = mesh.vertex_streams(decl.as_ref()).unwrap();
        assert_eq!(streams.stream_count() as u32, decl.vertex_stream_count());
        assert_eq!(streams.stride(0), Some(decl.vertex_stride()));
        assert_eq!(streams.stream(0).map(<[u8]>::len), Some(3 * 44));
    }
}
