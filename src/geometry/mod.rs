/// 几何体模块
///
/// 包含引擎的标准顶点结构、网格数据结构，以及按顶点声明打包顶点流的工具。
///
/// # 模块结构
///
/// - `vertex`: 标准顶点结构及其顶点声明
/// - `mesh`: CPU 侧网格数据
/// - `upload`: 按声明把顶点打包为各个流的字节数据
///
/// # 数据流
///
/// ```text
/// MeshData (CPU侧数据)
///     ↓  VertexStreams::pack(声明)
/// 每个流一块字节缓冲区
///     ↓
/// 上传到对应槽位的顶点缓冲区
/// ```

pub mod vertex;
pub mod mesh;
pub mod upload;

// 重新导出常用类型
pub use vertex::Vertex;
pub use mesh::MeshData;
pub use upload::VertexStreams;
