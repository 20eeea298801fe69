//! 顶点布局校验
//!
//! `DeclarationLayout` 是 `initialize` 成功后的产物：经过校验的有序元素列表，
//! 以及一次性推导出的顶点步长、流数量和每个流的步长。
//! 派生值只在构造时计算，之后所有查询都读取同一份结果。

use crate::core::error::{LayoutError, Result};

use super::vertex::VertexElement;

/// 流索引上限
///
/// 目前没有图形 API 支持超过 32 个顶点输入槽位（D3D12 为 32，Vulkan/wgpu 更少），
/// 具体设备的限制在 `create` 时再检查。
pub const MAX_VERTEX_STREAMS: u32 = 32;

/// 某个流的步长：该流中最远元素的结束位置
///
/// 对紧密排列的布局，它等于该流所有元素大小之和。
pub fn stream_extent(elements: &[VertexElement], stream: u32) -> u32 {
    elements
        .iter()
        .filter(|e| e.stream == stream)
        .filter_map(|e| e.end())
        .max()
        .unwrap_or(0)
}

/// 经过校验的顶点布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationLayout {
    elements: Vec<VertexElement>,
    vertex_stride: u32,
    stream_strides: Vec<u32>,
}

impl DeclarationLayout {
    /// 校验元素序列并推导派生值
    ///
    /// # 校验规则
    ///
    /// - 至少包含一个元素
    /// - 每个元素的类型都是已知类型
    /// - 偏移量加大小不溢出，流索引小于 `MAX_VERTEX_STREAMS`
    /// - 同一流中任意两个元素的字节区间不重叠
    ///
    /// 语义可以重复出现。HLSL 输入签名要求语义唯一，这一点由 DX12 后端在
    /// `create` 时检查。
    pub fn from_elements(elements: &[VertexElement]) -> Result<Self> {
        if elements.is_empty() {
            return Err(LayoutError::Empty.into());
        }

        for (index, element) in elements.iter().enumerate() {
            if !element.element_type.is_recognized() {
                return Err(LayoutError::UnrecognizedType {
                    index,
                    tag: element.element_type.raw(),
                }
                .into());
            }
            if element.end().is_none() {
                return Err(LayoutError::OffsetOverflow { index }.into());
            }
            if element.stream >= MAX_VERTEX_STREAMS {
                return Err(LayoutError::StreamOutOfRange {
                    index,
                    stream: element.stream,
                }
                .into());
            }
        }

        for (first, a) in elements.iter().enumerate() {
            for (offset, b) in elements[first + 1..].iter().enumerate() {
                let second = first + 1 + offset;

                if a.stream == b.stream && ranges_overlap(a, b) {
                    return Err(LayoutError::Overlap {
                        stream: a.stream,
                        first,
                        second,
                    }
                    .into());
                }
            }
        }

        let stream_count = elements.iter().map(|e| e.stream).max().map_or(0, |s| s + 1);
        let stream_strides = (0..stream_count)
            .map(|stream| stream_extent(elements, stream))
            .collect();
        let vertex_stride = elements.iter().map(VertexElement::size).sum();

        Ok(Self {
            elements: elements.to_vec(),
            vertex_stride,
            stream_strides,
        })
    }

    /// 有序元素列表
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// 所有元素大小之和
    pub fn vertex_stride(&self) -> u32 {
        self.vertex_stride
    }

    /// 引用到的流数量（最大流索引 + 1）
    pub fn stream_count(&self) -> u32 {
        self.stream_strides.len() as u32
    }

    /// 指定流的步长，未引用的流为 0
    pub fn stream_stride(&self, stream: u32) -> u32 {
        self.stream_strides.get(stream as usize).copied().unwrap_or(0)
    }

    /// 所有流的步长
    pub fn stream_strides(&self) -> &[u32] {
        &self.stream_strides
    }

    /// 指定流中的元素，附带其在声明中的位置（即着色器输入位置）
    pub fn elements_in_stream(&self, stream: u32) -> impl Iterator<Item = (u32, &VertexElement)> {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.stream == stream)
            .map(|(location, e)| (location as u32, e))
    }
}

fn ranges_overlap(a: &VertexElement, b: &VertexElement) -> bool {
    // 调用前已保证 end() 不溢出
    let a_end = a.offset + a.size();
    let b_end = b.offset + b.size();
    a.offset < b_end && b.offset < a_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::{VertexElementType, VertexSemantic};

    fn layout_err(elements: &[VertexElement]) -> LayoutError {
        DeclarationLayout::from_elements(elements)
            .unwrap_err()
            .as_layout()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_position_texcoord_layout() {
        let layout = DeclarationLayout::from_elements(&[
            VertexElement::position(0),
            VertexElement::texcoord(12, 0),
        ])
        .unwrap();

        assert_eq!(layout.vertex_stride(), 20);
        assert_eq!(layout.stream_count(), 1);
        assert_eq!(layout.stream_stride(0), 20);
        assert_eq!(layout.stream_stride(1), 0);
    }

    #[test]
    fn test_stride_is_sum_of_sizes() {
        let elements = [
            VertexElement::position(0),
            VertexElement::normal(12),
            VertexElement::color(24),
            VertexElement::new(0, 28, VertexElementType::Float4, VertexSemantic::BlendWeight, 0),
            VertexElement::new(0, 44, VertexElementType::Float1, VertexSemantic::TexCoord, 3),
        ];
        let layout = DeclarationLayout::from_elements(&elements).unwrap();
        let expected: u32 = elements.iter().map(|e| e.size()).sum();

        assert_eq!(layout.vertex_stride(), expected);
        assert_eq!(layout.vertex_stride(), 48);
    }

    #[test]
    fn test_stream_count_is_max_index_plus_one() {
        let layout = DeclarationLayout::from_elements(&[
            VertexElement::texcoord(0, 0),
            VertexElement::position(0).at_stream(3),
        ])
        .unwrap();

        assert_eq!(layout.stream_count(), 4);
        assert_eq!(layout.stream_strides(), &[8, 0, 0, 12]);
        assert_eq!(layout.vertex_stride(), 20);
    }

    #[test]
    fn test_element_order_is_preserved() {
        let elements = [
            VertexElement::normal(12).at_stream(1),
            VertexElement::position(0).at_stream(1),
            VertexElement::texcoord(0, 0),
        ];
        let layout = DeclarationLayout::from_elements(&elements).unwrap();
        assert_eq!(layout.elements(), &elements);

        let stream1: Vec<_> = layout.elements_in_stream(1).map(|(loc, _)| loc).collect();
        assert_eq!(stream1, vec![0, 1]);
    }

    #[test]
    fn test_stream_stride_includes_gaps() {
        let layout = DeclarationLayout::from_elements(&[
            VertexElement::position(0),
            VertexElement::texcoord(16, 0),
        ])
        .unwrap();

        assert_eq!(layout.vertex_stride(), 20);
        assert_eq!(layout.stream_stride(0), 24);
    }

    #[test]
    fn test_empty_layout_is_rejected() {
        assert_eq!(layout_err(&[]), LayoutError::Empty);
    }

    #[test]
    fn test_overlap_is_rejected() {
        let err = layout_err(&[VertexElement::position(0), VertexElement::normal(8)]);
        assert_eq!(err, LayoutError::Overlap { stream: 0, first: 0, second: 1 });
    }

    #[test]
    fn test_same_offset_in_other_stream_is_fine() {
        let layout = DeclarationLayout::from_elements(&[
            VertexElement::position(0),
            VertexElement::normal(0).at_stream(1),
        ]);
        assert!(layout.is_ok());
    }

    #[test]
    fn test_adjacent_elements_do_not_overlap() {
        let layout = DeclarationLayout::from_elements(&[
            VertexElement::color(4),
            VertexElement::new(0, 0, VertexElementType::Float1, VertexSemantic::BlendWeight, 0),
        ]);
        assert!(layout.is_ok());
    }

    #[test]
    fn test_unrecognized_type_is_rejected() {
        let err = layout_err(&[
            VertexElement::position(0),
            VertexElement::new(0, 12, VertexElementType::from_raw(4), VertexSemantic::Color, 0),
        ]);
        assert_eq!(err, LayoutError::UnrecognizedType { index: 1, tag: 4 });
    }

    #[test]
    fn test_repeated_semantic_is_accepted() {
        // 类型已知且区间不重叠即可，语义重复不影响布局
        let layout = DeclarationLayout::from_elements(&[
            VertexElement::position(0),
            VertexElement::position(0).at_stream(1),
        ])
        .unwrap();
        assert_eq!(layout.stream_count(), 2);
        assert_eq!(layout.vertex_stride(), 24);

        assert!(DeclarationLayout::from_elements(&[
            VertexElement::texcoord(0, 0),
            VertexElement::texcoord(8, 0),
        ])
        .is_ok());
    }

    #[test]
    fn test_offset_overflow_is_rejected() {
        let err = layout_err(&[VertexElement::position(u32::MAX - 4)]);
        assert_eq!(err, LayoutError::OffsetOverflow { index: 0 });
    }

    #[test]
    fn test_stream_out_of_range_is_rejected() {
        let err = layout_err(&[VertexElement::position(0).at_stream(MAX_VERTEX_STREAMS)]);
        assert_eq!(err, LayoutError::StreamOutOfRange { index: 0, stream: MAX_VERTEX_STREAMS });
    }
}
