//! 设备
//!
//! `Device` 是所有渲染资源的所属者。它负责：
//!
//! - 记录所选的图形后端和设备能力限制
//! - 为后端资源分配句柄并登记存活的顶点格式
//! - 持有管线状态，其中"当前顶点输入"由 `bind()` 修改
//! - 按后端类型创建顶点声明
//!
//! # 并发约定
//!
//! 管线状态保存在 `RefCell` 中，因此 `Device` 不是 `Sync`：同一个设备上的
//! `bind()` 只能在一个线程中调用。需要多线程渲染时，每个渲染线程持有自己的设备。

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::num::NonZeroU64;

use tracing::{debug, info};

use crate::core::config::{Config, GraphicsBackend, NullBackendConfig};
use crate::core::error::{ConfigError, ResourceError, Result};
#[cfg(target_os = "windows")]
use crate::gfx::dx12::Dx12VertexDeclaration;
use crate::gfx::null::NullVertexDeclaration;
use crate::gfx::vulkan::VulkanVertexDeclaration;
use crate::gfx::wgpu::WgpuVertexDeclaration;

use super::declaration::VertexDeclaration;
use super::layout::DeclarationLayout;
use super::resource::ResourceHandle;

/// 设备能力限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// 最多可同时使用的顶点流（顶点缓冲区槽位）
    pub max_vertex_streams: u32,
    /// 一个声明最多可包含的顶点属性
    pub max_vertex_attributes: u32,
}

impl DeviceLimits {
    /// 各后端的默认限制
    ///
    /// - Vulkan：规范保证的最小值 16/16
    /// - DirectX 12：输入槽位与输入元素均为 32
    /// - wgpu：`wgpu::Limits::default()`
    pub fn for_backend(backend: GraphicsBackend) -> Self {
        match backend {
            GraphicsBackend::Vulkan | GraphicsBackend::Null => Self {
                max_vertex_streams: 16,
                max_vertex_attributes: 16,
            },
            GraphicsBackend::Dx12 => Self {
                max_vertex_streams: 32,
                max_vertex_attributes: 32,
            },
            GraphicsBackend::Wgpu => {
                let limits = ::wgpu::Limits::default();
                Self {
                    max_vertex_streams: limits.max_vertex_buffers,
                    max_vertex_attributes: limits.max_vertex_attributes,
                }
            }
        }
    }

    /// 检查布局是否在限制之内
    pub fn check(&self, layout: &DeclarationLayout) -> Result<()> {
        if layout.stream_count() > self.max_vertex_streams {
            return Err(ResourceError::Unsupported(format!(
                "{} vertex streams exceed the device limit of {}",
                layout.stream_count(),
                self.max_vertex_streams
            ))
            .into());
        }

        let attributes = layout.elements().len() as u32;
        if attributes > self.max_vertex_attributes {
            return Err(ResourceError::Unsupported(format!(
                "{} vertex attributes exceed the device limit of {}",
                attributes, self.max_vertex_attributes
            ))
            .into());
        }

        Ok(())
    }
}

/// 设备登记的顶点格式信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexFormatRecord {
    /// 调试名称
    pub label: Option<String>,
    /// 每个流的步长
    pub stream_strides: Vec<u32>,
    /// 属性数量
    pub attribute_count: u32,
}

impl VertexFormatRecord {
    pub(crate) fn new(label: Option<String>, layout: &DeclarationLayout) -> Self {
        Self {
            label,
            stream_strides: layout.stream_strides().to_vec(),
            attribute_count: layout.elements().len() as u32,
        }
    }
}

/// 当前绑定的顶点输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundVertexInput {
    /// 顶点格式句柄
    pub handle: ResourceHandle,
    /// 每个流的步长，绑定顶点缓冲区时使用
    pub stream_strides: Vec<u32>,
}

/// 管线状态
#[derive(Debug, Default)]
struct PipelineState {
    vertex_input: Option<BoundVertexInput>,
    vertex_input_binds: u64,
}

/// 设备
pub struct Device {
    backend: GraphicsBackend,
    limits: DeviceLimits,
    null_config: NullBackendConfig,
    next_handle: Cell<u64>,
    vertex_formats: RefCell<BTreeMap<ResourceHandle, VertexFormatRecord>>,
    pipeline: RefCell<PipelineState>,
}

impl Device {
    /// 使用默认限制创建设备
    ///
    /// DirectX 12 只在 Windows 上可用。
    pub fn new(backend: GraphicsBackend) -> Result<Self> {
        if backend == GraphicsBackend::Dx12 && !cfg!(target_os = "windows") {
            return Err(ConfigError::InvalidValue {
                field: "graphics.backend".to_string(),
                reason: "DX12 backend is only available on Windows".to_string(),
            }
            .into());
        }

        info!(backend = backend.name(), "creating device");
        Ok(Self {
            backend,
            limits: DeviceLimits::for_backend(backend),
            null_config: NullBackendConfig::default(),
            next_handle: Cell::new(1),
            vertex_formats: RefCell::new(BTreeMap::new()),
            pipeline: RefCell::new(PipelineState::default()),
        })
    }

    /// 根据配置创建设备
    ///
    /// 先校验配置，再应用限制覆盖和 Null 后端选项。
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut limits = DeviceLimits::for_backend(config.graphics.backend);
        if let Some(streams) = config.limits.max_vertex_streams {
            limits.max_vertex_streams = streams;
        }
        if let Some(attributes) = config.limits.max_vertex_attributes {
            limits.max_vertex_attributes = attributes;
        }

        Ok(Self::new(config.graphics.backend)?
            .with_limits(limits)
            .with_null_config(config.graphics.null.clone()))
    }

    /// 覆盖设备限制
    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 设置 Null 后端选项
    pub fn with_null_config(mut self, null_config: NullBackendConfig) -> Self {
        self.null_config = null_config;
        self
    }

    /// 图形后端
    pub fn backend(&self) -> GraphicsBackend {
        self.backend
    }

    /// 后端名称
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// 设备限制
    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Null 后端选项
    pub fn null_config(&self) -> &NullBackendConfig {
        &self.null_config
    }

    /// 创建一个属于本设备的顶点声明
    ///
    /// 返回的声明处于未初始化状态，具体实现由设备的后端决定。
    pub fn create_vertex_declaration(&self) -> Box<dyn VertexDeclaration + '_> {
        match self.backend {
            GraphicsBackend::Vulkan => Box::new(VulkanVertexDeclaration::new(self)),
            GraphicsBackend::Wgpu => Box::new(WgpuVertexDeclaration::new(self)),
            GraphicsBackend::Null => Box::new(NullVertexDeclaration::new(self)),
            #[cfg(target_os = "windows")]
            GraphicsBackend::Dx12 => Box::new(Dx12VertexDeclaration::new(self)),
            // Device::new 在非 Windows 平台上拒绝 DX12
            #[cfg(not(target_os = "windows"))]
            GraphicsBackend::Dx12 => unreachable!("DX12 device on a non-Windows platform"),
        }
    }

    /// 当前存活的顶点格式数量
    pub fn live_vertex_formats(&self) -> usize {
        self.vertex_formats.borrow().len()
    }

    /// 查询已登记的顶点格式
    pub fn vertex_format(&self, handle: ResourceHandle) -> Option<VertexFormatRecord> {
        self.vertex_formats.borrow().get(&handle).cloned()
    }

    /// 当前绑定的顶点输入
    pub fn current_vertex_input(&self) -> Option<BoundVertexInput> {
        self.pipeline.borrow().vertex_input.clone()
    }

    /// 累计的顶点输入绑定次数
    pub fn vertex_input_binds(&self) -> u64 {
        self.pipeline.borrow().vertex_input_binds
    }

    pub(crate) fn register_vertex_format(&self, record: VertexFormatRecord) -> ResourceHandle {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 1);
        // 计数器从 1 开始且只增不减
        let handle = ResourceHandle::new(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN));

        self.vertex_formats.borrow_mut().insert(handle, record);
        handle
    }

    pub(crate) fn release_vertex_format(&self, handle: ResourceHandle) -> bool {
        let removed = self.vertex_formats.borrow_mut().remove(&handle).is_some();

        let mut pipeline = self.pipeline.borrow_mut();
        if pipeline.vertex_input.as_ref().is_some_and(|b| b.handle == handle) {
            debug!(handle = %handle, "clearing current vertex input");
            pipeline.vertex_input = None;
        }
        removed
    }

    pub(crate) fn set_vertex_input(&self, handle: ResourceHandle) -> bool {
        let Some(stream_strides) = self
            .vertex_formats
            .borrow()
            .get(&handle)
            .map(|record| record.stream_strides.clone())
        else {
            return false;
        };

        let mut pipeline = self.pipeline.borrow_mut();
        pipeline.vertex_input = Some(BoundVertexInput {
            handle,
            stream_strides,
        });
        pipeline.vertex_input_binds += 1;
        true
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("backend", &self.backend)
            .field("limits", &self.limits)
            .field("live_vertex_formats", &self.live_vertex_formats())
            .finish_non_exhaustive()
    }
}
