//! 顶点声明
//!
//! `VertexDeclaration` 在 `RenderResource` 之上描述一个顶点格式，
//! 并能把它设置为设备当前的顶点输入。
//!
//! # 状态机
//!
//! ```text
//! Uninitialized --initialize--> Initialized --create--> Created
//!                                    ^                     |
//!                                    +-------free----------+
//! ```
//!
//! - `initialize` 失败时保持原状态和原布局
//! - `create` 失败时保持 `Initialized`
//! - 只有 `Created` 状态下 `bind` 才会成功，且不改变状态
//! - `Created` 状态下重新 `initialize` 会被拒绝，需要先 `free`
//!
//! # 后端实现
//!
//! 各图形 API 只需要实现 [`VertexInputBackend`]，把校验后的布局翻译成
//! 该 API 的原生顶点输入描述。`BackendDeclaration` 负责状态机、句柄登记和
//! 绑定，并为每个后端提供同一份 `VertexDeclaration` 实现。

use std::marker::PhantomData;

use tracing::{debug, trace, warn};

use crate::core::error::{ResourceError, Result};
use crate::gfx::backend::VertexInputBackend;
use crate::{engine_error, engine_warn};

use super::device::{Device, VertexFormatRecord};
use super::layout::{stream_extent, DeclarationLayout};
use super::resource::{RenderResource, ResourceHandle};
use super::vertex::{VertexDeclarationParameters, VertexElement};

/// 顶点声明的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationState {
    /// 尚未成功 `initialize`
    Uninitialized,
    /// 布局已保存，后端状态未分配
    Initialized,
    /// 后端状态已分配，可以 `bind`
    Created,
}

/// 顶点声明接口
///
/// # 示例
///
/// ```
/// use vertex_decl::core::config::GraphicsBackend;
/// use vertex_decl::renderer::{Device, VertexDeclarationParameters, VertexElement};
///
/// let device = Device::new(GraphicsBackend::Null)?;
/// let mut decl = device.create_vertex_declaration();
///
/// decl.initialize(&VertexDeclarationParameters::from_elements([
///     VertexElement::position(0),
///     VertexElement::texcoord(12, 0),
/// ]))?;
/// assert_eq!(decl.vertex_stride(), 20);
///
/// decl.create()?;
/// decl.bind()?;
/// # Ok::<(), vertex_decl::core::error::RenderError>(())
/// ```
pub trait VertexDeclaration: RenderResource {
    /// 校验并保存有序元素列表，不访问后端
    fn initialize(&mut self, params: &VertexDeclarationParameters) -> Result<()>;

    /// 设为设备当前的顶点输入
    ///
    /// 只修改设备的管线状态，不修改声明本身。
    fn bind(&self) -> Result<()>;

    /// 引用到的流数量，未初始化时为 0
    fn vertex_stream_count(&self) -> u32;

    /// 所有元素大小之和，未初始化时为 0
    fn vertex_stride(&self) -> u32;

    /// 按保存顺序返回的元素列表
    fn declaration(&self) -> &[VertexElement];

    /// 当前生命周期状态
    fn state(&self) -> DeclarationState;

    /// 指定流的步长（该流最远元素的结束位置）
    fn stream_stride(&self, stream: u32) -> u32 {
        stream_extent(self.declaration(), stream)
    }
}

struct Realized<N> {
    handle: ResourceHandle,
    native: N,
}

/// 通用的后端顶点声明
///
/// `B` 决定原生顶点输入对象的形式，其余逻辑在所有后端之间共享。
pub struct BackendDeclaration<'d, B: VertexInputBackend> {
    device: &'d Device,
    label: Option<String>,
    layout: Option<DeclarationLayout>,
    realized: Option<Realized<B::Native>>,
    _backend: PhantomData<B>,
}

impl<'d, B: VertexInputBackend> BackendDeclaration<'d, B> {
    /// 创建一个绑定到 `device` 的未初始化声明
    pub fn new(device: &'d Device) -> Self {
        Self {
            device,
            label: None,
            layout: None,
            realized: None,
            _backend: PhantomData,
        }
    }

    /// 校验后的布局
    pub fn layout(&self) -> Option<&DeclarationLayout> {
        self.layout.as_ref()
    }

    /// 后端原生顶点输入对象
    pub fn native(&self) -> Option<&B::Native> {
        self.realized.as_ref().map(|r| &r.native)
    }

    /// 设备分配的句柄
    pub fn handle(&self) -> Option<ResourceHandle> {
        self.realized.as_ref().map(|r| r.handle)
    }

    fn release(&mut self) {
        if let Some(Realized { handle, native }) = self.realized.take() {
            B::release(self.device, native);
            self.device.release_vertex_format(handle);
            debug!(
                backend = B::KIND.name(),
                handle = %handle,
                label = self.label.as_deref().unwrap_or(""),
                "vertex declaration freed"
            );
        }
    }
}

impl<B: VertexInputBackend> RenderResource for BackendDeclaration<'_, B> {
    fn device(&self) -> &Device {
        self.device
    }

    fn create(&mut self) -> Result<()> {
        let Some(layout) = self.layout.as_ref() else {
            engine_error!("create() called on an uninitialized vertex declaration");
            return Err(ResourceError::NotInitialized.into());
        };

        if self.realized.is_some() {
            engine_warn!(
                "create() called twice on vertex declaration {:?} without free()",
                self.label
            );
            return Err(ResourceError::AlreadyCreated.into());
        }

        self.device.limits().check(layout)?;

        let native = B::realize(self.device, layout).inspect_err(|e| {
            warn!(backend = B::KIND.name(), error = %e, "failed to realize vertex declaration");
        })?;
        let handle = self
            .device
            .register_vertex_format(VertexFormatRecord::new(self.label.clone(), layout));

        debug!(
            backend = B::KIND.name(),
            handle = %handle,
            streams = layout.stream_count(),
            stride = layout.vertex_stride(),
            "vertex declaration created"
        );
        self.realized = Some(Realized { handle, native });
        Ok(())
    }

    fn free(&mut self) -> Result<()> {
        self.release();
        Ok(())
    }

    fn is_created(&self) -> bool {
        self.realized.is_some()
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<B: VertexInputBackend> VertexDeclaration for BackendDeclaration<'_, B> {
    fn initialize(&mut self, params: &VertexDeclarationParameters) -> Result<()> {
        if self.realized.is_some() {
            engine_error!("initialize() called while backend state is live; free() first");
            return Err(ResourceError::StillCreated.into());
        }

        let layout = DeclarationLayout::from_elements(params.elements()).inspect_err(|e| {
            warn!(label = params.label.as_deref().unwrap_or(""), error = %e, "rejected vertex layout");
        })?;

        debug!(
            label = params.label.as_deref().unwrap_or(""),
            elements = layout.elements().len(),
            stride = layout.vertex_stride(),
            streams = layout.stream_count(),
            "vertex declaration initialized"
        );
        self.label = params.label.clone();
        self.layout = Some(layout);
        Ok(())
    }

    fn bind(&self) -> Result<()> {
        let Some(realized) = self.realized.as_ref() else {
            engine_error!(
                "bind() called on vertex declaration {:?} that is not created",
                self.label
            );
            return Err(ResourceError::NotCreated.into());
        };

        if !self.device.set_vertex_input(realized.handle) {
            engine_error!("vertex format {} is not registered with its device", realized.handle);
            return Err(ResourceError::NotCreated.into());
        }

        trace!(backend = B::KIND.name(), handle = %realized.handle, "vertex declaration bound");
        Ok(())
    }

    fn vertex_stream_count(&self) -> u32 {
        self.layout.as_ref().map_or(0, DeclarationLayout::stream_count)
    }

    fn vertex_stride(&self) -> u32 {
        self.layout.as_ref().map_or(0, DeclarationLayout::vertex_stride)
    }

    fn declaration(&self) -> &[VertexElement] {
        self.layout.as_ref().map(DeclarationLayout::elements).unwrap_or(&[])
    }

    fn state(&self) -> DeclarationState {
        match (&self.layout, &self.realized) {
            (_, Some(_)) => DeclarationState::Created,
            (Some(_), None) => DeclarationState::Initialized,
            (None, None) => DeclarationState::Uninitialized,
        }
    }

    fn stream_stride(&self, stream: u32) -> u32 {
        self.layout.as_ref().map_or(0, |l| l.stream_stride(stream))
    }
}

impl<B: VertexInputBackend> Drop for BackendDeclaration<'_, B> {
    fn drop(&mut self) {
        self.release();
    }
}
