//! 渲染资源生命周期
//!
//! 所有由设备持有的 GPU 对象共享同一个生命周期形状：
//!
//! 1. 构造：绑定到某个设备，不分配 GPU 状态，不会失败
//! 2. `create()`：在后端分配 GPU 状态
//! 3. `free()`：释放 GPU 状态，可以再次 `create()`
//! 4. 销毁：`Drop` 时释放仍然存活的后端状态
//!
//! 资源不能在设备之间迁移，设备的生命周期必须长于资源。

use std::fmt;
use std::num::NonZeroU64;

use crate::core::error::Result;

use super::device::Device;

/// 设备分配的后端资源句柄
///
/// 在同一个设备内唯一，从 1 开始递增，永不复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(NonZeroU64);

impl ResourceHandle {
    pub(crate) fn new(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    /// 原始数值
    pub fn raw(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 渲染资源接口
///
/// 每个由设备持有的 GPU 对象都实现此 trait。
pub trait RenderResource {
    /// 所属设备
    fn device(&self) -> &Device;

    /// 在后端分配 GPU 状态
    fn create(&mut self) -> Result<()>;

    /// 释放 `create()` 分配的后端状态
    ///
    /// 没有已分配状态时是成功的空操作，可以重复调用。
    fn free(&mut self) -> Result<()>;

    /// 后端状态是否存活
    fn is_created(&self) -> bool;

    /// 调试名称
    fn label(&self) -> Option<&str> {
        None
    }
}
