#[cfg(target_os = "macos")]
use crate::{core::darwin::Darwin, error::RouteError};
use crate::core::kernel::Kernel;

use super::{dump::SnapshotReader, link::InterfaceCycler, routing::RouteEditor};

/// Owns the kernel interface and the routing socket sequence counter.
pub struct KernelHandle<K: Kernel> {
    pub kernel: K,
    pub seq: i32,
}

impl<K: Kernel> KernelHandle<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel, seq: 0 }
    }

    pub fn handle_snapshot(&mut self) -> SnapshotReader<'_, K> {
        SnapshotReader::from(self)
    }

    pub fn handle_route(&mut self) -> RouteEditor<'_, K> {
        RouteEditor::from(self)
    }

    pub fn handle_link(&mut self) -> InterfaceCycler<'_, K> {
        InterfaceCycler::from(self)
    }
}

#[cfg(target_os = "macos")]
impl KernelHandle<Darwin> {
    pub fn darwin() -> Result<Self, RouteError> {
        Darwin::new()
            .map(Self::new)
            .map_err(RouteError::query("socket"))
    }
}
