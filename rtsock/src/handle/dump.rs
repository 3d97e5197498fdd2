use std::{
    io,
    ops::{Deref, DerefMut},
};

use crate::{core::kernel::Kernel, error::RouteError};

use super::kernel_handle::KernelHandle;

pub struct SnapshotReader<'a, K: Kernel> {
    pub handle: &'a mut KernelHandle<K>,
}

impl<K: Kernel> Deref for SnapshotReader<'_, K> {
    type Target = KernelHandle<K>;

    fn deref(&self) -> &Self::Target {
        self.handle
    }
}

impl<K: Kernel> DerefMut for SnapshotReader<'_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.handle
    }
}

impl<'a, K: Kernel> From<&'a mut KernelHandle<K>> for SnapshotReader<'a, K> {
    fn from(handle: &'a mut KernelHandle<K>) -> Self {
        Self { handle }
    }
}

impl<K: Kernel> SnapshotReader<'_, K> {
    /// Sizes the routing table, then fetches it into a buffer of exactly
    /// that size. A table that grew in between is an error, not a partial
    /// result.
    pub fn dump(&self) -> Result<Vec<u8>, RouteError> {
        let size = self
            .kernel
            .route_table_size()
            .map_err(RouteError::query("sysctl(NET_RT_DUMP) size"))?;

        let mut buf = vec![0; size];
        let written = self
            .kernel
            .route_table_fetch(&mut buf)
            .map_err(RouteError::query("sysctl(NET_RT_DUMP) fetch"))?;

        if written > size {
            return Err(RouteError::QueryFailure {
                call: "sysctl(NET_RT_DUMP) fetch",
                source: io::Error::other(format!(
                    "table truncated, {written} bytes reported for {size} allocated"
                )),
            });
        }

        tracing::debug!(size, written, "routing table dumped");
        buf.truncate(written);

        Ok(buf)
    }
}
