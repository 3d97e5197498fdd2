use std::ops::{Deref, DerefMut};

use crate::{consts::IFF_UP, core::kernel::Kernel, error::RouteError};

use super::kernel_handle::KernelHandle;

pub struct InterfaceCycler<'a, K: Kernel> {
    pub handle: &'a mut KernelHandle<K>,
}

impl<K: Kernel> Deref for InterfaceCycler<'_, K> {
    type Target = KernelHandle<K>;

    fn deref(&self) -> &Self::Target {
        self.handle
    }
}

impl<K: Kernel> DerefMut for InterfaceCycler<'_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.handle
    }
}

impl<'a, K: Kernel> From<&'a mut KernelHandle<K>> for InterfaceCycler<'a, K> {
    fn from(handle: &'a mut KernelHandle<K>) -> Self {
        Self { handle }
    }
}

impl<K: Kernel> InterfaceCycler<'_, K> {
    pub fn flags(&self, name: &str) -> Result<u16, RouteError> {
        self.kernel
            .interface_flags(name)
            .map_err(RouteError::query("ioctl(SIOCGIFFLAGS)"))
    }

    fn set_flags(&mut self, name: &str, flags: u16) -> Result<(), RouteError> {
        self.kernel
            .set_interface_flags(name, flags)
            .map_err(RouteError::query("ioctl(SIOCSIFFLAGS)"))
    }

    /// Clears the up bit if it is set. Returns whether a write was made.
    pub fn down(&mut self, name: &str) -> Result<bool, RouteError> {
        let flags = self.flags(name)?;
        if flags & IFF_UP == 0 {
            return Ok(false);
        }

        self.set_flags(name, flags & !IFF_UP)?;
        Ok(true)
    }

    pub fn up(&mut self, name: &str) -> Result<(), RouteError> {
        let flags = self.flags(name)?;
        self.set_flags(name, flags | IFF_UP)
    }

    /// Takes the interface down and back up, leaving every other flag as
    /// it was.
    pub fn cycle(&mut self, name: &str) -> Result<(), RouteError> {
        let was_up = self.down(name)?;
        self.up(name)?;

        tracing::info!(interface = name, was_up, "interface cycled");
        Ok(())
    }
}
