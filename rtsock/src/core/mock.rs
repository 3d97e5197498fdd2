use std::{
    collections::HashMap,
    io::{Error, ErrorKind, Result},
};

use super::kernel::Kernel;

/// In-memory kernel for tests. Records every message written to the routing
/// socket and every interface flag write.
#[derive(Debug, Default)]
pub struct MockKernel {
    pub table: Vec<u8>,
    /// Table returned by the fetch when it differs from the one sized.
    pub grown: Option<Vec<u8>>,
    pub fail_size: bool,
    pub fail_fetch: bool,
    /// Number of upcoming route writes that are refused.
    pub reject: usize,
    /// Number of upcoming route writes that fail as if the route were gone.
    pub vanished: usize,
    pub sent: Vec<Vec<u8>>,
    pub interfaces: HashMap<String, u16>,
    pub flag_writes: Vec<(String, u16)>,
    pub names: HashMap<u16, String>,
}

impl MockKernel {
    pub fn with_table(table: Vec<u8>) -> Self {
        Self {
            table,
            ..Default::default()
        }
    }

    pub fn with_interface(mut self, name: &str, flags: u16) -> Self {
        self.interfaces.insert(name.to_string(), flags);
        self
    }

    pub fn with_name(mut self, index: u16, name: &str) -> Self {
        self.names.insert(index, name.to_string());
        self
    }
}

impl Kernel for MockKernel {
    fn route_table_size(&self) -> Result<usize> {
        if self.fail_size {
            return Err(Error::from(ErrorKind::PermissionDenied));
        }
        Ok(self.table.len())
    }

    fn route_table_fetch(&self, buf: &mut [u8]) -> Result<usize> {
        if self.fail_fetch {
            return Err(Error::from(ErrorKind::PermissionDenied));
        }

        let table = self.grown.as_ref().unwrap_or(&self.table);
        if table.len() > buf.len() {
            return Err(Error::from(ErrorKind::OutOfMemory));
        }

        buf[..table.len()].copy_from_slice(table);
        Ok(table.len())
    }

    fn route_send(&mut self, msg: &[u8]) -> Result<usize> {
        if self.reject > 0 {
            self.reject -= 1;
            return Ok(0);
        }

        if self.vanished > 0 {
            self.vanished -= 1;
            return Err(Error::new(ErrorKind::NotFound, "not in table"));
        }

        self.sent.push(msg.to_vec());
        Ok(msg.len())
    }

    fn interface_flags(&self, name: &str) -> Result<u16> {
        self.interfaces
            .get(name)
            .copied()
            .ok_or_else(|| Error::from(ErrorKind::NotFound))
    }

    fn set_interface_flags(&mut self, name: &str, flags: u16) -> Result<()> {
        let current = self
            .interfaces
            .get_mut(name)
            .ok_or_else(|| Error::from(ErrorKind::NotFound))?;
        *current = flags;
        self.flag_writes.push((name.to_string(), flags));
        Ok(())
    }

    fn interface_name(&self, index: u16) -> Option<String> {
        self.names.get(&index).cloned()
    }
}
