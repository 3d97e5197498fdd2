use std::io::Result;

/// Privileged calls the engine makes against the operating system.
pub trait Kernel {
    /// Bytes needed to hold a full routing table dump.
    fn route_table_size(&self) -> Result<usize>;

    /// Fills `buf` with the routing table dump and returns the bytes written.
    /// Fails if the table no longer fits.
    fn route_table_fetch(&self, buf: &mut [u8]) -> Result<usize>;

    /// Writes one message on the routing socket. Zero means nothing was taken.
    fn route_send(&mut self, msg: &[u8]) -> Result<usize>;

    fn interface_flags(&self, name: &str) -> Result<u16>;

    fn set_interface_flags(&mut self, name: &str, flags: u16) -> Result<()>;

    fn interface_name(&self, index: u16) -> Option<String>;
}
