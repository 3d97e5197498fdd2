use std::{
    io::{Error, Result},
    mem::size_of,
    os::fd::RawFd,
};

use libc::{c_int, c_ulong, c_void, size_t, socklen_t, AF_INET, AF_ROUTE, AF_UNSPEC, SOCK_DGRAM, SOCK_RAW};

pub struct Socket {
    fd: RawFd,
}

impl Socket {
    pub fn new(domain: c_int, ty: c_int, proto: c_int) -> Result<Self> {
        match unsafe { libc::socket(domain, ty, proto) } {
            -1 => Err(Error::last_os_error()),
            fd => {
                let s = Self { fd };
                s.close_on_exec()?;
                Ok(s)
            }
        }
    }

    /// Raw routing socket. Our own messages are not echoed back to it.
    pub fn route() -> Result<Self> {
        let s = Self::new(AF_ROUTE, SOCK_RAW, AF_UNSPEC)?;
        s.use_loopback(false)?;
        Ok(s)
    }

    /// Datagram socket used only as a handle for interface ioctls.
    pub fn inet() -> Result<Self> {
        Self::new(AF_INET, SOCK_DGRAM, 0)
    }

    fn close_on_exec(&self) -> Result<()> {
        match unsafe { libc::fcntl(self.fd, libc::F_SETFD, libc::FD_CLOEXEC) } {
            -1 => Err(Error::last_os_error()),
            _ => Ok(()),
        }
    }

    fn use_loopback(&self, on: bool) -> Result<()> {
        let value = on as c_int;

        match unsafe {
            libc::setsockopt(
                self.fd,
                libc::SOL_SOCKET,
                libc::SO_USELOOPBACK,
                &value as *const _ as *const c_void,
                size_of::<c_int>() as socklen_t,
            )
        } {
            -1 => Err(Error::last_os_error()),
            _ => Ok(()),
        }
    }

    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        match unsafe { libc::write(self.fd, buf.as_ptr() as *const c_void, buf.len() as size_t) } {
            -1 => Err(Error::last_os_error()),
            n => Ok(n as usize),
        }
    }

    pub fn ioctl<T>(&self, request: u64, arg: &mut T) -> Result<()> {
        match unsafe { libc::ioctl(self.fd, request as c_ulong, arg as *mut T) } {
            -1 => Err(Error::last_os_error()),
            _ => Ok(()),
        }
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
