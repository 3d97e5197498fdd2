use std::{
    ffi::CStr,
    io::{Error, ErrorKind, Result},
    ptr,
};

use libc::{c_char, c_int, c_uint, c_void, size_t};

use crate::{
    consts::{CTL_NET, IF_NAMESIZE, NET_RT_DUMP, PF_ROUTE, SIOCGIFFLAGS, SIOCSIFFLAGS},
    core::{kernel::Kernel, socket::Socket},
};

const RT_DUMP_MIB: [c_int; 6] = [CTL_NET, PF_ROUTE, 0, 0, NET_RT_DUMP, 0];

/// `struct ifreq` as used by SIOCGIFFLAGS / SIOCSIFFLAGS.
#[repr(C)]
struct IfReqFlags {
    name: [u8; IF_NAMESIZE],
    flags: i16,
    pad: [u8; 14],
}

impl IfReqFlags {
    fn new(name: &str) -> Result<Self> {
        if name.is_empty() || name.len() >= IF_NAMESIZE {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("invalid interface name {name:?}"),
            ));
        }

        let mut req = Self {
            name: [0; IF_NAMESIZE],
            flags: 0,
            pad: [0; 14],
        };
        req.name[..name.len()].copy_from_slice(name.as_bytes());

        Ok(req)
    }
}

pub struct Darwin {
    route: Socket,
    inet: Socket,
}

impl Darwin {
    pub fn new() -> Result<Self> {
        Ok(Self {
            route: Socket::route()?,
            inet: Socket::inet()?,
        })
    }
}

fn sysctl_rt_dump(buf: *mut c_void, len: &mut size_t) -> Result<()> {
    let mut mib = RT_DUMP_MIB;

    match unsafe {
        libc::sysctl(
            mib.as_mut_ptr(),
            mib.len() as c_uint,
            buf,
            len,
            ptr::null_mut(),
            0,
        )
    } {
        -1 => Err(Error::last_os_error()),
        _ => Ok(()),
    }
}

impl Kernel for Darwin {
    fn route_table_size(&self) -> Result<usize> {
        let mut len: size_t = 0;
        sysctl_rt_dump(ptr::null_mut(), &mut len)?;
        Ok(len)
    }

    fn route_table_fetch(&self, buf: &mut [u8]) -> Result<usize> {
        let mut len: size_t = buf.len();
        sysctl_rt_dump(buf.as_mut_ptr() as *mut c_void, &mut len)?;
        Ok(len)
    }

    fn route_send(&mut self, msg: &[u8]) -> Result<usize> {
        self.route.write(msg)
    }

    fn interface_flags(&self, name: &str) -> Result<u16> {
        let mut req = IfReqFlags::new(name)?;
        self.inet.ioctl(SIOCGIFFLAGS, &mut req)?;
        Ok(req.flags as u16)
    }

    fn set_interface_flags(&mut self, name: &str, flags: u16) -> Result<()> {
        let mut req = IfReqFlags::new(name)?;
        req.flags = flags as i16;
        self.inet.ioctl(SIOCSIFFLAGS, &mut req)
    }

    fn interface_name(&self, index: u16) -> Option<String> {
        let mut buf = [0 as c_char; IF_NAMESIZE];

        let name = unsafe { libc::if_indextoname(index as c_uint, buf.as_mut_ptr()) };
        if name.is_null() {
            return None;
        }

        let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
        Some(name.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ifreq_layout() {
        assert_eq!(std::mem::size_of::<IfReqFlags>(), 32);
    }

    #[test]
    fn test_ifreq_name() {
        let req = IfReqFlags::new("en0").unwrap();
        assert_eq!(&req.name[..4], b"en0\0");

        assert!(IfReqFlags::new("").is_err());
        assert!(IfReqFlags::new("a-very-long-name").is_err());
    }

    #[test]
    fn test_route_table_size() {
        crate::test_setup!();

        let kernel = Darwin::new().unwrap();
        let size = kernel.route_table_size().unwrap();
        assert!(size > 0);

        // room for routes added since the size query
        let mut buf = vec![0; size * 2];
        let written = kernel.route_table_fetch(&mut buf).unwrap();
        assert!(written > 0 && written <= buf.len());
    }

    #[test]
    fn test_loopback_flags() {
        crate::test_setup!();

        let kernel = Darwin::new().unwrap();
        let flags = kernel.interface_flags("lo0").unwrap();
        assert_ne!(flags & crate::consts::IFF_UP, 0);
    }

    #[test]
    fn test_interface_name() {
        crate::test_setup!();

        let kernel = Darwin::new().unwrap();
        assert_eq!(kernel.interface_name(1).as_deref(), Some("lo0"));
        assert_eq!(kernel.interface_name(u16::MAX), None);
    }
}
