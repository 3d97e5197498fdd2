use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

use crate::{
    consts::{
        AF_INET, AF_INET6, AF_LINK, AF_UNSPEC, RTAX_MAX, SIN6_ADDR_OFFSET, SIN6_SCOPE_OFFSET,
        SIN_ADDR_OFFSET, SOCKADDR_DL_HDR_LEN, SOCKADDR_IN6_LEN, SOCKADDR_IN_LEN,
    },
    error::RouteError,
};

const SOCKADDR_DL_LEN: usize = 20;

/// Meaning of an address inside a route message, fixed by its bit position
/// in `rtm_addrs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrRole {
    Destination,
    Gateway,
    Netmask,
    Genmask,
    Ifp,
    Ifa,
    Author,
    Broadcast,
}

impl AddrRole {
    const ALL: [AddrRole; RTAX_MAX] = [
        AddrRole::Destination,
        AddrRole::Gateway,
        AddrRole::Netmask,
        AddrRole::Genmask,
        AddrRole::Ifp,
        AddrRole::Ifa,
        AddrRole::Author,
        AddrRole::Broadcast,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn bit(self) -> u32 {
        1 << self as u32
    }

    pub fn is_mask(self) -> bool {
        matches!(self, AddrRole::Netmask | AddrRole::Genmask)
    }
}

/// Address family carried from the destination entry to the entries that
/// follow it in the same record. Netmasks come without a usable family.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParseContext {
    family: Option<u8>,
}

impl ParseContext {
    pub fn family(&self) -> Option<u8> {
        self.family
    }

    pub fn reset(&mut self) {
        self.family = None;
    }

    fn establish(&mut self, family: u8) {
        self.family = Some(family);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Inet4(Ipv4Addr),
    Inet6 {
        ip: Ipv6Addr,
        scope_id: u32,
    },
    Link {
        index: u16,
        name: Option<String>,
        addr: Option<Vec<u8>>,
    },
    Unknown {
        family: u8,
    },
}

impl Address {
    pub fn family(&self) -> u8 {
        match self {
            Address::Inet4(_) => AF_INET,
            Address::Inet6 { .. } => AF_INET6,
            Address::Link { .. } => AF_LINK,
            Address::Unknown { family } => *family,
        }
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Address::Inet4(ip) => Some(IpAddr::V4(*ip)),
            Address::Inet6 { ip, .. } => Some(IpAddr::V6(*ip)),
            _ => None,
        }
    }

    /// Full socket address as the kernel expects it on the routing socket.
    pub fn to_sockaddr(&self) -> Vec<u8> {
        match self {
            Address::Inet4(ip) => {
                let mut buf = vec![0; SOCKADDR_IN_LEN as usize];
                buf[0] = SOCKADDR_IN_LEN;
                buf[1] = AF_INET;
                buf[SIN_ADDR_OFFSET..SIN_ADDR_OFFSET + 4].copy_from_slice(&ip.octets());
                buf
            }
            Address::Inet6 { ip, scope_id } => {
                let mut buf = vec![0; SOCKADDR_IN6_LEN as usize];
                buf[0] = SOCKADDR_IN6_LEN;
                buf[1] = AF_INET6;
                buf[SIN6_ADDR_OFFSET..SIN6_ADDR_OFFSET + 16].copy_from_slice(&ip.octets());
                buf[SIN6_SCOPE_OFFSET..SIN6_SCOPE_OFFSET + 4].copy_from_slice(&scope_id.to_ne_bytes());
                buf
            }
            Address::Link { index, name, addr } => {
                let name = name.as_deref().unwrap_or_default().as_bytes();
                let addr = addr.as_deref().unwrap_or_default();
                let len = SOCKADDR_DL_LEN.max(SOCKADDR_DL_HDR_LEN + name.len() + addr.len());

                let mut buf = Vec::with_capacity(len);
                buf.extend_from_slice(&[len as u8, AF_LINK]);
                buf.extend_from_slice(&index.to_ne_bytes());
                buf.extend_from_slice(&[0, name.len() as u8, addr.len() as u8, 0]);
                buf.extend_from_slice(name);
                buf.extend_from_slice(addr);
                buf.resize(len, 0);
                buf
            }
            Address::Unknown { family } => vec![2, *family],
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Inet4(ip) => write!(f, "{ip}"),
            Address::Inet6 { ip, scope_id: 0 } => write!(f, "{ip}"),
            Address::Inet6 { ip, scope_id } => write!(f, "{ip}%{scope_id}"),
            Address::Link {
                addr: Some(addr), ..
            } if !addr.is_empty() => {
                let hex: Vec<String> = addr.iter().map(|b| format!("{b:02x}")).collect();
                f.write_str(&hex.join(":"))
            }
            Address::Link { index, .. } => write!(f, "link#{index}"),
            Address::Unknown { family } => write!(f, "af#{family}"),
        }
    }
}

/// One socket address decoded out of a route message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressEntry {
    pub role: AddrRole,
    /// Declared `sa_len`.
    pub len: u8,
    pub raw: Vec<u8>,
    pub address: Address,
}

impl AddressEntry {
    pub fn unknown(role: AddrRole, raw: &[u8], family: u8) -> Self {
        Self {
            role,
            len: raw.len() as u8,
            raw: raw.to_vec(),
            address: Address::Unknown { family },
        }
    }

    /// Number of set bits in the mask bytes the kernel supplied. A short
    /// mask has an implicit all-zero tail. `None` for a zero-length IPv6
    /// mask, which means no mask rather than /0.
    pub fn prefix_len(&self) -> Option<u8> {
        let octets = match &self.address {
            Address::Inet4(ip) => ip.octets().to_vec(),
            Address::Inet6 { .. } if self.len == 0 => return None,
            Address::Inet6 { ip, .. } => ip.octets().to_vec(),
            _ => return None,
        };

        Some(octets.iter().map(|b| b.count_ones() as u8).sum())
    }

    pub fn is_unspecified(&self) -> bool {
        self.address.ip().is_some_and(|ip| ip.is_unspecified())
    }
}

impl fmt::Display for AddressEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// Decodes one socket address. `raw` holds exactly the `sa_len` bytes of
/// the entry.
pub fn decode(
    role: AddrRole,
    ctx: &mut ParseContext,
    raw: &[u8],
) -> Result<AddressEntry, RouteError> {
    let wire_family = raw.get(1).copied().unwrap_or(AF_UNSPEC);

    let family = match role {
        AddrRole::Destination => {
            ctx.establish(wire_family);
            Some(wire_family)
        }
        AddrRole::Netmask | AddrRole::Genmask => ctx.family(),
        AddrRole::Gateway => match wire_family {
            AF_INET | AF_INET6 | AF_LINK => Some(wire_family),
            _ => ctx.family(),
        },
        _ => Some(wire_family),
    };

    let address = match family {
        Some(AF_INET) => Address::Inet4(inet4(raw)),
        Some(AF_INET6) => inet6(raw, role.is_mask()),
        Some(AF_LINK) if !role.is_mask() => link(raw),
        Some(family) => return Err(RouteError::UnknownAddressFamily { family }),
        None => {
            return Err(RouteError::UnknownAddressFamily { family: AF_UNSPEC });
        }
    };

    Ok(AddressEntry {
        role,
        len: raw.len() as u8,
        raw: raw.to_vec(),
        address,
    })
}

/// Netmask in kernel form: family left unset and trailing zero bytes cut.
pub fn encode_mask(mask: IpAddr) -> Vec<u8> {
    let (offset, octets) = match mask {
        IpAddr::V4(ip) => (SIN_ADDR_OFFSET, ip.octets().to_vec()),
        IpAddr::V6(ip) => (SIN6_ADDR_OFFSET, ip.octets().to_vec()),
    };

    let Some(last) = octets.iter().rposition(|b| *b != 0) else {
        return vec![0];
    };

    let mut buf = vec![0; offset];
    buf.extend_from_slice(&octets[..=last]);
    buf[0] = buf.len() as u8;
    buf
}

fn copy_at(raw: &[u8], offset: usize, out: &mut [u8]) {
    if let Some(src) = raw.get(offset..) {
        let n = src.len().min(out.len());
        out[..n].copy_from_slice(&src[..n]);
    }
}

fn inet4(raw: &[u8]) -> Ipv4Addr {
    let mut octets = [0u8; 4];
    copy_at(raw, SIN_ADDR_OFFSET, &mut octets);
    Ipv4Addr::from(octets)
}

fn inet6(raw: &[u8], mask: bool) -> Address {
    let mut octets = [0u8; 16];
    copy_at(raw, SIN6_ADDR_OFFSET, &mut octets);

    let mut scope = [0u8; 4];
    copy_at(raw, SIN6_SCOPE_OFFSET, &mut scope);
    let mut scope_id = u32::from_ne_bytes(scope);

    // KAME stacks embed the interface index in link-local and
    // interface/link-local multicast addresses.
    let scoped = (octets[0] == 0xfe && octets[1] & 0xc0 == 0x80)
        || (octets[0] == 0xff && matches!(octets[1] & 0x0f, 0x01 | 0x02));
    if !mask && scoped {
        let id = u16::from_be_bytes([octets[2], octets[3]]) as u32;
        if id != 0 {
            scope_id = id;
            octets[2] = 0;
            octets[3] = 0;
        }
    }

    Address::Inet6 {
        ip: Ipv6Addr::from(octets),
        scope_id,
    }
}

fn link(raw: &[u8]) -> Address {
    let index = match raw.get(2..4) {
        Some(b) => u16::from_ne_bytes([b[0], b[1]]),
        None => 0,
    };

    let nlen = raw.get(5).copied().unwrap_or(0) as usize;
    let alen = raw.get(6).copied().unwrap_or(0) as usize;

    let data = raw.get(SOCKADDR_DL_HDR_LEN..).unwrap_or_default();
    let name = data
        .get(..nlen)
        .filter(|n| !n.is_empty())
        .map(|n| String::from_utf8_lossy(n).into_owned());
    let addr = data
        .get(nlen..nlen + alen)
        .filter(|a| !a.is_empty())
        .map(|a| a.to_vec());

    Address::Link { index, name, addr }
}
