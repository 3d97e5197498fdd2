use anyhow::{bail, Result};
use ipnet::IpNet;

use crate::{
    consts::RT_MSGHDR_LEN,
    roundup,
    types::{
        addr::{AddrRole, AddressEntry},
        flags::RouteFlags,
        message::{Payload, RouteMessage},
    },
};

/// One decoded record of a routing table dump. `raw` covers the whole
/// record, header included, exactly as the kernel laid it out.
#[derive(Debug, Clone)]
pub struct RouteRecord<'a> {
    pub offset: usize,
    pub header: RouteMessage,
    pub addresses: Vec<AddressEntry>,
    pub raw: &'a [u8],
}

impl RouteRecord<'_> {
    pub fn address(&self, role: AddrRole) -> Option<&AddressEntry> {
        self.addresses.iter().find(|a| a.role == role)
    }

    pub fn destination(&self) -> Option<&AddressEntry> {
        self.address(AddrRole::Destination)
    }

    pub fn gateway(&self) -> Option<&AddressEntry> {
        self.address(AddrRole::Gateway)
    }

    pub fn netmask(&self) -> Option<&AddressEntry> {
        self.address(AddrRole::Netmask)
    }

    pub fn flags(&self) -> RouteFlags {
        self.header.route_flags()
    }

    pub fn is_default(&self) -> bool {
        self.destination().is_some_and(|d| d.is_unspecified())
    }

    /// Destination as a prefix when both the address and its mask are known.
    pub fn prefix(&self) -> Option<IpNet> {
        let ip = self.destination()?.address.ip()?;
        let len = match self.netmask() {
            Some(mask) => mask.prefix_len()?,
            None if self.flags().contains(RouteFlags::HOST) => match ip {
                std::net::IpAddr::V4(_) => 32,
                std::net::IpAddr::V6(_) => 128,
            },
            None => return None,
        };

        IpNet::new(ip, len).ok()
    }

    /// Network column as netstat prints it.
    pub fn network(&self) -> String {
        if self.flags().contains(RouteFlags::LLINFO) {
            return self.destination().map(|d| d.to_string()).unwrap_or_default();
        }

        if self.is_default() {
            return "default".to_string();
        }

        match self.prefix() {
            Some(net) => net.to_string(),
            None => self
                .destination()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Builds a complete route message from a header and raw socket addresses.
/// Entries are laid out in role order, each padded to the alignment word,
/// and `msg_len` and `addrs` are filled in.
pub fn compose(mut header: RouteMessage, entries: &[(AddrRole, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut entries = entries.to_vec();
    entries.sort_by_key(|(role, _)| role.bit());

    let mut addrs = 0u32;
    let mut body = Vec::new();

    for (role, bytes) in entries {
        if addrs & role.bit() != 0 {
            bail!("{role:?} address given twice");
        }
        addrs |= role.bit();

        let declared = bytes.first().copied().unwrap_or(0) as usize;
        let width = roundup(declared);
        if bytes.len() > width {
            bail!(
                "{role:?} address is {} bytes but declares {declared}",
                bytes.len()
            );
        }

        let start = body.len();
        body.extend_from_slice(&bytes);
        body.resize(start + width, 0);
    }

    let msg_len = RT_MSGHDR_LEN + body.len();
    header.msg_len = u16::try_from(msg_len)?;
    header.addrs = addrs as i32;

    let mut buf = header.to_bytes()?;
    buf.extend(body);

    Ok(buf)
}
