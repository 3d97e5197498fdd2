use anyhow::Result;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{consts, error::RouteError, types::flags::RouteFlags};

pub trait Payload {
    fn len(&self) -> usize;
    fn to_bytes(&self) -> Result<Vec<u8>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub locks: u32,
    pub mtu: u32,
    pub hopcount: u32,
    pub expire: i32,
    pub recvpipe: u32,
    pub sendpipe: u32,
    pub ssthresh: u32,
    pub rtt: u32,
    pub rttvar: u32,
    pub pksent: u32,
    pub state: u32,
    pub filler: [u32; 3],
}

/// Fixed part of a routing socket message (`struct rt_msghdr`).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(default)]
pub struct RouteMessage {
    pub msg_len: u16,
    pub version: u8,
    pub kind: u8,
    pub index: u16,
    pub spare: u16,
    pub flags: i32,
    pub addrs: i32,
    pub pid: i32,
    pub seq: i32,
    pub errno: i32,
    pub use_count: i32,
    pub inits: u32,
    pub metrics: RouteMetrics,
}

impl Payload for RouteMessage {
    fn len(&self) -> usize {
        consts::RT_MSGHDR_LEN
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| e.into())
    }
}

impl RouteMessage {
    /// Reads the header at the start of `buf`. `offset` is only used to
    /// describe where the record sits in the dump if it is too short.
    pub fn parse(buf: &[u8], offset: usize) -> Result<Self, RouteError> {
        if buf.len() < consts::RT_MSGHDR_LEN {
            return Err(RouteError::RecordOverrun {
                offset,
                needed: consts::RT_MSGHDR_LEN,
                available: buf.len(),
            });
        }

        Ok(bincode::deserialize(&buf[..consts::RT_MSGHDR_LEN])?)
    }

    pub fn route_flags(&self) -> RouteFlags {
        RouteFlags::from_bits_retain(self.flags as u32)
    }

    pub fn addr_mask(&self) -> u32 {
        self.addrs as u32
    }
}
