//! Darwin routing socket constants. Values are spelled out instead of taken
//! from `libc` so that the decoder behaves the same on every build host.

pub const RTM_VERSION: u8 = 5;

pub const RTM_ADD: u8 = 0x1;
pub const RTM_DELETE: u8 = 0x2;
pub const RTM_GET: u8 = 0x4;

pub const RT_MSGHDR_LEN: usize = 92;
pub const RT_METRICS_LEN: usize = 56;

pub const SA_ALIGN_TO: usize = 0x4;

pub const RTAX_MAX: usize = 8;

pub const AF_UNSPEC: u8 = 0;
pub const AF_INET: u8 = 2;
pub const AF_LINK: u8 = 18;
pub const AF_INET6: u8 = 30;

pub const SOCKADDR_IN_LEN: u8 = 16;
pub const SOCKADDR_IN6_LEN: u8 = 28;
pub const SOCKADDR_DL_HDR_LEN: usize = 8;

pub const SIN_ADDR_OFFSET: usize = 4;
pub const SIN6_ADDR_OFFSET: usize = 8;
pub const SIN6_SCOPE_OFFSET: usize = 24;

pub const CTL_NET: i32 = 4;
pub const PF_ROUTE: i32 = 17;
pub const NET_RT_DUMP: i32 = 1;

pub const IF_NAMESIZE: usize = 16;
pub const IFF_UP: u16 = 0x1;

pub const SIOCGIFFLAGS: u64 = 0xc020_6911;
pub const SIOCSIFFLAGS: u64 = 0x8020_6910;
