use std::{fmt, net::IpAddr};

use crate::types::{addr::AddressEntry, flags::RouteFlags, routing::RouteRecord};

pub const DEFAULT_SENTINEL: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(1, 1, 1, 1));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    /// Gateway route the operating system did not install.
    NonGlobalGateway,
    /// Destination or gateway is the tunnel endpoint address.
    Sentinel,
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteReason::NonGlobalGateway => f.write_str("gateway route without global flag"),
            DeleteReason::Sentinel => f.write_str("tunnel endpoint route"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Delete(DeleteReason),
    /// Host and gateway flags together; never touched.
    SkipHostGateway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    /// Destination is the all-zero address. Reporting only.
    pub default_route: bool,
}

impl Classification {
    pub fn is_delete(&self) -> bool {
        matches!(self.verdict, Verdict::Delete(_))
    }
}

#[derive(Debug, Clone)]
pub struct RouteClassifier {
    sentinel: String,
}

impl Default for RouteClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}

impl RouteClassifier {
    pub fn new(sentinel: IpAddr) -> Self {
        Self {
            sentinel: sentinel.to_string(),
        }
    }

    pub fn classify(&self, record: &RouteRecord) -> Classification {
        let flags = record.flags();
        let default_route = record.is_default();
        let verdict = |verdict| Classification {
            verdict,
            default_route,
        };

        if flags.contains(RouteFlags::HOST | RouteFlags::GATEWAY) {
            return verdict(Verdict::SkipHostGateway);
        }

        if flags.contains(RouteFlags::LLINFO) {
            return verdict(Verdict::Keep);
        }

        if flags.contains(RouteFlags::GATEWAY) && !flags.contains(RouteFlags::GLOBAL) {
            return verdict(Verdict::Delete(DeleteReason::NonGlobalGateway));
        }

        let is_sentinel =
            |entry: Option<&AddressEntry>| entry.is_some_and(|e| e.to_string() == self.sentinel);
        if is_sentinel(record.gateway()) || is_sentinel(record.destination()) {
            return verdict(Verdict::Delete(DeleteReason::Sentinel));
        }

        verdict(Verdict::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        consts::{RTM_GET, RTM_VERSION},
        core::message::RouteRecords,
        types::{
            addr::{encode_mask, AddrRole, Address},
            message::RouteMessageBuilder,
            routing::compose,
        },
    };

    fn route(flags: RouteFlags, dst: &str, gw: Option<&str>) -> Vec<u8> {
        let header = RouteMessageBuilder::default()
            .version(RTM_VERSION)
            .kind(RTM_GET)
            .flags(flags.bits() as i32)
            .build()
            .unwrap();

        let dst: IpAddr = dst.parse().unwrap();
        let sockaddr = |ip: IpAddr| match ip {
            IpAddr::V4(ip) => Address::Inet4(ip).to_sockaddr(),
            IpAddr::V6(ip) => Address::Inet6 { ip, scope_id: 0 }.to_sockaddr(),
        };

        let mut entries = vec![(AddrRole::Destination, sockaddr(dst))];
        if let Some(gw) = gw {
            entries.push((AddrRole::Gateway, sockaddr(gw.parse().unwrap())));
        }
        if dst.is_unspecified() {
            entries.push((AddrRole::Netmask, encode_mask(dst)));
        }

        compose(header, &entries).unwrap()
    }

    fn classify(raw: &[u8]) -> Classification {
        let record = RouteRecords::from(raw).next().unwrap().unwrap();
        RouteClassifier::default().classify(&record)
    }

    #[test]
    fn test_host_gateway_is_skipped() {
        // would otherwise match every delete rule
        let raw = route(
            RouteFlags::UP | RouteFlags::HOST | RouteFlags::GATEWAY,
            "1.1.1.1",
            Some("1.1.1.1"),
        );
        assert_eq!(classify(&raw).verdict, Verdict::SkipHostGateway);
    }

    #[test]
    fn test_link_info_is_kept() {
        let raw = route(
            RouteFlags::UP | RouteFlags::GATEWAY | RouteFlags::LLINFO,
            "1.1.1.1",
            None,
        );
        assert_eq!(classify(&raw).verdict, Verdict::Keep);
    }

    #[test]
    fn test_non_global_gateway_is_deleted() {
        let raw = route(
            RouteFlags::UP | RouteFlags::GATEWAY | RouteFlags::STATIC,
            "10.8.0.0",
            Some("10.8.0.1"),
        );
        assert_eq!(
            classify(&raw).verdict,
            Verdict::Delete(DeleteReason::NonGlobalGateway)
        );
    }

    #[test]
    fn test_global_gateway_is_kept() {
        let raw = route(
            RouteFlags::UP | RouteFlags::GATEWAY | RouteFlags::GLOBAL,
            "10.8.0.0",
            Some("10.8.0.1"),
        );
        assert_eq!(classify(&raw).verdict, Verdict::Keep);
    }

    #[test]
    fn test_sentinel_beats_global_flag() {
        let raw = route(
            RouteFlags::UP | RouteFlags::GATEWAY | RouteFlags::GLOBAL,
            "1.1.1.1",
            Some("10.0.0.1"),
        );
        assert_eq!(
            classify(&raw).verdict,
            Verdict::Delete(DeleteReason::Sentinel)
        );

        let raw = route(
            RouteFlags::UP | RouteFlags::GATEWAY | RouteFlags::GLOBAL,
            "10.0.0.0",
            Some("1.1.1.1"),
        );
        assert!(classify(&raw).is_delete());
    }

    #[test]
    fn test_default_route_is_flagged() {
        let raw = route(
            RouteFlags::UP | RouteFlags::GATEWAY | RouteFlags::GLOBAL,
            "0.0.0.0",
            Some("192.168.1.1"),
        );
        let c = classify(&raw);
        assert!(c.default_route);
        assert_eq!(c.verdict, Verdict::Keep);

        let raw = route(RouteFlags::UP | RouteFlags::GATEWAY, "::", Some("fe80::1"));
        let c = classify(&raw);
        assert!(c.default_route);
        assert_eq!(c.verdict, Verdict::Delete(DeleteReason::NonGlobalGateway));
    }

    #[test]
    fn test_custom_sentinel() {
        let raw = route(RouteFlags::UP | RouteFlags::HOST, "203.0.113.9", None);
        let record = RouteRecords::from(&raw[..]).next().unwrap().unwrap();

        assert_eq!(
            RouteClassifier::default().classify(&record).verdict,
            Verdict::Keep
        );
        assert_eq!(
            RouteClassifier::new("203.0.113.9".parse().unwrap())
                .classify(&record)
                .verdict,
            Verdict::Delete(DeleteReason::Sentinel)
        );
    }

    #[test]
    fn test_plain_route_is_kept() {
        let raw = route(RouteFlags::UP | RouteFlags::STATIC, "192.168.1.0", None);
        let c = classify(&raw);
        assert_eq!(c.verdict, Verdict::Keep);
        assert!(!c.default_route);
    }
}
