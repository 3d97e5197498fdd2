use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Route flags carried in `rtm_flags` (Darwin `RTF_*`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RouteFlags: u32 {
        /// Route usable
        const UP = 0x1;
        /// Destination is reached through an intermediary
        const GATEWAY = 0x2;
        /// Host entry, as opposed to a network entry
        const HOST = 0x4;
        const REJECT = 0x8;
        const DYNAMIC = 0x10;
        const MODIFIED = 0x20;
        const DONE = 0x40;
        const DELCLONE = 0x80;
        const CLONING = 0x100;
        const XRESOLVE = 0x200;
        /// Neighbor resolution (ARP/NDP) entry
        const LLINFO = 0x400;
        const STATIC = 0x800;
        const BLACKHOLE = 0x1000;
        const NOIFREF = 0x2000;
        const PROTO2 = 0x4000;
        const PROTO1 = 0x8000;
        const PRCLONING = 0x10000;
        const WASCLONED = 0x20000;
        const PROTO3 = 0x40000;
        const PINNED = 0x100000;
        const LOCAL = 0x200000;
        const BROADCAST = 0x400000;
        const MULTICAST = 0x800000;
        const IFSCOPE = 0x1000000;
        const CONDEMNED = 0x2000000;
        const IFREF = 0x4000000;
        const PROXY = 0x8000000;
        const ROUTER = 0x10000000;
        const DEAD = 0x20000000;
        /// Installed and owned by the operating system
        const GLOBAL = 0x40000000;
    }
}

// netstat(1) letters, ascending bit order.
const LABELS: &[(RouteFlags, char)] = &[
    (RouteFlags::UP, 'U'),
    (RouteFlags::GATEWAY, 'G'),
    (RouteFlags::HOST, 'H'),
    (RouteFlags::REJECT, 'R'),
    (RouteFlags::DYNAMIC, 'D'),
    (RouteFlags::MODIFIED, 'M'),
    (RouteFlags::DONE, 'd'),
    (RouteFlags::CLONING, 'C'),
    (RouteFlags::XRESOLVE, 'X'),
    (RouteFlags::LLINFO, 'L'),
    (RouteFlags::STATIC, 'S'),
    (RouteFlags::BLACKHOLE, 'B'),
    (RouteFlags::PROTO2, '2'),
    (RouteFlags::PROTO1, '1'),
    (RouteFlags::PRCLONING, 'c'),
    (RouteFlags::WASCLONED, 'W'),
    (RouteFlags::PROTO3, '3'),
    (RouteFlags::BROADCAST, 'b'),
    (RouteFlags::MULTICAST, 'm'),
    (RouteFlags::IFSCOPE, 'I'),
    (RouteFlags::IFREF, 'i'),
    (RouteFlags::PROXY, 'Y'),
    (RouteFlags::ROUTER, 'r'),
    (RouteFlags::GLOBAL, 'g'),
];

impl RouteFlags {
    pub fn labels(&self) -> String {
        LABELS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, label)| *label)
            .collect()
    }
}

impl fmt::Display for RouteFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_in_bit_order() {
        let flags = RouteFlags::GLOBAL | RouteFlags::UP | RouteFlags::STATIC | RouteFlags::GATEWAY;
        assert_eq!(flags.labels(), "UGSg");
    }

    #[test]
    fn test_unlabelled_bits_render_nothing() {
        let flags = RouteFlags::UP | RouteFlags::PINNED | RouteFlags::DEAD | RouteFlags::LOCAL;
        assert_eq!(flags.to_string(), "U");
    }

    #[test]
    fn test_label_table_is_ordered() {
        let bits: Vec<u32> = LABELS.iter().map(|(f, _)| f.bits()).collect();
        let mut sorted = bits.clone();
        sorted.sort_unstable();
        assert_eq!(bits, sorted);
    }

    #[test]
    fn test_unknown_bits_retained() {
        let flags = RouteFlags::from_bits_retain(0x8000_0001);
        assert!(flags.contains(RouteFlags::UP));
        assert_eq!(flags.bits(), 0x8000_0001);
        assert_eq!(flags.labels(), "U");
    }
}
