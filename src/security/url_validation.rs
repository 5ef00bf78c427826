//! SSRF protection: the fixed table of destination ranges outbound HTTP may never reach.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// One blocked CIDR range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedRange {
    pub network: IpAddr,
    pub prefix: u8,
    pub label: &'static str,
}

impl BlockedRange {
    const fn v4(a: u8, b: u8, c: u8, d: u8, prefix: u8, label: &'static str) -> Self {
        Self {
            network: IpAddr::V4(Ipv4Addr::new(a, b, c, d)),
            prefix,
            label,
        }
    }

    const fn v6(network: Ipv6Addr, prefix: u8, label: &'static str) -> Self {
        Self {
            network: IpAddr::V6(network),
            prefix,
            label,
        }
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(addr)) => {
                let mask = u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0);
                u32::from(net) & mask == u32::from(*addr) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(addr)) => {
                let mask = u128::MAX.checked_shl(128 - u32::from(self.prefix)).unwrap_or(0);
                u128::from(net) & mask == u128::from(*addr) & mask
            }
            _ => false,
        }
    }

    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, self.prefix)
    }
}

/// Every destination range outbound requests are refused for.
pub const BLOCKED_RANGES: [BlockedRange; 8] = [
    BlockedRange::v4(10, 0, 0, 0, 8, "private"),
    BlockedRange::v4(172, 16, 0, 0, 12, "private"),
    BlockedRange::v4(192, 168, 0, 0, 16, "private"),
    BlockedRange::v4(127, 0, 0, 0, 8, "loopback"),
    BlockedRange::v6(Ipv6Addr::LOCALHOST, 128, "loopback"),
    BlockedRange::v4(169, 254, 0, 0, 16, "link-local (includes cloud metadata endpoint)"),
    BlockedRange::v6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10, "link-local"),
    BlockedRange::v4(255, 255, 255, 255, 32, "broadcast"),
];

/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) name the same host as their IPv4 form.
fn canonical(ip: &IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(*ip, IpAddr::V4),
        IpAddr::V4(_) => *ip,
    }
}

/// The blocked range `ip` falls in, if any.
pub fn blocked_range(ip: &IpAddr) -> Option<&'static BlockedRange> {
    let ip = canonical(ip);
    BLOCKED_RANGES.iter().find(|range| range.contains(&ip))
}

/// Destination policy applied to every address an outbound request could reach.
///
/// `exempt` holds operator-trusted literal addresses (for example a known
/// egress proxy on a private network). It is set at sandbox construction by
/// the host process and is never reachable from generated code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPolicy {
    exempt: Vec<IpAddr>,
}

impl AddressPolicy {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn with_exemptions(exempt: Vec<IpAddr>) -> Self {
        Self {
            exempt: exempt.iter().map(canonical).collect(),
        }
    }

    pub fn exemptions(&self) -> &[IpAddr] {
        &self.exempt
    }

    /// `Err(reason)` when `ip` may not be contacted.
    pub fn check(&self, ip: &IpAddr) -> Result<(), String> {
        if self.exempt.contains(&canonical(ip)) {
            return Ok(());
        }
        match blocked_range(ip) {
            Some(range) => Err(format!(
                "address {ip} is in blocked {} range {}",
                range.label,
                range.cidr()
            )),
            None => Ok(()),
        }
    }
}
