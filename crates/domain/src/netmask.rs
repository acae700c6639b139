use ipnetwork::IpNetwork;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A single address range. A bare address is treated as a host route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Netmask(IpNetwork);

impl Netmask {
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.0.contains(ip)
    }

    pub fn prefix(&self) -> u8 {
        self.0.prefix()
    }

    pub fn network(&self) -> IpNetwork {
        self.0
    }
}

impl FromStr for Netmask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("netmask cannot be empty".to_string());
        }
        if !s.contains('/') {
            let ip: IpAddr = s
                .parse()
                .map_err(|e| format!("invalid netmask '{}': {}", s, e))?;
            let prefix = if ip.is_ipv4() { 32 } else { 128 };
            return IpNetwork::new(ip, prefix)
                .map(Netmask)
                .map_err(|e| format!("invalid netmask '{}': {}", s, e));
        }
        s.parse::<IpNetwork>()
            .map(Netmask)
            .map_err(|e| format!("invalid netmask '{}': {}", s, e))
    }
}

impl fmt::Display for Netmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of ranges where the most specific match wins. Entries prefixed with
/// `!` are negative: an address falling in them does not match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetmaskGroup {
    entries: Vec<(Netmask, bool)>,
}

impl NetmaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mask(&mut self, mask: &str) -> Result<(), String> {
        let (negated, raw) = match mask.trim().strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, mask),
        };
        let netmask: Netmask = raw.parse()?;
        self.entries.retain(|(existing, _)| *existing != netmask);
        self.entries.push((netmask, negated));
        Ok(())
    }

    pub fn add_netmask(&mut self, netmask: Netmask) {
        self.entries.retain(|(existing, _)| *existing != netmask);
        self.entries.push((netmask, false));
    }

    pub fn matches(&self, ip: IpAddr) -> bool {
        let mut best: Option<(u8, bool)> = None;
        for (mask, negated) in &self.entries {
            if mask.contains(ip) {
                match best {
                    Some((prefix, _)) if prefix >= mask.prefix() => {}
                    _ => best = Some((mask.prefix(), *negated)),
                }
            }
        }
        matches!(best, Some((_, false)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn masks(&self) -> impl Iterator<Item = (&Netmask, bool)> {
        self.entries.iter().map(|(m, negated)| (m, *negated))
    }
}

/// Truncates `ip` to its first `bits` bits (IPv4 uses `v4_bits`, IPv6 `v6_bits`).
pub fn truncate_address(ip: IpAddr, v4_bits: u8, v6_bits: u8) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => {
            let bits = v4_bits.min(32);
            let mask = if bits == 0 {
                0
            } else {
                u32::MAX << (32 - u32::from(bits))
            };
            IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask))
        }
        IpAddr::V6(v6) => {
            let bits = v6_bits.min(128);
            let mask = if bits == 0 {
                0
            } else {
                u128::MAX << (128 - u32::from(bits))
            };
            IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_address_is_host_route() {
        let mask: Netmask = "192.0.2.7".parse().unwrap();
        assert_eq!(mask.prefix(), 32);
        assert!(mask.contains("192.0.2.7".parse().unwrap()));
        assert!(!mask.contains("192.0.2.8".parse().unwrap()));
    }

    #[test]
    fn test_group_most_specific_negation_wins() {
        let mut group = NetmaskGroup::new();
        group.add_mask("10.0.0.0/8").unwrap();
        group.add_mask("!10.1.0.0/16").unwrap();

        assert!(group.matches("10.2.3.4".parse().unwrap()));
        assert!(!group.matches("10.1.3.4".parse().unwrap()));
        assert!(!group.matches("192.0.2.1".parse().unwrap()));
    }

    #[test]
    fn test_group_ignores_declaration_order() {
        let mut group = NetmaskGroup::new();
        group.add_mask("!10.1.0.0/16").unwrap();
        group.add_mask("10.0.0.0/8").unwrap();

        assert!(!group.matches("10.1.3.4".parse().unwrap()));
        assert!(group.matches("10.2.3.4".parse().unwrap()));
    }

    #[test]
    fn test_invalid_mask_is_rejected() {
        let mut group = NetmaskGroup::new();
        assert!(group.add_mask("10.0.0.0/33").is_err());
        assert!(group.add_mask("not-an-ip").is_err());
        assert!(group.is_empty());
    }

    #[test]
    fn test_truncate_address() {
        let ip: IpAddr = "192.0.2.200".parse().unwrap();
        assert_eq!(
            truncate_address(ip, 24, 64),
            "192.0.2.0".parse::<IpAddr>().unwrap()
        );
        let ip6: IpAddr = "2001:db8:1:2:3:4:5:6".parse().unwrap();
        assert_eq!(
            truncate_address(ip6, 32, 48),
            "2001:db8:1::".parse::<IpAddr>().unwrap()
        );
    }
}
