use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Wire protocol spoken by a listener or an upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsProtocol {
    Do53,
    DoT,
    DoH,
    DoH3,
    DoQ,
    DnsCrypt,
}

impl DnsProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            DnsProtocol::Do53 => "do53",
            DnsProtocol::DoT => "dot",
            DnsProtocol::DoH => "doh",
            DnsProtocol::DoH3 => "doh3",
            DnsProtocol::DoQ => "doq",
            DnsProtocol::DnsCrypt => "dnscrypt",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DnsProtocol::Do53 | DnsProtocol::DnsCrypt => 53,
            DnsProtocol::DoT | DnsProtocol::DoQ => 853,
            DnsProtocol::DoH | DnsProtocol::DoH3 => 443,
        }
    }

    pub fn requires_tls(&self) -> bool {
        matches!(
            self,
            DnsProtocol::DoT | DnsProtocol::DoH | DnsProtocol::DoH3 | DnsProtocol::DoQ
        )
    }

    /// QUIC-based protocols do not get a TCP listener.
    pub fn is_quic(&self) -> bool {
        matches!(self, DnsProtocol::DoQ | DnsProtocol::DoH3)
    }

    /// Plain and DNSCrypt listeners are duplicated over UDP.
    pub fn has_udp_listener(&self) -> bool {
        matches!(self, DnsProtocol::Do53 | DnsProtocol::DnsCrypt)
    }
}

impl FromStr for DnsProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "do53" => Ok(DnsProtocol::Do53),
            "dot" => Ok(DnsProtocol::DoT),
            "doh" => Ok(DnsProtocol::DoH),
            "doh3" => Ok(DnsProtocol::DoH3),
            "doq" => Ok(DnsProtocol::DoQ),
            "dnscrypt" => Ok(DnsProtocol::DnsCrypt),
            other => Err(format!(
                "unknown protocol '{}'. Expected: do53, dot, doh, doh3, doq or dnscrypt",
                other
            )),
        }
    }
}

impl fmt::Display for DnsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn split_host_port(s: &str) -> Option<(&str, Option<&str>)> {
    if let Some(rest) = s.strip_prefix('[') {
        let end = rest.find(']')?;
        let host = &rest[..end];
        let tail = &rest[end + 1..];
        if tail.is_empty() {
            return Some((host, None));
        }
        return Some((host, Some(tail.strip_prefix(':')?)));
    }
    // a bare IPv6 address has several colons and no port
    if s.matches(':').count() > 1 {
        return Some((s, None));
    }
    match s.rsplit_once(':') {
        Some((host, port)) => Some((host, Some(port))),
        None => Some((s, None)),
    }
}

/// Parses `addr`, `addr:port`, `[v6]:port` or a bare IPv6 address, filling in
/// `default_port` when none is given.
pub fn parse_socket_addr(s: &str, default_port: u16) -> Result<SocketAddr, String> {
    let trimmed = s.trim();
    if let Ok(addr) = trimmed.parse::<SocketAddr>() {
        return Ok(addr);
    }
    let (host, port) =
        split_host_port(trimmed).ok_or_else(|| format!("invalid address '{}'", s))?;
    let ip = host
        .parse::<IpAddr>()
        .map_err(|_| format!("invalid address '{}'", s))?;
    let port = match port {
        Some(p) => p
            .parse::<u16>()
            .map_err(|e| format!("invalid port in address '{}': {}", s, e))?,
        None => default_port,
    };
    Ok(SocketAddr::new(ip, port))
}
