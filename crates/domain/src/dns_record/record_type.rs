use std::fmt;
use std::str::FromStr;

const QTYPE_NAMES: &[(&str, u16)] = &[
    ("A", 1),
    ("NS", 2),
    ("CNAME", 5),
    ("SOA", 6),
    ("NULL", 10),
    ("WKS", 11),
    ("PTR", 12),
    ("HINFO", 13),
    ("MX", 15),
    ("TXT", 16),
    ("AAAA", 28),
    ("SRV", 33),
    ("NAPTR", 35),
    ("DNAME", 39),
    ("OPT", 41),
    ("DS", 43),
    ("SSHFP", 44),
    ("IPSECKEY", 45),
    ("RRSIG", 46),
    ("NSEC", 47),
    ("DNSKEY", 48),
    ("NSEC3", 50),
    ("NSEC3PARAM", 51),
    ("TLSA", 52),
    ("CDS", 59),
    ("CDNSKEY", 60),
    ("OPENPGPKEY", 61),
    ("ZONEMD", 63),
    ("SVCB", 64),
    ("HTTPS", 65),
    ("IXFR", 251),
    ("AXFR", 252),
    ("ANY", 255),
    ("CAA", 257),
];

/// Query type, kept as its numeric code so unknown types survive a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QType(pub u16);

impl QType {
    pub const A: QType = QType(1);
    pub const AAAA: QType = QType(28);
    pub const ANY: QType = QType(255);
    pub const AXFR: QType = QType(252);
    pub const IXFR: QType = QType(251);

    pub fn code(&self) -> u16 {
        self.0
    }

    pub fn name(&self) -> Option<&'static str> {
        QTYPE_NAMES
            .iter()
            .find(|(_, code)| *code == self.0)
            .map(|(name, _)| *name)
    }
}

impl FromStr for QType {
    type Err = String;

    /// Accepts a mnemonic (`AAAA`), a numeric code (`28`) or the generic
    /// `TYPE28` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u16>() {
            return Ok(QType(code));
        }
        let upper = s.to_ascii_uppercase();
        if let Some(code) = upper.strip_prefix("TYPE").and_then(|n| n.parse::<u16>().ok()) {
            return Ok(QType(code));
        }
        QTYPE_NAMES
            .iter()
            .find(|(name, _)| *name == upper)
            .map(|(_, code)| QType(*code))
            .ok_or_else(|| format!("unknown query type '{}'", s))
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "TYPE{}", self.0),
        }
    }
}

/// Query class. Only IN, CH and ANY have mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QClass(pub u16);

impl QClass {
    pub const IN: QClass = QClass(1);
}

impl Default for QClass {
    fn default() -> Self {
        QClass::IN
    }
}

impl FromStr for QClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u16>() {
            return Ok(QClass(code));
        }
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(QClass(1)),
            "CH" | "CHAOS" => Ok(QClass(3)),
            "HS" => Ok(QClass(4)),
            "ANY" => Ok(QClass(255)),
            _ => Err(format!("unknown query class '{}'", s)),
        }
    }
}

const RCODE_NAMES: &[(&str, u8)] = &[
    ("NOERROR", 0),
    ("FORMERR", 1),
    ("SERVFAIL", 2),
    ("NXDOMAIN", 3),
    ("NOTIMP", 4),
    ("REFUSED", 5),
    ("YXDOMAIN", 6),
    ("YXRRSET", 7),
    ("NXRRSET", 8),
    ("NOTAUTH", 9),
    ("NOTZONE", 10),
];

/// Response code of a DNS answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RCode(pub u8);

impl RCode {
    pub const NOERROR: RCode = RCode(0);
    pub const SERVFAIL: RCode = RCode(2);
    pub const NXDOMAIN: RCode = RCode(3);
    pub const REFUSED: RCode = RCode(5);
}

impl FromStr for RCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Ok(RCode(code));
        }
        let upper = s.to_ascii_uppercase();
        RCODE_NAMES
            .iter()
            .find(|(name, _)| *name == upper)
            .map(|(_, code)| RCode(*code))
            .ok_or_else(|| format!("unknown response code '{}'", s))
    }
}

impl fmt::Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match RCODE_NAMES.iter().find(|(_, code)| *code == self.0) {
            Some((name, _)) => f.write_str(name),
            None => write!(f, "RCODE{}", self.0),
        }
    }
}
