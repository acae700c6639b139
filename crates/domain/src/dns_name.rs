use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

/// A case-normalised domain name without the trailing dot. The root is the
/// empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DnsName(CompactString);

impl DnsName {
    pub fn root() -> Self {
        Self(CompactString::default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.split('.').filter(|l| !l.is_empty())
    }

    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    pub fn is_part_of(&self, zone: &DnsName) -> bool {
        if zone.is_root() || self == zone {
            return true;
        }
        self.0.len() > zone.0.len()
            && self.0.ends_with(zone.as_str())
            && self.0.as_bytes()[self.0.len() - zone.0.len() - 1] == b'.'
    }
}

impl FromStr for DnsName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_suffix('.').unwrap_or(trimmed);
        if name.is_empty() {
            return Ok(Self::root());
        }
        if name.len() > MAX_NAME_LEN {
            return Err(format!("name '{}' is longer than {} bytes", s, MAX_NAME_LEN));
        }
        for label in name.split('.') {
            if label.is_empty() {
                return Err(format!("name '{}' contains an empty label", s));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(format!(
                    "label '{}' of '{}' is longer than {} bytes",
                    label, s, MAX_LABEL_LEN
                ));
            }
        }
        Ok(Self(CompactString::new(name.to_ascii_lowercase())))
    }
}

impl fmt::Display for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            write!(f, "{}.", self.0)
        }
    }
}

pub type DnsNameSet = BTreeSet<DnsName>;

#[derive(Debug, Clone, Default)]
struct SuffixNode {
    children: HashMap<CompactString, SuffixNode, FxBuildHasher>,
    terminal: bool,
}

/// Suffix set matching a name against every registered zone apex.
#[derive(Debug, Clone, Default)]
pub struct SuffixMatchNode {
    root: SuffixNode,
    suffixes: Vec<DnsName>,
}

impl SuffixMatchNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, suffix: DnsName) {
        let mut node = &mut self.root;
        for label in suffix.labels().rev() {
            node = node.children.entry(CompactString::new(label)).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.suffixes.push(suffix);
        }
    }

    pub fn check(&self, name: &DnsName) -> bool {
        if self.root.terminal {
            return true;
        }
        let labels: SmallVec<[&str; 8]> = name.labels().rev().collect();
        let mut node = &self.root;
        for label in labels {
            match node.children.get(label) {
                Some(child) => {
                    if child.terminal {
                        return true;
                    }
                    node = child;
                }
                None => return false,
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn suffixes(&self) -> &[DnsName] {
        &self.suffixes
    }
}

impl PartialEq for SuffixMatchNode {
    fn eq(&self, other: &Self) -> bool {
        self.suffixes == other.suffixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> DnsName {
        s.parse().unwrap()
    }

    #[test]
    fn test_name_is_normalised() {
        assert_eq!(name("WWW.Example.COM."), name("www.example.com"));
        assert_eq!(name("www.example.com").to_string(), "www.example.com.");
        assert!(name(".").is_root());
    }

    #[test]
    fn test_name_rejects_empty_label() {
        assert!("a..b".parse::<DnsName>().is_err());
        assert!(format!("{}.com", "x".repeat(64)).parse::<DnsName>().is_err());
    }

    #[test]
    fn test_is_part_of() {
        assert!(name("a.example.com").is_part_of(&name("example.com")));
        assert!(name("example.com").is_part_of(&name("example.com")));
        assert!(!name("badexample.com").is_part_of(&name("example.com")));
        assert!(name("anything").is_part_of(&DnsName::root()));
    }

    #[test]
    fn test_suffix_match_node() {
        let mut smn = SuffixMatchNode::new();
        smn.add(name("ads.example"));
        smn.add(name("tracker.net"));

        assert!(smn.check(&name("ads.example")));
        assert!(smn.check(&name("x.y.ads.example")));
        assert!(smn.check(&name("cdn.tracker.net")));
        assert!(!smn.check(&name("example")));
        assert!(!smn.check(&name("notads.example")));
        assert_eq!(smn.len(), 2);
    }

    #[test]
    fn test_root_suffix_matches_everything() {
        let mut smn = SuffixMatchNode::new();
        smn.add(DnsName::root());
        assert!(smn.check(&name("whatever.example")));
    }
}
