use std::net::IpAddr;
use std::sync::Arc;

use crate::dns_name::{DnsName, DnsNameSet, SuffixMatchNode};
use crate::dns_record::QType;
use crate::netmask::NetmaskGroup;
use crate::objects::{KeyValueStore, LookupKey};
use crate::script::ScriptFunction;

/// Handle of a selector inside a [`SelectorArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(u32);

impl SelectorId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Key-value store plus the key used to query it.
///
/// Either side may be unbound when the load ran in a mode that tolerates
/// missing references; an unbound lookup never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvsBinding {
    pub store_name: String,
    pub key_name: String,
    pub store: Option<Arc<KeyValueStore>>,
    pub key: Option<Arc<LookupKey>>,
}

impl KvsBinding {
    pub fn is_bound(&self) -> bool {
        self.store.is_some() && self.key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorNode {
    All,
    QName(DnsName),
    QNameSet(DnsNameSet),
    QNameSuffix {
        suffixes: SuffixMatchNode,
        quiet: bool,
    },
    QType(QType),
    Tag {
        tag: String,
        value: Option<String>,
    },
    Netmask {
        group: NetmaskGroup,
        use_source: bool,
        quiet: bool,
    },
    KvsLookup(KvsBinding),
    KvsRangeLookup(KvsBinding),
    Script(ScriptFunction),
    And(Vec<SelectorId>),
    Or(Vec<SelectorId>),
    Not(SelectorId),
}

impl SelectorNode {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::QName(_) => "qname",
            Self::QNameSet(_) => "qname-set",
            Self::QNameSuffix { .. } => "qname-suffix",
            Self::QType(_) => "qtype",
            Self::Tag { .. } => "tag",
            Self::Netmask { .. } => "netmask-group",
            Self::KvsLookup(_) => "kvs-lookup",
            Self::KvsRangeLookup(_) => "kvs-range-lookup",
            Self::Script(_) => "lua",
            Self::And(_) => "and",
            Self::Or(_) => "or",
            Self::Not(_) => "not",
        }
    }
}

/// What a selector is allowed to see of a query.
#[derive(Debug, Clone, Copy)]
pub struct QueryView<'a> {
    pub qname: &'a DnsName,
    pub qtype: QType,
    pub source: IpAddr,
    pub destination: IpAddr,
    pub tags: &'a [(&'a str, &'a str)],
}

impl QueryView<'_> {
    fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

/// Capabilities owned by the query engine that selectors delegate to.
pub trait MatchHost {
    fn call_selector(&self, function: &ScriptFunction, query: &QueryView<'_>) -> bool;

    fn kvs_lookup(&self, binding: &KvsBinding, query: &QueryView<'_>) -> bool;

    fn kvs_range_lookup(&self, binding: &KvsBinding, query: &QueryView<'_>) -> bool;
}

/// Owns every selector built during one load. Composites refer to their
/// children by handle, so a named selector can be nested any number of times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorArena {
    nodes: Vec<SelectorNode>,
}

impl SelectorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: SelectorNode) -> SelectorId {
        let id = SelectorId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: SelectorId) -> Option<&SelectorNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in creation order; children always come before their parents.
    pub fn iter(&self) -> impl Iterator<Item = (SelectorId, &SelectorNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (SelectorId(index as u32), node))
    }

    pub fn matches(
        &self,
        id: SelectorId,
        query: &QueryView<'_>,
        host: Option<&dyn MatchHost>,
    ) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        match node {
            SelectorNode::All => true,
            SelectorNode::QName(name) => query.qname == name,
            SelectorNode::QNameSet(names) => names.contains(query.qname),
            SelectorNode::QNameSuffix { suffixes, .. } => suffixes.check(query.qname),
            SelectorNode::QType(qtype) => query.qtype == *qtype,
            SelectorNode::Tag { tag, value } => match (query.tag(tag), value) {
                (Some(found), Some(expected)) => found == expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
            SelectorNode::Netmask {
                group, use_source, ..
            } => {
                let ip = if *use_source {
                    query.source
                } else {
                    query.destination
                };
                group.matches(ip)
            }
            SelectorNode::KvsLookup(binding) => {
                binding.is_bound() && host.is_some_and(|h| h.kvs_lookup(binding, query))
            }
            SelectorNode::KvsRangeLookup(binding) => {
                binding.is_bound() && host.is_some_and(|h| h.kvs_range_lookup(binding, query))
            }
            SelectorNode::Script(function) => {
                host.is_some_and(|h| h.call_selector(function, query))
            }
            SelectorNode::And(children) => children
                .iter()
                .all(|child| self.matches(*child, query, host)),
            SelectorNode::Or(children) => children
                .iter()
                .any(|child| self.matches(*child, query, host)),
            SelectorNode::Not(child) => !self.matches(*child, query, host),
        }
    }
}
