use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::action::{Action, ResponseAction};
use crate::selector::SelectorId;

/// Processing stage a rule list is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainKind {
    Query,
    CacheMiss,
    Response,
    CacheHitResponse,
    CacheInsertedResponse,
    SelfAnsweredResponse,
    XfrResponse,
}

impl ChainKind {
    pub const QUERY_CHAINS: [ChainKind; 2] = [ChainKind::Query, ChainKind::CacheMiss];

    pub const RESPONSE_CHAINS: [ChainKind; 5] = [
        ChainKind::Response,
        ChainKind::CacheHitResponse,
        ChainKind::CacheInsertedResponse,
        ChainKind::SelfAnsweredResponse,
        ChainKind::XfrResponse,
    ];

    /// Name of the configuration list feeding this chain.
    pub fn section(&self) -> &'static str {
        match self {
            Self::Query => "query_rules",
            Self::CacheMiss => "cache_miss_rules",
            Self::Response => "response_rules",
            Self::CacheHitResponse => "cache_hit_response_rules",
            Self::CacheInsertedResponse => "cache_inserted_response_rules",
            Self::SelfAnsweredResponse => "self_answered_response_rules",
            Self::XfrResponse => "xfr_response_rules",
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule<A> {
    pub id: Uuid,
    pub name: String,
    pub priority: u64,
    pub selector: SelectorId,
    pub action: Arc<A>,
}

/// Rules in declaration order. Priority is carried but never used to sort.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleChain<A> {
    kind: ChainKind,
    rules: Vec<Rule<A>>,
}

impl<A> RuleChain<A> {
    pub fn new(kind: ChainKind) -> Self {
        Self {
            kind,
            rules: Vec::new(),
        }
    }

    pub fn kind(&self) -> ChainKind {
        self.kind
    }

    pub fn push(&mut self, rule: Rule<A>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule<A>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains_id(&self, id: &Uuid) -> bool {
        self.rules.iter().any(|rule| rule.id == *id)
    }
}

/// Every chain of one configuration generation.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleChains {
    pub query: RuleChain<Action>,
    pub cache_miss: RuleChain<Action>,
    pub response: RuleChain<ResponseAction>,
    pub cache_hit_response: RuleChain<ResponseAction>,
    pub cache_inserted_response: RuleChain<ResponseAction>,
    pub self_answered_response: RuleChain<ResponseAction>,
    pub xfr_response: RuleChain<ResponseAction>,
}

impl Default for RuleChains {
    fn default() -> Self {
        Self {
            query: RuleChain::new(ChainKind::Query),
            cache_miss: RuleChain::new(ChainKind::CacheMiss),
            response: RuleChain::new(ChainKind::Response),
            cache_hit_response: RuleChain::new(ChainKind::CacheHitResponse),
            cache_inserted_response: RuleChain::new(ChainKind::CacheInsertedResponse),
            self_answered_response: RuleChain::new(ChainKind::SelfAnsweredResponse),
            xfr_response: RuleChain::new(ChainKind::XfrResponse),
        }
    }
}

impl RuleChains {
    pub fn query_chain(&self, kind: ChainKind) -> Option<&RuleChain<Action>> {
        match kind {
            ChainKind::Query => Some(&self.query),
            ChainKind::CacheMiss => Some(&self.cache_miss),
            _ => None,
        }
    }

    pub fn response_chain(&self, kind: ChainKind) -> Option<&RuleChain<ResponseAction>> {
        match kind {
            ChainKind::Response => Some(&self.response),
            ChainKind::CacheHitResponse => Some(&self.cache_hit_response),
            ChainKind::CacheInsertedResponse => Some(&self.cache_inserted_response),
            ChainKind::SelfAnsweredResponse => Some(&self.self_answered_response),
            ChainKind::XfrResponse => Some(&self.xfr_response),
            _ => None,
        }
    }

    pub fn total_rules(&self) -> usize {
        self.query.len()
            + self.cache_miss.len()
            + self.response.len()
            + self.cache_hit_response.len()
            + self.cache_inserted_response.len()
            + self.self_answered_response.len()
            + self.xfr_response.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{SelectorArena, SelectorNode};

    #[test]
    fn test_chain_keeps_insertion_order_regardless_of_priority() {
        let mut arena = SelectorArena::new();
        let all = arena.push(SelectorNode::All);
        let mut chain = RuleChain::new(ChainKind::Query);
        for (name, priority) in [("late", 10), ("early", 0)] {
            chain.push(Rule {
                id: Uuid::new_v4(),
                name: name.to_string(),
                priority,
                selector: all,
                action: Arc::new(Action::Drop),
            });
        }
        let names: Vec<&str> = chain.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["late", "early"]);
    }

    #[test]
    fn test_chain_lookup_by_kind() {
        let chains = RuleChains::default();
        assert!(chains.query_chain(ChainKind::CacheMiss).is_some());
        assert!(chains.query_chain(ChainKind::Response).is_none());
        for kind in ChainKind::RESPONSE_CHAINS {
            assert_eq!(chains.response_chain(kind).map(|c| c.kind()), Some(kind));
        }
    }
}
