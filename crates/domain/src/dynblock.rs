use rustc_hash::FxHashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::action::DnsActionKind;
use crate::dns_name::{DnsName, SuffixMatchNode};
use crate::dns_record::{QType, RCode};
use crate::netmask::{truncate_address, NetmaskGroup};
use crate::script::ScriptFunction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicBlockKind {
    QueryRate,
    RCodeRate,
    RCodeRatio,
    QTypeRate,
    CacheMissRatio,
    ResponseByteRate,
    SuffixMatch,
    SuffixMatchFfi,
}

impl DynamicBlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryRate => "query-rate",
            Self::RCodeRate => "rcode-rate",
            Self::RCodeRatio => "rcode-ratio",
            Self::QTypeRate => "qtype-rate",
            Self::CacheMissRatio => "cache-miss-ratio",
            Self::ResponseByteRate => "response-byte-rate",
            Self::SuffixMatch => "suffix-match",
            Self::SuffixMatchFfi => "suffix-match-ffi",
        }
    }
}

impl FromStr for DynamicBlockKind {
    type Err = String;

    /// Names are matched exactly, `Query-Rate` is not a rule type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query-rate" => Ok(Self::QueryRate),
            "rcode-rate" => Ok(Self::RCodeRate),
            "rcode-ratio" => Ok(Self::RCodeRatio),
            "qtype-rate" => Ok(Self::QTypeRate),
            "cache-miss-ratio" => Ok(Self::CacheMissRatio),
            "response-byte-rate" => Ok(Self::ResponseByteRate),
            "suffix-match" => Ok(Self::SuffixMatch),
            "suffix-match-ffi" => Ok(Self::SuffixMatchFfi),
            other => Err(format!("unknown dynamic rule type '{}'", other)),
        }
    }
}

impl fmt::Display for DynamicBlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateThreshold {
    pub rate: u64,
    pub warning_rate: u64,
}

impl RateThreshold {
    fn evaluate(&self, observed: u64) -> BlockVerdict {
        if observed > self.rate {
            BlockVerdict::Block
        } else if self.warning_rate > 0 && observed > self.warning_rate {
            BlockVerdict::Warning
        } else {
            BlockVerdict::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioThreshold {
    pub ratio: f64,
    pub warning_ratio: f64,
    pub minimum_number_of_responses: u64,
}

impl RatioThreshold {
    // Below the minimum sample size neither threshold is armed.
    fn evaluate(&self, hits: u64, total: u64) -> BlockVerdict {
        if total == 0 || total < self.minimum_number_of_responses {
            return BlockVerdict::None;
        }
        let observed = hits as f64 / total as f64;
        if observed > self.ratio {
            BlockVerdict::Block
        } else if self.warning_ratio > 0.0 && observed > self.warning_ratio {
            BlockVerdict::Warning
        } else {
            BlockVerdict::None
        }
    }
}

/// Statistical detector of one rule, one shape per rule kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Detector {
    QueryRate(RateThreshold),
    RCodeRate {
        rcode: RCode,
        threshold: RateThreshold,
    },
    RCodeRatio {
        rcode: RCode,
        threshold: RatioThreshold,
    },
    QTypeRate {
        qtype: QType,
        threshold: RateThreshold,
    },
    CacheMissRatio {
        threshold: RatioThreshold,
        minimum_global_cache_hit_ratio: f64,
    },
    ResponseByteRate(RateThreshold),
    SuffixMatch {
        visitor: ScriptFunction,
        ffi: bool,
    },
}

impl Detector {
    pub fn kind(&self) -> DynamicBlockKind {
        match self {
            Self::QueryRate(_) => DynamicBlockKind::QueryRate,
            Self::RCodeRate { .. } => DynamicBlockKind::RCodeRate,
            Self::RCodeRatio { .. } => DynamicBlockKind::RCodeRatio,
            Self::QTypeRate { .. } => DynamicBlockKind::QTypeRate,
            Self::CacheMissRatio { .. } => DynamicBlockKind::CacheMissRatio,
            Self::ResponseByteRate(_) => DynamicBlockKind::ResponseByteRate,
            Self::SuffixMatch { ffi: false, .. } => DynamicBlockKind::SuffixMatch,
            Self::SuffixMatch { ffi: true, .. } => DynamicBlockKind::SuffixMatchFfi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSettings {
    pub tag_name: String,
    pub tag_value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicBlockRule {
    pub comment: String,
    pub seconds: u32,
    pub action_duration: u32,
    pub action: DnsActionKind,
    pub tag: Option<TagSettings>,
    pub detector: Detector,
}

impl DynamicBlockRule {
    pub fn kind(&self) -> DynamicBlockKind {
        self.detector.kind()
    }

    /// Evaluates one source's counters for the last `seconds` window.
    /// Suffix rules walk the name tree instead, see
    /// [`DynamicBlockGroup::evaluate_suffix`].
    pub fn evaluate(&self, source: &SourceStats, global: &GlobalStats) -> BlockVerdict {
        match &self.detector {
            Detector::QueryRate(threshold) => threshold.evaluate(source.queries),
            Detector::RCodeRate { rcode, threshold } => {
                threshold.evaluate(source.rcode_count(*rcode))
            }
            Detector::RCodeRatio { rcode, threshold } => {
                threshold.evaluate(source.rcode_count(*rcode), source.responses)
            }
            Detector::QTypeRate { qtype, threshold } => {
                threshold.evaluate(source.qtype_count(*qtype))
            }
            Detector::CacheMissRatio {
                threshold,
                minimum_global_cache_hit_ratio,
            } => match global.cache_hit_ratio() {
                Some(ratio) if ratio >= *minimum_global_cache_hit_ratio => {
                    threshold.evaluate(source.cache_misses, source.responses)
                }
                _ => BlockVerdict::None,
            },
            Detector::ResponseByteRate(threshold) => threshold.evaluate(source.response_bytes),
            Detector::SuffixMatch { .. } => BlockVerdict::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BlockVerdict {
    None,
    Warning,
    Block,
}

/// Counters of one aggregated source over a rule's window.
#[derive(Debug, Clone, Default)]
pub struct SourceStats {
    pub queries: u64,
    pub responses: u64,
    pub response_bytes: u64,
    pub cache_misses: u64,
    pub rcodes: FxHashMap<RCode, u64>,
    pub qtypes: FxHashMap<QType, u64>,
}

impl SourceStats {
    pub fn rcode_count(&self, rcode: RCode) -> u64 {
        self.rcodes.get(&rcode).copied().unwrap_or(0)
    }

    pub fn qtype_count(&self, qtype: QType) -> u64 {
        self.qtypes.get(&qtype).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl GlobalStats {
    pub fn cache_hit_ratio(&self) -> Option<f64> {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return None;
        }
        Some(self.cache_hits as f64 / total as f64)
    }
}

/// Decides whether a queried name, with its hit count, should be blocked.
pub trait SuffixVisitor {
    fn visit(&self, function: &ScriptFunction, name: &DnsName, hits: u64) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockDecision {
    pub rule_index: usize,
    pub verdict: BlockVerdict,
    pub action: DnsActionKind,
    pub duration: u32,
    pub tag: Option<TagSettings>,
}

/// Rules sharing address granularity and exclusion lists.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicBlockGroup {
    pub v4_mask: u8,
    pub v6_mask: u8,
    pub port_mask: u8,
    pub exclude_ranges: NetmaskGroup,
    pub include_ranges: NetmaskGroup,
    pub excluded_domains: SuffixMatchNode,
    pub rules: Vec<DynamicBlockRule>,
}

impl Default for DynamicBlockGroup {
    fn default() -> Self {
        Self {
            v4_mask: 32,
            v6_mask: 128,
            port_mask: 0,
            exclude_ranges: NetmaskGroup::new(),
            include_ranges: NetmaskGroup::new(),
            excluded_domains: SuffixMatchNode::new(),
            rules: Vec::new(),
        }
    }
}

impl DynamicBlockGroup {
    /// `include_ranges` punches holes into `exclude_ranges`.
    pub fn is_excluded(&self, ip: IpAddr) -> bool {
        self.exclude_ranges.matches(ip) && !self.include_ranges.matches(ip)
    }

    /// Key under which a source's counters are aggregated.
    pub fn aggregation_key(&self, source: SocketAddr) -> (IpAddr, u16) {
        let ip = truncate_address(source.ip(), self.v4_mask, self.v6_mask);
        let port = match self.port_mask {
            0 => 0,
            bits if bits >= 16 => source.port(),
            bits => source.port() & (u16::MAX << (16 - u16::from(bits))),
        };
        (ip, port)
    }

    /// Strongest verdict among the statistical rules; ties keep the first rule.
    pub fn evaluate(
        &self,
        source: IpAddr,
        stats: &SourceStats,
        global: &GlobalStats,
    ) -> Option<BlockDecision> {
        if self.is_excluded(source) {
            return None;
        }
        let mut best: Option<BlockDecision> = None;
        for (index, rule) in self.rules.iter().enumerate() {
            let verdict = rule.evaluate(stats, global);
            if verdict == BlockVerdict::None {
                continue;
            }
            let stronger = match &best {
                Some(current) => verdict > current.verdict,
                None => true,
            };
            if stronger {
                best = Some(BlockDecision {
                    rule_index: index,
                    verdict,
                    action: rule.action,
                    duration: rule.action_duration,
                    tag: rule.tag.clone(),
                });
            }
        }
        best
    }

    /// Runs the suffix rules' visitors for one queried name.
    pub fn evaluate_suffix(
        &self,
        name: &DnsName,
        hits: u64,
        visitor: &dyn SuffixVisitor,
    ) -> Option<BlockDecision> {
        if self.excluded_domains.check(name) {
            return None;
        }
        self.rules
            .iter()
            .enumerate()
            .find_map(|(index, rule)| match &rule.detector {
                Detector::SuffixMatch { visitor: function, .. }
                    if visitor.visit(function, name, hits) =>
                {
                    Some(BlockDecision {
                        rule_index: index,
                        verdict: BlockVerdict::Block,
                        action: rule.action,
                        duration: rule.action_duration,
                        tag: rule.tag.clone(),
                    })
                }
                _ => None,
            })
    }
}
