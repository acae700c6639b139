#![allow(dead_code)]
use ferrous_proxy_domain::{DnsName, GlobalStats, QType, QueryView, RCode, SourceStats};
use std::net::IpAddr;

pub struct SourceStatsBuilder {
    stats: SourceStats,
}

impl SourceStatsBuilder {
    pub fn new() -> Self {
        Self {
            stats: SourceStats::default(),
        }
    }

    pub fn queries(mut self, queries: u64) -> Self {
        self.stats.queries = queries;
        self
    }

    pub fn responses(mut self, responses: u64) -> Self {
        self.stats.responses = responses;
        self
    }

    pub fn response_bytes(mut self, bytes: u64) -> Self {
        self.stats.response_bytes = bytes;
        self
    }

    pub fn cache_misses(mut self, misses: u64) -> Self {
        self.stats.cache_misses = misses;
        self
    }

    pub fn rcode(mut self, rcode: RCode, count: u64) -> Self {
        self.stats.rcodes.insert(rcode, count);
        self
    }

    pub fn qtype(mut self, qtype: QType, count: u64) -> Self {
        self.stats.qtypes.insert(qtype, count);
        self
    }

    pub fn build(self) -> SourceStats {
        self.stats
    }
}

pub fn global(cache_hits: u64, cache_misses: u64) -> GlobalStats {
    GlobalStats {
        cache_hits,
        cache_misses,
    }
}

pub fn name(s: &str) -> DnsName {
    s.parse().unwrap()
}

pub fn query<'a>(qname: &'a DnsName, source: &str) -> QueryView<'a> {
    QueryView {
        qname,
        qtype: QType::A,
        source: source.parse::<IpAddr>().unwrap(),
        destination: "192.0.2.53".parse().unwrap(),
        tags: &[],
    }
}
