use ferrous_proxy_application::ports::BuildFeatures;

/// Optional subsystems enabled through this crate's cargo features.
pub fn compiled_features() -> BuildFeatures {
    BuildFeatures {
        doh_nghttp2: cfg!(feature = "doh-nghttp2"),
        doh_h2o: cfg!(feature = "doh-h2o"),
        doh3: cfg!(feature = "doh3"),
        doq: cfg!(feature = "doq"),
        dnscrypt: cfg!(feature = "dnscrypt"),
        dnstap: cfg!(feature = "dnstap"),
        protobuf: cfg!(feature = "protobuf"),
        lmdb: cfg!(feature = "lmdb"),
        cdb: cfg!(feature = "cdb"),
        xsk: cfg!(feature = "xsk"),
        ebpf: cfg!(feature = "ebpf"),
    }
}
