/// Optional subsystems compiled into this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildFeatures {
    pub doh_nghttp2: bool,
    pub doh_h2o: bool,
    pub doh3: bool,
    pub doq: bool,
    pub dnscrypt: bool,
    pub dnstap: bool,
    pub protobuf: bool,
    pub lmdb: bool,
    pub cdb: bool,
    pub xsk: bool,
    pub ebpf: bool,
}

impl BuildFeatures {
    pub fn all() -> Self {
        Self {
            doh_nghttp2: true,
            doh_h2o: true,
            doh3: true,
            doq: true,
            dnscrypt: true,
            dnstap: true,
            protobuf: true,
            lmdb: true,
            cdb: true,
            xsk: true,
            ebpf: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}
