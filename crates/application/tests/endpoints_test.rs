use ferrous_proxy_application::ports::BuildFeatures;
use ferrous_proxy_application::LoadMode;
use ferrous_proxy_domain::listener::CongestionControl;
use ferrous_proxy_domain::{
    Availability, DnsProtocol, DomainError, LazyHealthCheckMode, ListenerExtension, Transport,
};

mod helpers;
use helpers::{loader, loader_with_features};

fn backend_port(protocol: &str) -> u16 {
    let document = format!(
        r#"
        [[backends]]
        address = "192.0.2.1"
        protocol = "{}"
        "#,
        protocol
    );
    let generation = loader().execute(&document, LoadMode::Normal).unwrap();
    generation.backends[0].address.port()
}

#[test]
fn test_backend_default_ports_follow_protocol() {
    assert_eq!(backend_port("dot"), 853);
    assert_eq!(backend_port("DoH"), 443);
    assert_eq!(backend_port("do53"), 53);
    assert_eq!(backend_port("doq"), 853);
}

#[test]
fn test_backend_explicit_port_and_fields() {
    let generation = loader()
        .execute(
            r#"
            [[backends]]
            address = "[2001:db8::1]:5300"
            id = "0b9a4c7e-1b1e-4d6a-8f44-3e2d1c0b9a87"
            name = "primary"
            queries_per_second = 500
            order = 2
            weight = 10
            cpus = "0 2"
            pools = ["edge", "core"]
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let backend = &generation.backends[0];
    assert_eq!(backend.address.port(), 5300);
    assert_eq!(backend.id.to_string(), "0b9a4c7e-1b1e-4d6a-8f44-3e2d1c0b9a87");
    assert_eq!(backend.qps, Some(500));
    assert_eq!(backend.order, 2);
    assert_eq!(backend.weight, 10);
    assert_eq!(backend.cpus, vec![0, 2]);
    assert!(backend.tls.is_none());
    assert!(backend.activate);
    assert_eq!(generation.pool("edge").unwrap().backends, vec![backend.id]);
    assert_eq!(generation.pool("core").unwrap().backends, vec![backend.id]);
    assert!(generation.pool("").is_none());
}

#[test]
fn test_unknown_backend_protocol_falls_back_to_do53() {
    let generation = loader()
        .execute(
            r#"
            [[backends]]
            address = "192.0.2.1"
            protocol = "carrier-pigeon"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert_eq!(generation.backends[0].protocol, DnsProtocol::Do53);
    assert_eq!(generation.backends[0].address.port(), 53);
}

#[test]
fn test_backend_with_invalid_tls_fails_the_load() {
    let err = loader()
        .execute(
            r#"
            [[backends]]
            address = "192.0.2.1"
            protocol = "dot"
            tls = { ca_store = "/etc/ssl/broken.pem", subject_name = "dns.example" }

            [[backends]]
            address = "192.0.2.2"
            protocol = "dot"
            tls = { subject_name = "dns.example" }
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(err.to_string().contains("backend '192.0.2.1'"));
    assert!(err.to_string().contains("broken.pem"));
}

#[test]
fn test_backend_with_invalid_tls_skipped_when_errors_ignored() {
    let generation = loader()
        .execute(
            r#"
            [[backends]]
            address = "192.0.2.1"
            protocol = "dot"
            tls = { ca_store = "/etc/ssl/broken.pem", subject_name = "dns.example", ignore_configuration_errors = true }

            [[backends]]
            address = "192.0.2.2"
            protocol = "dot"
            tls = { subject_name = "dns.example" }
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert_eq!(generation.backends.len(), 1);
    assert_eq!(generation.backends[0].address.ip().to_string(), "192.0.2.2");
    let tls = generation.backends[0].tls.as_ref().unwrap();
    assert_eq!(tls.verification_name().as_deref(), Some("dns.example"));
}

#[test]
fn test_backend_attaches_declared_xsk_map() {
    let generation = loader()
        .execute(
            r#"
            [[xsk]]
            name = "xdp0"
            interface = "eth0"

            [[backends]]
            address = "192.0.2.1"
            xsk = "xdp0"

            [[backends]]
            address = "192.0.2.2"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert_eq!(generation.backends[0].xsk_map.as_deref(), Some("xdp0"));
    assert!(generation.backends[1].xsk_map.is_none());
}

#[test]
fn test_backend_with_unknown_xsk_map() {
    let document = r#"
        [[backends]]
        address = "192.0.2.1"
        xsk = "xdp9"
        "#;
    let err = loader().execute(document, LoadMode::Normal).unwrap_err();
    assert!(matches!(err, DomainError::UnresolvedReference { .. }));
    assert!(err.to_string().contains("xdp9"));

    let generation = loader()
        .execute(document, LoadMode::ValidateOnly)
        .unwrap();
    assert!(generation.backends[0].xsk_map.is_none());
}

#[test]
fn test_lazy_health_check_modes() {
    let lazy_mode = |mode: &str, lazy: &str| {
        let document = format!(
            r#"
            [[backends]]
            address = "192.0.2.1"
            health_checks = {{ mode = "{}", lazy = {{ mode = "{}", sample_size = 50, use_exponential_back_off = true }} }}
            "#,
            mode, lazy
        );
        let generation = loader().execute(&document, LoadMode::Normal).unwrap();
        generation.backends[0].health_check.clone()
    };

    let lazy = lazy_mode("lazy", "TimeoutOnly");
    assert_eq!(lazy.availability, Availability::Lazy);
    assert_eq!(lazy.lazy.mode, LazyHealthCheckMode::TimeoutOnly);
    assert_eq!(lazy.lazy.sample_size, 50);
    assert!(lazy.lazy.use_exponential_back_off);

    assert_eq!(
        lazy_mode("lazy", "").lazy.mode,
        LazyHealthCheckMode::TimeoutOrServFail
    );
    assert_eq!(
        lazy_mode("lazy", "whenever").lazy.mode,
        LazyHealthCheckMode::TimeoutOrServFail
    );
    assert_eq!(
        lazy_mode("auto", "TimeoutOnly").lazy.mode,
        LazyHealthCheckMode::Disabled
    );
}

#[test]
fn test_health_check_function_and_bad_mode() {
    let generation = loader()
        .execute(
            r#"
            [[backends]]
            address = "192.0.2.1"
            health_checks = { function = "healthy", qname = "probe.example.", qtype = "TXT", use_tcp = true }
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let check = &generation.backends[0].health_check;
    assert!(check.function.is_some());
    assert_eq!(check.qname.as_str(), "probe.example");
    assert!(check.use_tcp);

    let err = loader()
        .execute(
            r#"
            [[backends]]
            address = "192.0.2.1"
            health_checks = { mode = "sometimes" }
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn test_auto_upgrade_only_for_plain_backends() {
    let document = |protocol: &str| {
        format!(
            r#"
            [[backends]]
            address = "192.0.2.1"
            protocol = "{}"
            auto_upgrade = {{ enabled = true, pool = "upgraded" }}
            "#,
            protocol
        )
    };
    let plain = loader().execute(&document("do53"), LoadMode::Normal).unwrap();
    assert_eq!(
        plain.backends[0].auto_upgrade.as_ref().unwrap().pool,
        "upgraded"
    );
    let encrypted = loader().execute(&document("dot"), LoadMode::Normal).unwrap();
    assert!(encrypted.backends[0].auto_upgrade.is_none());
}

#[test]
fn test_validate_only_marks_endpoints_inactive() {
    let generation = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "127.0.0.1"

            [[backends]]
            address = "192.0.2.1"
            "#,
            LoadMode::ValidateOnly,
        )
        .unwrap();
    assert!(generation.frontends.iter().all(|f| !f.activate));
    assert!(generation.backends.iter().all(|b| !b.activate));
}

#[test]
fn test_do53_bind_gets_udp_and_tcp_per_thread() {
    let generation = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "127.0.0.1"
            threads = 2
            cpus = "1 3"
            additional_addresses = ["127.0.0.2", "garbage"]
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let frontends = &generation.frontends;
    assert_eq!(frontends.len(), 4);
    assert!(frontends.iter().all(|f| f.address.port() == 53));
    assert_eq!(
        frontends
            .iter()
            .filter(|f| f.transport == Transport::Udp)
            .count(),
        2
    );
    assert_eq!(frontends[0].cpus.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(frontends[0].additional_addresses.len(), 1);
    assert_eq!(frontends[0].additional_addresses[0].port(), 53);
}

#[test]
fn test_unknown_bind_protocol_is_fatal() {
    let err = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "127.0.0.1"
            protocol = "smoke-signals"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn test_bind_with_bad_cpu_list_is_rejected() {
    let err = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "127.0.0.1"
            cpus = "0 x"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(err.to_string().contains("invalid CPU index 'x'"));
}

#[test]
fn test_dot_bind_defaults_to_853_with_tls() {
    let generation = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "0.0.0.0"
            protocol = "DoT"
            tls = { certificates = [{ certificate = "/etc/tls/cert.pem", key = "/etc/tls/key.pem" }] }
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let listener = &generation.frontends[0];
    assert_eq!(generation.frontends.len(), 1);
    assert_eq!(listener.address.port(), 853);
    assert_eq!(listener.transport, Transport::Tcp);
    assert_eq!(listener.tls.as_ref().unwrap().minimum_version, "tls1.2");
}

#[test]
fn test_bind_tls_checked_only_when_errors_ignored() {
    let document = |ignore: bool| {
        format!(
            r#"
            [[binds]]
            listen_address = "0.0.0.0"
            protocol = "dot"
            tls = {{ ignore_configuration_errors = {}, certificates = [{{ certificate = "/etc/tls/broken.pem", key = "/etc/tls/key.pem" }}] }}

            [[binds]]
            listen_address = "127.0.0.1"
            "#,
            ignore
        )
    };

    for mode in [LoadMode::Normal, LoadMode::ValidateOnly] {
        let generation = loader().execute(&document(true), mode).unwrap();
        assert!(generation
            .frontends
            .iter()
            .all(|f| f.protocol == DnsProtocol::Do53));

        let generation = loader().execute(&document(false), mode).unwrap();
        let dot = generation
            .frontends
            .iter()
            .find(|f| f.protocol == DnsProtocol::DoT)
            .unwrap();
        assert_eq!(
            dot.tls.as_ref().unwrap().certificates[0].certificate,
            "/etc/tls/broken.pem"
        );
    }
}

#[test]
fn test_tls_bind_without_certificates() {
    let document = |ignore: bool| {
        format!(
            r#"
            [[binds]]
            listen_address = "0.0.0.0"
            protocol = "doq"
            tls = {{ ignore_configuration_errors = {} }}
            "#,
            ignore
        )
    };
    let generation = loader()
        .execute(&document(false), LoadMode::Normal)
        .unwrap();
    assert_eq!(generation.frontends.len(), 1);
    assert!(generation.frontends[0].tls.as_ref().unwrap().certificates.is_empty());

    let generation = loader().execute(&document(true), LoadMode::Normal).unwrap();
    assert!(generation.frontends.is_empty());
}

#[test]
fn test_doh_without_certificates_is_plain_http_on_port_80() {
    let generation = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "127.0.0.1"
            protocol = "doh"
            doh = { paths = ["/dns-query", "/resolve"], custom_response_headers = [{ key = "X-Server", value = "edge" }] }
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let listener = &generation.frontends[0];
    assert_eq!(listener.address.port(), 80);
    assert!(listener.tls.is_none());
    match &listener.extension {
        ListenerExtension::Doh(doh) => {
            assert!(doh.plain_http);
            assert_eq!(doh.paths.len(), 2);
            assert_eq!(doh.custom_response_headers[0].0, "X-Server");
        }
        other => panic!("unexpected extension {:?}", other),
    }
}

#[test]
fn test_doh_engine_must_be_compiled_in() {
    let document = r#"
        [[binds]]
        listen_address = "127.0.0.1"
        protocol = "doh"
        doh = { provider = "h2o" }
    "#;
    let features = BuildFeatures {
        doh_nghttp2: true,
        ..BuildFeatures::none()
    };
    let err = loader_with_features(features)
        .execute(document, LoadMode::Normal)
        .unwrap_err();
    assert!(matches!(err, DomainError::UnsupportedFeature(_)));

    let err = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "127.0.0.1"
            protocol = "doh"
            doh = { provider = "apache" }
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn test_quic_binds_use_congestion_control() {
    let generation = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "0.0.0.0"
            protocol = "doq"
            threads = 2
            quic = { congestion_control = "bbr" }
            tls = { certificates = [{ certificate = "/etc/tls/cert.pem", key = "/etc/tls/key.pem" }] }

            [[binds]]
            listen_address = "0.0.0.0"
            protocol = "doh3"
            quic = { congestion_control = "vegas" }
            tls = { certificates = [{ certificate = "/etc/tls/cert.pem", key = "/etc/tls/key.pem" }] }
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let frontends = &generation.frontends;
    assert_eq!(frontends.len(), 3);
    assert!(frontends.iter().all(|f| f.transport == Transport::Quic));
    match &frontends[0].extension {
        ListenerExtension::Doq(quic) => {
            assert_eq!(quic.congestion_control, CongestionControl::Bbr)
        }
        other => panic!("unexpected extension {:?}", other),
    }
    assert_eq!(frontends[2].address.port(), 443);
    match &frontends[2].extension {
        ListenerExtension::Doh3 { quic, .. } => {
            assert_eq!(quic.congestion_control, CongestionControl::Reno)
        }
        other => panic!("unexpected extension {:?}", other),
    }
}

#[test]
fn test_xsk_map_queue_count_must_match_threads() {
    let document = |threads: u32| {
        format!(
            r#"
            [[xsk]]
            name = "xdp0"
            interface = "eth0"
            queues = 2

            [[binds]]
            listen_address = "192.0.2.53"
            threads = {}
            xsk = "xdp0"
            "#,
            threads
        )
    };
    let generation = loader().execute(&document(2), LoadMode::Normal).unwrap();
    assert_eq!(generation.frontends[0].xsk_map.as_deref(), Some("xdp0"));
    assert_eq!(generation.xsk_maps.len(), 1);

    let err = loader().execute(&document(4), LoadMode::Normal).unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn test_dnscrypt_requires_provider_name() {
    let err = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "127.0.0.1:8443"
            protocol = "dnscrypt"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(err.to_string().contains("provider name"));

    let generation = loader()
        .execute(
            r#"
            [[binds]]
            listen_address = "127.0.0.1:8443"
            protocol = "dnscrypt"
            dnscrypt = { provider_name = "2.dnscrypt-cert.example", certificates = [{ certificate = "/etc/dnscrypt/1.cert", key = "/etc/dnscrypt/1.key" }] }
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert_eq!(generation.frontends.len(), 2);
}
