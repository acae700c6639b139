use ferrous_proxy_application::LoadMode;
use ferrous_proxy_domain::objects::{EbpfMapFormat, EbpfMapKind, LoadBalancingPolicy};
use ferrous_proxy_domain::{
    Action, DnsName, DomainError, QType, QueryView, ResponseAction, SelectorNode,
};
use std::net::IpAddr;

mod helpers;
use helpers::loader;

const POLICY_DOCUMENT: &str = r#"
[[netmask_groups]]
name = "internal"
netmasks = ["10.0.0.0/8"]

[[selectors]]
name = "ads"
type = "qname-suffix"
suffixes = ["ads.example"]

[[actions]]
name = "refuse"
type = "rcode"
rcode = "REFUSED"

[[query_rules]]
name = "block-ads"
selector = { type = "and", selectors = [
    { type = "by-name", selector_name = "ads" },
    { type = "not", selector = { type = "netmask-group", netmask_group_name = "internal" } },
] }
action = { type = "by-name", action_name = "refuse" }

[[query_rules]]
name = "pin"
uuid = "6a4f2b6c-6f0b-4b8e-9a64-0c5d8d1e2f3a"
priority = 10
selector = { type = "qname", qname = "pinned.example." }
action = { type = "pool", pool_name = "pinned" }

[[cache_miss_rules]]
selector = { type = "all" }
action = { type = "continue", action = { type = "set-tag", tag = "miss", value = "1" } }

[[response_rules]]
selector = { type = "qtype", qtype = "AAAA" }
action = { type = "limit-ttl", max = 300, types = ["AAAA"] }

[[xfr_response_rules]]
selector = { type = "all" }
action = { type = "drop" }
"#;

fn view<'a>(qname: &'a DnsName, source: &str) -> QueryView<'a> {
    QueryView {
        qname,
        qtype: QType::A,
        source: source.parse::<IpAddr>().unwrap(),
        destination: "192.0.2.53".parse::<IpAddr>().unwrap(),
        tags: &[],
    }
}

#[test]
fn test_load_builds_chains_in_declaration_order() {
    let generation = loader().execute(POLICY_DOCUMENT, LoadMode::Normal).unwrap();
    let chains = &generation.chains;

    assert_eq!(chains.query.len(), 2);
    assert_eq!(chains.cache_miss.len(), 1);
    assert_eq!(chains.response.len(), 1);
    assert_eq!(chains.xfr_response.len(), 1);
    assert!(chains.cache_hit_response.is_empty());
    assert_eq!(chains.total_rules(), 5);

    let rules = chains.query.rules();
    assert_eq!(rules[0].name, "block-ads");
    assert_eq!(rules[1].name, "pin");
    assert_eq!(rules[0].priority, 0);
    assert_eq!(rules[1].priority, 10);
    assert_eq!(
        rules[1].id.to_string(),
        "6a4f2b6c-6f0b-4b8e-9a64-0c5d8d1e2f3a"
    );
    assert!(!rules[0].id.is_nil());
    assert_eq!(*rules[0].action, Action::Rcode("REFUSED".parse().unwrap()));
}

#[test]
fn test_composite_selector_evaluates_children() {
    let generation = loader().execute(POLICY_DOCUMENT, LoadMode::Normal).unwrap();
    let selector = generation.chains.query.rules()[0].selector;
    let arena = &generation.selectors;

    let ad = "tracker.ads.example".parse::<DnsName>().unwrap();
    let other = "www.example".parse::<DnsName>().unwrap();

    assert!(arena.matches(selector, &view(&ad, "192.0.2.10"), None));
    assert!(!arena.matches(selector, &view(&ad, "10.1.2.3"), None));
    assert!(!arena.matches(selector, &view(&other, "192.0.2.10"), None));
}

#[test]
fn test_continue_and_response_actions() {
    let generation = loader().execute(POLICY_DOCUMENT, LoadMode::Normal).unwrap();
    match generation.chains.cache_miss.rules()[0].action.as_ref() {
        Action::Continue(inner) => assert_eq!(
            **inner,
            Action::SetTag {
                tag: "miss".to_string(),
                value: "1".to_string()
            }
        ),
        other => panic!("unexpected action {:?}", other),
    }
    match generation.chains.response.rules()[0].action.as_ref() {
        ResponseAction::LimitTtl { min, max, types } => {
            assert_eq!(*min, 0);
            assert_eq!(*max, 300);
            assert!(types.contains(&QType::AAAA));
        }
        other => panic!("unexpected action {:?}", other),
    }
}

#[test]
fn test_reloading_identical_input_is_deterministic() {
    let use_case = loader();
    let first = use_case.execute(POLICY_DOCUMENT, LoadMode::Normal).unwrap();
    let second = use_case.execute(POLICY_DOCUMENT, LoadMode::Normal).unwrap();

    let names = |g: &ferrous_proxy_application::ProxyGeneration| {
        g.chains
            .query
            .rules()
            .iter()
            .map(|r| (r.name.clone(), r.priority, r.selector, r.action.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
    assert_eq!(first.selectors, second.selectors);
    assert_eq!(first.chains.total_rules(), second.chains.total_rules());
    // explicit identities survive, generated ones differ
    assert_eq!(
        first.chains.query.rules()[1].id,
        second.chains.query.rules()[1].id
    );
    assert_ne!(
        first.chains.query.rules()[0].id,
        second.chains.query.rules()[0].id
    );
}

#[test]
fn test_duplicate_name_across_kinds_aborts_load() {
    let err = loader()
        .execute(
            r#"
            [[netmask_groups]]
            name = "shared"
            netmasks = ["10.0.0.0/8"]

            [[selectors]]
            name = "shared"
            type = "all"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert_eq!(err, DomainError::DuplicateName("shared".to_string()));
}

#[test]
fn test_builtin_policy_name_is_reserved() {
    let err = loader()
        .execute(
            r#"
            [[selectors]]
            name = "roundrobin"
            type = "all"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert_eq!(err, DomainError::DuplicateName("roundrobin".to_string()));
}

#[test]
fn test_unnamed_declarations_never_collide() {
    let generation = loader()
        .execute(
            r#"
            [[selectors]]
            type = "all"

            [[selectors]]
            type = "all"

            [[actions]]
            type = "drop"

            [[actions]]
            type = "drop"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert_eq!(generation.selectors.len(), 2);
}

#[test]
fn test_load_after_failure_starts_from_empty_registry() {
    let use_case = loader();
    let broken = r#"
        [[selectors]]
        name = "ads"
        type = "all"

        [[query_rules]]
        selector = { type = "by-name", selector_name = "missing" }
        action = { type = "drop" }
    "#;
    assert!(use_case.execute(broken, LoadMode::Normal).is_err());

    // "ads" must be free again
    let generation = use_case
        .execute(
            r#"
            [[selectors]]
            name = "ads"
            type = "all"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert_eq!(generation.selectors.len(), 1);
}

#[test]
fn test_missing_by_name_selector_is_unresolved_in_every_mode() {
    let document = r#"
        [[query_rules]]
        selector = { type = "by-name", selector_name = "nowhere" }
        action = { type = "drop" }
    "#;
    for mode in [LoadMode::Normal, LoadMode::ValidateOnly] {
        let err = loader().execute(document, mode).unwrap_err();
        assert!(matches!(
            err,
            DomainError::UnresolvedReference { kind: "selector", .. }
        ));
    }
}

#[test]
fn test_missing_netmask_group_tolerated_only_in_validate_mode() {
    let document = r#"
        [[selectors]]
        name = "inside"
        type = "netmask-group"
        netmask_group_name = "not-declared"
        netmasks = ["192.168.0.0/16"]
    "#;
    let err = loader().execute(document, LoadMode::Normal).unwrap_err();
    assert!(matches!(
        err,
        DomainError::UnresolvedReference {
            kind: "netmask group",
            ..
        }
    ));

    let generation = loader().execute(document, LoadMode::ValidateOnly).unwrap();
    match generation.selectors.iter().next() {
        Some((_, SelectorNode::Netmask { group, .. })) => assert_eq!(group.len(), 1),
        other => panic!("unexpected selector {:?}", other),
    };
}

#[test]
fn test_netmask_selector_does_not_alter_registered_group() {
    let generation = loader()
        .execute(
            r#"
            [[netmask_groups]]
            name = "internal"
            netmasks = ["10.0.0.0/8"]

            [[selectors]]
            name = "wide"
            type = "netmask-group"
            netmask_group_name = "internal"
            netmasks = ["172.16.0.0/12"]

            [[selectors]]
            name = "narrow"
            type = "netmask-group"
            netmask_group_name = "internal"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let sizes: Vec<usize> = generation
        .selectors
        .iter()
        .filter_map(|(_, node)| match node {
            SelectorNode::Netmask { group, .. } => Some(group.len()),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![2, 1]);
}

#[test]
fn test_scripted_selector_sources() {
    let generation = loader()
        .execute(
            r#"
            [[selectors]]
            name = "named"
            type = "lua"
            function_name = "is_internal"

            [[selectors]]
            name = "inline"
            type = "lua-ffi"
            function_code = "return function(dq) return true end"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert_eq!(generation.selectors.len(), 2);

    let err = loader()
        .execute(
            r#"
            [[selectors]]
            name = "empty"
            type = "lua"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    match err {
        DomainError::Validation { context, message } => {
            assert!(context.contains("empty"));
            assert!(message.contains("no function name, code or file"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_unknown_script_function_is_unresolved() {
    let err = loader()
        .execute(
            r#"
            [[actions]]
            type = "lua"
            function_name = "undefined_fn"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::UnresolvedReference { kind: "function", .. }
    ));
}

#[test]
fn test_script_file_that_cannot_be_read_is_io_error() {
    let err = loader()
        .execute(
            r#"
            [[selectors]]
            type = "lua"
            function_file = "/etc/ferrous-proxy/missing.lua"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Io { .. }));
}

#[test]
fn test_spoof_packet_shorter_than_header_is_rejected() {
    let err = loader()
        .execute(
            r#"
            [[actions]]
            name = "tiny"
            type = "spoof-packet"
            response = "0123456789"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(err.to_string().contains("tiny"));
}

#[test]
fn test_invalid_rule_uuid_aborts_load() {
    let err = loader()
        .execute(
            r#"
            [[query_rules]]
            name = "bad"
            uuid = "not-a-uuid"
            selector = { type = "all" }
            action = { type = "drop" }
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(err.to_string().contains("query_rules rule 'bad'"));
}

#[test]
fn test_duplicate_rule_uuid_is_accepted() {
    let generation = loader()
        .execute(
            r#"
            [[query_rules]]
            uuid = "6a4f2b6c-6f0b-4b8e-9a64-0c5d8d1e2f3a"
            selector = { type = "all" }
            action = { type = "drop" }

            [[query_rules]]
            uuid = "6a4f2b6c-6f0b-4b8e-9a64-0c5d8d1e2f3a"
            selector = { type = "all" }
            action = { type = "allow" }
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let rules = generation.chains.query.rules();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].id, rules[1].id);
}

#[test]
fn test_parse_error_is_reported() {
    let err = loader()
        .execute("binds = 12", LoadMode::Normal)
        .unwrap_err();
    assert!(matches!(err, DomainError::Parse(_)));
}

#[test]
fn test_client_mode_stops_after_console() {
    let generation = loader()
        .execute(
            r#"
            [console]
            listen_address = "127.0.0.1:5199"

            [[backends]]
            address = "192.0.2.1"

            [[query_rules]]
            selector = { type = "by-name", selector_name = "missing" }
            action = { type = "drop" }
            "#,
            LoadMode::Client,
        )
        .unwrap();
    assert_eq!(generation.mode, LoadMode::Client);
    assert!(generation.settings.console.is_some());
    assert!(generation.backends.is_empty());
    assert_eq!(generation.chains.total_rules(), 0);
}

#[test]
fn test_remote_logger_is_placeholder_when_validating() {
    let document = r#"
        [[remote_logging.protobuf_loggers]]
        name = "pb"
        address = "192.0.2.10:4242"

        [[actions]]
        name = "log"
        type = "remote-log"
        logger_name = "pb"
    "#;
    assert!(loader().execute(document, LoadMode::ValidateOnly).is_ok());
    assert!(loader().execute(document, LoadMode::Normal).is_ok());

    let missing_logger = r#"
        [[actions]]
        type = "remote-log"
        logger_name = "pb"
    "#;
    assert!(loader().execute(missing_logger, LoadMode::Normal).is_err());
    assert!(loader()
        .execute(missing_logger, LoadMode::ValidateOnly)
        .is_ok());
}

#[test]
fn test_pools_caches_and_policies() {
    let generation = loader()
        .execute(
            r#"
            [[packet_caches]]
            name = "main-cache"
            size = 1000
            cookie_hashing = true
            options_to_skip = ["8"]

            [load_balancing_policies]
            default_policy = "roundrobin"

            [[load_balancing_policies.custom_policies]]
            name = "custom"
            function_code = "return function(servers, dq) return 1 end"

            [[load_balancing_policies.custom_policies]]
            name = "threaded"
            ffi = true
            per_thread = true
            function_code = "return function(servers, dq) return 0 end"

            [[backends]]
            address = "192.0.2.1"
            pools = ["main"]

            [[backends]]
            address = "192.0.2.2"

            [[pools]]
            name = "main"
            packet_cache = "main-cache"
            policy = "custom"
            "#,
            LoadMode::Normal,
        )
        .unwrap();

    let cache = &generation.packet_caches["main-cache"];
    assert!(cache.settings.options_to_skip.contains(&8));
    assert!(!cache.settings.options_to_skip.contains(&10));

    assert_eq!(
        generation.default_policy.as_deref(),
        Some(&LoadBalancingPolicy::Builtin(
            ferrous_proxy_domain::objects::BuiltinPolicy::RoundRobin
        ))
    );

    let main = generation.pool("main").unwrap();
    assert_eq!(main.backends.len(), 1);
    assert_eq!(main.packet_cache.as_ref().unwrap().name, "main-cache");
    assert_eq!(main.policy.as_ref().unwrap().name(), "custom");
    assert_eq!(generation.pool("").unwrap().backends.len(), 1);
}

#[test]
fn test_packet_cache_skips_cookies_unless_hashed() {
    let generation = loader()
        .execute(
            r#"
            [[packet_caches]]
            name = "c"
            size = 10
            maximum_entry_size = 4
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let settings = &generation.packet_caches["c"].settings;
    assert!(settings.options_to_skip.contains(&10));
    assert_eq!(settings.maximum_entry_size, 4096);
}

#[test]
fn test_unsupported_key_value_store() {
    let err = helpers::loader_with_features(
        ferrous_proxy_application::ports::BuildFeatures::none(),
    )
    .execute(
        r#"
        [[key_value_stores.lmdb]]
        name = "kvs"
        file_name = "/var/lib/kvs.mdb"
        database_name = "db"
        "#,
        LoadMode::Normal,
    )
    .unwrap_err();
    assert!(matches!(err, DomainError::UnsupportedFeature(_)));
}

const EBPF: &str = r#"
    [ebpf]
    external = true
    ipv4 = { max_entries = 1024, pinned_path = "/sys/fs/bpf/proxy/v4" }
    ipv6 = { max_entries = 1024 }
    qnames = { max_entries = 256 }
    cidr_ipv6 = { max_entries = 64 }
"#;

#[test]
fn test_ebpf_filter_keeps_maps_with_entries() {
    let generation = loader().execute(EBPF, LoadMode::Normal).unwrap();
    let filter = generation.ebpf_filter.unwrap();
    assert_eq!(filter.format, EbpfMapFormat::WithActions);
    let kinds: Vec<_> = filter.maps.iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EbpfMapKind::Ipv4,
            EbpfMapKind::Ipv6,
            EbpfMapKind::QNames,
            EbpfMapKind::Cidr6
        ]
    );
    assert_eq!(
        filter.map(EbpfMapKind::Ipv4).unwrap().pinned_path,
        "/sys/fs/bpf/proxy/v4"
    );
    assert!(filter.map(EbpfMapKind::Cidr4).is_none());
}

#[test]
fn test_ebpf_filter_needs_address_and_qname_maps() {
    let generation = loader()
        .execute(
            r#"
            [ebpf]
            ipv4 = { max_entries = 1024 }
            ipv6 = { max_entries = 1024 }
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert!(generation.ebpf_filter.is_none());
}

#[test]
fn test_ebpf_filter_skipped_when_checking_and_gated_on_build() {
    let generation = loader().execute(EBPF, LoadMode::ValidateOnly).unwrap();
    assert!(generation.ebpf_filter.is_none());

    let err = helpers::loader_with_features(
        ferrous_proxy_application::ports::BuildFeatures::none(),
    )
    .execute(EBPF, LoadMode::Normal)
    .unwrap_err();
    assert!(matches!(err, DomainError::UnsupportedFeature(_)));
}

#[test]
fn test_kvs_selector_binds_store_and_key() {
    let generation = loader()
        .execute(
            r#"
            [[key_value_stores.cdb]]
            name = "kvs"
            file_name = "/var/lib/kvs.cdb"

            [[key_value_stores.lookup_keys.qname_keys]]
            name = "by-qname"

            [[selectors]]
            type = "kvs-lookup"
            kvs_name = "kvs"
            lookup_key_name = "by-qname"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    match generation.selectors.iter().next() {
        Some((_, SelectorNode::KvsLookup(binding))) => {
            assert!(binding.is_bound());
            assert_eq!(binding.store_name, "kvs");
        }
        other => panic!("unexpected selector {:?}", other),
    };
}

#[test]
fn test_dnstap_logger_transport_is_validated() {
    let err = loader()
        .execute(
            r#"
            [[remote_logging.dnstap_loggers]]
            name = "tap"
            transport = "carrier-pigeon"
            address = "/run/dnstap.sock"
            "#,
            LoadMode::Normal,
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let generation = loader()
        .execute(
            r#"
            [[remote_logging.dnstap_loggers]]
            name = "tap"
            transport = "unix"
            address = "/run/dnstap.sock"

            [[response_actions]]
            name = "tap-it"
            type = "dnstap-log"
            identity = "edge-1"
            logger_name = "tap"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    assert_eq!(generation.chains.total_rules(), 0);
}

#[test]
fn test_runtime_settings_sections() {
    let generation = loader()
        .execute(
            r#"
            acl = ["192.0.2.0/24"]

            [proxy_protocol]
            acl = ["10.0.0.0/8"]

            [webserver]
            listen_addresses = ["127.0.0.1:8083"]

            [[metrics.carbon]]
            address = "192.0.2.100"

            [query_count]
            enabled = true
            filter_function_name = "is_internal"

            [tuning.tcp]
            fast_open_key = "deadbeef-00000001-0000abcd-ffffffff"

            [general]
            capabilities_to_retain = ["CAP_BPF"]

            [dynamic_rules_settings]
            default_action = "Refused"
            "#,
            LoadMode::Normal,
        )
        .unwrap();
    let settings = &generation.settings;
    assert_eq!(settings.acl.len(), 1);
    assert_eq!(settings.proxy_protocol_acl.len(), 1);
    assert!(settings.webserver.is_some());
    assert_eq!(settings.carbon[0].address.port(), 2003);
    assert_eq!(settings.carbon[0].namespace, "ferrous-proxy");
    assert!(settings.query_count.as_ref().unwrap().filter.is_some());
    assert_eq!(settings.tcp_fast_open_key.unwrap()[0], 0xdeadbeef);
    assert_eq!(settings.capabilities_to_retain, vec!["CAP_BPF".to_string()]);
    assert_eq!(
        settings.dynamic_block_default_action,
        ferrous_proxy_domain::DnsActionKind::Refused
    );
}
