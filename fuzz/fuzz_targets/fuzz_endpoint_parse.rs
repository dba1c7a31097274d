#![no_main]

use cassandra_connector::bundle::parse_endpoint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|endpoint: &str| {
    if let Ok(target) = parse_endpoint(endpoint) {
        if let Some(region) = &target.region {
            assert!(!region.is_empty());
        }
        let name = target.file_name();
        assert!(name.starts_with("astra-secure-connect-"));
        assert!(name.ends_with(".zip"));
    }
});
