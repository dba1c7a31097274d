#![no_main]

use cassandra_connector::{ConnectionConfig, Error};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    match ConnectionConfig::from_json(text) {
        Ok(config) => {
            let _ = format!("{:?}", config);
            let _ = config.is_cloud();
        }
        Err(e) => assert!(matches!(e, Error::ConfigurationMalformed(_))),
    }
});
