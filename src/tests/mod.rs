use crate::config::ProxyConfig;
use crate::domain::ListOrder;
use std::time::Duration;

mod integration_wikijs_client;

// a config pointing at `wikijs_url`, with a key the fakes can check for
pub fn test_config(wikijs_url: &str) -> ProxyConfig {
    ProxyConfig {
        wikijs_url: wikijs_url.to_string(),
        api_key: "test-key".to_string(),
        request_timeout: Duration::from_secs(5),
        default_locale: "en".to_string(),
        list_order: ListOrder::Title,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    }
}
