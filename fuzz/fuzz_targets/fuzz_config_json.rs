//! Fuzz target: `SystemConfig::from_json`
//!
//! Any config that parses must also pass `validate()` and be safe to hand
//! to the controllers.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use moodrelay::app::service::AppService;
use moodrelay::config::SystemConfig;
use moodrelay::time::Timestamp;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SystemConfig::from_json(text) {
        assert!(config.validate().is_ok());
        let app = AppService::new(&config, Timestamp::ZERO);
        assert!(app.current_skip() >= 1);
    }
});
