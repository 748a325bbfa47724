#![no_main]
use hyperite::layout::ContentPayload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    // Must never panic, whatever the JSON shape
    let sections = ContentPayload::from_value(&value, None);
    let rows = ContentPayload::from_value(&value, Some("row.tpl"));

    if !value.is_array() {
        assert!(sections.is_err());
        assert!(rows.is_err());
    }
});
