#![no_main]
use hyperite::layout::substitute;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Without known tokens the template passes through unchanged
    assert_eq!(substitute(text, |_| None), text);

    // Replacing every token with nothing never grows the text
    let out = substitute(text, |_| Some(""));
    assert!(out.len() <= text.len());
});
