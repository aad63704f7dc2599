#![no_main]

use libfuzzer_sys::fuzz_target;

use xcard::render::escape_html;
use xcard::twitter::normalize::display_text;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let start = usize::from(u16::from_le_bytes([data[0], data[1]]));
    let end = usize::from(u16::from_le_bytes([data[2], data[3]]));
    let text = String::from_utf8_lossy(&data[4..]);

    let shown = display_text(&text, Some((start, end)));
    assert!(shown.encode_utf16().count() <= text.encode_utf16().count());

    let escaped = escape_html(&shown);
    assert!(!escaped.contains(['<', '>', '"', '\'']));
});
