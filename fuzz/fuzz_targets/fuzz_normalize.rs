#![no_main]

use libfuzzer_sys::fuzz_target;

use xcard::render::render_preview;
use xcard::twitter::models::TweetResultEnvelope;
use xcard::twitter::normalize::normalize;

// Arbitrary lookup bodies must either fail to parse or normalize without
// panicking, and every normalized post must render.
fuzz_target!(|data: &[u8]| {
    let Ok(envelope) = serde_json::from_slice::<TweetResultEnvelope>(data) else {
        return;
    };
    if let Ok(post) = normalize(envelope, "20") {
        assert_eq!(post.id, "20");
        let html = render_preview(&post, "https://x.com");
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
});
