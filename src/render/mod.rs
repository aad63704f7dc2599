//! Open Graph preview rendering.
//!
//! Produces the small HTML document that link-preview bots read. Every
//! dynamic value passes through [`escape_html`] exactly once.

use maud::{html, PreEscaped, DOCTYPE};

use crate::twitter::CanonicalPost;

/// Site name advertised in `og:site_name`.
pub const SITE_NAME: &str = "xcard";

/// Escape text for use in HTML content and double-quoted attributes.
///
/// Replacement order is fixed (`&` first) and the function is not
/// idempotent: already-escaped input is escaped again.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Canonical (non-preview) URL for a post identifier.
pub fn canonical_url(base: &str, id: &str) -> String {
    format!("{}/i/status/{}", base.trim_end_matches('/'), id)
}

/// Title line for the card: `Name (@handle)`, or just `@handle`.
pub fn card_title(post: &CanonicalPost) -> String {
    match (post.author.name.is_empty(), post.author.handle.is_empty()) {
        (false, false) => format!("{} (@{})", post.author.name, post.author.handle),
        (true, false) => format!("@{}", post.author.handle),
        (false, true) => post.author.name.clone(),
        (true, true) => format!("Post {}", post.id),
    }
}

/// Render the preview document for a successfully looked-up post.
pub fn render_preview(post: &CanonicalPost, canonical_base: &str) -> String {
    let title = escaped(&card_title(post));
    let description = escaped(&post.display_text());
    let og_url = escaped(&canonical_url(canonical_base, &post.id));
    let permalink = escaped(&post.permalink(canonical_base));
    let lang = escaped(post.lang.as_deref().unwrap_or("en"));
    let media = post.primary_media();
    let twitter_card = if media.is_some() {
        "summary_large_image"
    } else {
        "summary"
    };

    let markup = html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }

                meta property="og:title" content=(title);
                meta property="og:description" content=(description);
                @if let Some(media) = media {
                    meta property="og:image" content=(escaped(&media.url));
                    meta property="og:image:width" content=(media.width);
                    meta property="og:image:height" content=(media.height);
                    @if let Some(alt) = &media.alt_text {
                        meta property="og:image:alt" content=(escaped(alt));
                    }
                }
                meta name="twitter:card" content=(twitter_card);
                meta property="og:type" content="website";
                meta property="og:url" content=(og_url);
                meta property="og:site_name" content=(SITE_NAME);
                @if let Some(created_at) = post.created_at {
                    meta property="article:published_time" content=(created_at.to_rfc3339());
                }
                link rel="canonical" href=(og_url);
            }
            body {
                p { (description) }
                p { a href=(permalink) { "View post" } }
            }
        }
    };
    markup.into_string()
}

/// Dynamic text goes through [`escape_html`] and is then inserted verbatim.
fn escaped(text: &str) -> PreEscaped<String> {
    PreEscaped(escape_html(text))
}
