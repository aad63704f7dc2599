//! Response normalization.
//!
//! Maps the upstream envelope onto exactly one of: a [`CanonicalPost`],
//! `NOT_FOUND`, or `RESTRICTED`.
//!
//! | `__typename`                 | outcome                                 |
//! |------------------------------|-----------------------------------------|
//! | (no result)                  | `NOT_FOUND` (404)                       |
//! | `TweetTombstone`             | `RESTRICTED` (451), tombstone text      |
//! | `TweetWithVisibilityResults` | unwrap `tweet`, then as a normal post   |
//! | anything else, or absent     | normal post                             |

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{LookupResult, UpstreamError};
use super::models::{MediaEntity, TweetLegacy, TweetResult, TweetResultEnvelope, UserResult};

pub const TOMBSTONE_TYPENAME: &str = "TweetTombstone";
pub const VISIBILITY_TYPENAME: &str = "TweetWithVisibilityResults";

/// Message used when a tombstone carries no text of its own.
pub const TOMBSTONE_FALLBACK_MESSAGE: &str = "This tweet is unavailable";

const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// The normalized post handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPost {
    /// Always the identifier the lookup was issued for.
    pub id: String,
    pub author: Author,
    /// Full body text, verbatim from upstream.
    pub text: String,
    /// Half-open `[start, end)` over `text`, in UTF-16 code units.
    pub display_range: Option<(usize, usize)>,
    /// Media list the primary media is drawn from.
    pub media: Vec<Media>,
    pub created_at: Option<DateTime<Utc>>,
    pub lang: Option<String>,
    pub stats: PostStats,
    pub possibly_sensitive: bool,
}

impl CanonicalPost {
    /// Representative media for the preview card.
    pub fn primary_media(&self) -> Option<&Media> {
        self.media.first()
    }

    /// Body text restricted to the display range, if there is one.
    pub fn display_text(&self) -> String {
        display_text(&self.text, self.display_range)
    }

    /// Canonical, non-preview URL for this post under `base`.
    pub fn permalink(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        if self.author.handle.is_empty() {
            format!("{base}/i/status/{}", self.id)
        } else {
            format!("{base}/{}/status/{}", self.author.handle, self.id)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    /// Screen name without the leading `@`.
    pub handle: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStats {
    pub replies: u64,
    pub retweets: u64,
    pub likes: u64,
    pub quotes: u64,
    pub views: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    AnimatedGif,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub kind: MediaKind,
    /// Still image URL; for video this is the poster frame.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt_text: Option<String>,
}

/// Normalize an upstream envelope for the post `requested_id`.
pub fn normalize(envelope: TweetResultEnvelope, requested_id: &str) -> LookupResult<CanonicalPost> {
    let Some(result) = envelope.into_result() else {
        return Err(UpstreamError::not_found());
    };

    match result.typename.as_deref() {
        Some(TOMBSTONE_TYPENAME) => {
            let message = result
                .tombstone
                .and_then(|t| t.text)
                .and_then(|t| t.text)
                .unwrap_or_else(|| TOMBSTONE_FALLBACK_MESSAGE.to_string());
            Err(UpstreamError::restricted(message))
        }
        Some(VISIBILITY_TYPENAME) => match result.tweet {
            Some(inner) => Ok(canonicalize(*inner, requested_id)),
            None => Err(UpstreamError::not_found()),
        },
        // Missing or unrecognized discriminant: the upstream sometimes
        // omits `__typename` on ordinary posts.
        _ => Ok(canonicalize(result, requested_id)),
    }
}

fn canonicalize(result: TweetResult, requested_id: &str) -> CanonicalPost {
    if let Some(rest_id) = result.rest_id.as_deref() {
        if rest_id != requested_id {
            tracing::warn!(
                post_id = requested_id,
                rest_id,
                "upstream returned a different rest_id"
            );
        }
    }

    let author = result
        .core
        .and_then(|c| c.user_results)
        .and_then(|u| u.result)
        .map(author_from)
        .unwrap_or_default();

    let legacy = result.legacy.unwrap_or_default();
    let views = result
        .views
        .and_then(|v| v.count)
        .and_then(|c| c.parse::<u64>().ok());

    CanonicalPost {
        id: requested_id.to_string(),
        author,
        media: select_media(&legacy),
        display_range: legacy.display_text_range.map(|[s, e]| (s, e)),
        created_at: legacy.created_at.as_deref().and_then(parse_created_at),
        lang: legacy.lang,
        stats: PostStats {
            replies: legacy.reply_count,
            retweets: legacy.retweet_count,
            likes: legacy.favorite_count,
            quotes: legacy.quote_count,
            views,
        },
        possibly_sensitive: legacy.possibly_sensitive.unwrap_or(false),
        text: legacy.full_text,
    }
}

fn author_from(user: UserResult) -> Author {
    let core = user.core.unwrap_or_default();
    let legacy = user.legacy.unwrap_or_default();
    Author {
        name: core.name.or(legacy.name).unwrap_or_default(),
        handle: core.screen_name.or(legacy.screen_name).unwrap_or_default(),
        avatar_url: user
            .avatar
            .and_then(|a| a.image_url)
            .or(legacy.profile_image_url_https),
    }
}

/// Media list for a post: the extended list when it has entries, else the
/// legacy list. The first element is the primary media.
pub fn select_media(legacy: &TweetLegacy) -> Vec<Media> {
    let extended = media_list(legacy.extended_entities.as_ref().and_then(|e| e.media.as_deref()));
    if !extended.is_empty() {
        return extended;
    }
    media_list(legacy.entities.as_ref().and_then(|e| e.media.as_deref()))
}

fn media_list(entities: Option<&[MediaEntity]>) -> Vec<Media> {
    entities
        .unwrap_or_default()
        .iter()
        .filter(|m| !m.media_url_https.is_empty())
        .map(media_from)
        .collect()
}

fn media_from(entity: &MediaEntity) -> Media {
    let kind = match entity.kind.as_deref() {
        Some("video") => MediaKind::Video,
        Some("animated_gif") => MediaKind::AnimatedGif,
        _ => MediaKind::Photo,
    };
    let (width, height) = match (entity.original_info, entity.sizes.as_ref().and_then(|s| s.large)) {
        (Some(info), _) => (info.width, info.height),
        (None, Some(large)) => (large.w, large.h),
        (None, None) => (0, 0),
    };
    Media {
        kind,
        url: entity.media_url_https.clone(),
        width,
        height,
        alt_text: entity.ext_alt_text.clone(),
    }
}

/// Substring of `text` over a half-open UTF-16 range.
///
/// Without a range the full text is returned. Bounds past the end are
/// clamped; an inverted range yields an empty string.
pub fn display_text(text: &str, range: Option<(usize, usize)>) -> String {
    let Some((start, end)) = range else {
        return text.to_string();
    };
    let units: Vec<u16> = text.encode_utf16().collect();
    let end = end.min(units.len());
    let start = start.min(end);
    String::from_utf16_lossy(&units[start..end])
}

fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::error::ErrorCode;
    use serde_json::json;

    fn envelope(result: serde_json::Value) -> TweetResultEnvelope {
        serde_json::from_value(json!({ "data": { "tweetResult": { "result": result } } })).unwrap()
    }

    fn tweet(id: &str) -> serde_json::Value {
        json!({
            "__typename": "Tweet",
            "rest_id": id,
            "core": { "user_results": { "result": {
                "core": { "name": "Netflix Anime", "screen_name": "NetflixAnime" },
                "avatar": { "image_url": "https://pbs.twimg.com/profile_images/1/a.jpg" }
            }}},
            "legacy": {
                "id_str": id,
                "created_at": "Wed Oct 10 20:19:24 +0000 2018",
                "full_text": "hello world https://t.co/abc",
                "display_text_range": [0, 11],
                "lang": "en",
                "favorite_count": 12,
                "retweet_count": 3,
                "entities": {}
            },
            "views": { "count": "1500" }
        })
    }

    fn photo(url: &str) -> serde_json::Value {
        json!({ "type": "photo", "media_url_https": url, "original_info": { "width": 1200, "height": 675 } })
    }

    // ==================== discriminant tests ====================

    #[test]
    fn test_missing_envelope_is_not_found() {
        let err = normalize(TweetResultEnvelope::default(), "1").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Tweet not found");
        assert_eq!(err.status_code, Some(404));
    }

    #[test]
    fn test_empty_data_is_not_found() {
        let env: TweetResultEnvelope = serde_json::from_value(json!({ "data": {} })).unwrap();
        let err = normalize(env, "1").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_tombstone_uses_its_text() {
        let env = envelope(json!({
            "__typename": "TweetTombstone",
            "tombstone": { "text": { "text": "Age-restricted adult content." } }
        }));
        let err = normalize(env, "5").unwrap_err();
        assert_eq!(err.code, ErrorCode::Restricted);
        assert_eq!(err.status_code, Some(451));
        assert_eq!(err.message, "Age-restricted adult content.");
    }

    #[test]
    fn test_tombstone_without_text_uses_fallback() {
        let env = envelope(json!({ "__typename": "TweetTombstone" }));
        let err = normalize(env, "5").unwrap_err();
        assert_eq!(err.code, ErrorCode::Restricted);
        assert_eq!(err.message, TOMBSTONE_FALLBACK_MESSAGE);

        let env = envelope(json!({ "__typename": "TweetTombstone", "tombstone": { "text": {} } }));
        let err = normalize(env, "5").unwrap_err();
        assert_eq!(err.message, TOMBSTONE_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_visibility_wrapper_is_unwrapped() {
        let env = envelope(json!({
            "__typename": "TweetWithVisibilityResults",
            "tweet": tweet("77"),
        }));
        let post = normalize(env, "77").unwrap();
        assert_eq!(post.id, "77");
        assert_eq!(post.author.handle, "NetflixAnime");
    }

    #[test]
    fn test_visibility_wrapper_without_tweet_is_not_found() {
        let env = envelope(json!({ "__typename": "TweetWithVisibilityResults" }));
        let err = normalize(env, "77").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_missing_typename_is_normal_post() {
        let mut raw = tweet("9");
        raw.as_object_mut().unwrap().remove("__typename");
        let post = normalize(envelope(raw), "9").unwrap();
        assert_eq!(post.text, "hello world https://t.co/abc");
    }

    #[test]
    fn test_unknown_typename_is_normal_post() {
        let mut raw = tweet("9");
        raw["__typename"] = json!("TweetUnavailableSomehow");
        assert!(normalize(envelope(raw), "9").is_ok());
    }

    #[test]
    fn test_id_matches_request() {
        let post = normalize(envelope(tweet("2008917793123528940")), "2008917793123528940").unwrap();
        assert_eq!(post.id, "2008917793123528940");
    }

    // ==================== field mapping tests ====================

    #[test]
    fn test_fields_are_mapped() {
        let post = normalize(envelope(tweet("9")), "9").unwrap();
        assert_eq!(post.author.name, "Netflix Anime");
        assert_eq!(
            post.author.avatar_url.as_deref(),
            Some("https://pbs.twimg.com/profile_images/1/a.jpg")
        );
        assert_eq!(post.display_range, Some((0, 11)));
        assert_eq!(post.display_text(), "hello world");
        assert_eq!(post.lang.as_deref(), Some("en"));
        assert_eq!(post.stats.likes, 12);
        assert_eq!(post.stats.retweets, 3);
        assert_eq!(post.stats.views, Some(1500));
        assert_eq!(
            post.created_at.map(|d| d.to_rfc3339()),
            Some("2018-10-10T20:19:24+00:00".to_string())
        );
        assert!(!post.possibly_sensitive);
    }

    #[test]
    fn test_author_falls_back_to_legacy_block() {
        let mut raw = tweet("9");
        raw["core"] = json!({ "user_results": { "result": {
            "legacy": {
                "name": "Old Style",
                "screen_name": "oldstyle",
                "profile_image_url_https": "https://pbs.twimg.com/p.jpg"
            }
        }}});
        let post = normalize(envelope(raw), "9").unwrap();
        assert_eq!(post.author.name, "Old Style");
        assert_eq!(post.author.handle, "oldstyle");
        assert_eq!(post.author.avatar_url.as_deref(), Some("https://pbs.twimg.com/p.jpg"));
    }

    #[test]
    fn test_unparsable_created_at_is_none() {
        let mut raw = tweet("9");
        raw["legacy"]["created_at"] = json!("yesterday");
        let post = normalize(envelope(raw), "9").unwrap();
        assert!(post.created_at.is_none());
    }

    #[test]
    fn test_permalink() {
        let post = normalize(envelope(tweet("9")), "9").unwrap();
        assert_eq!(post.permalink("https://x.com/"), "https://x.com/NetflixAnime/status/9");

        let mut anonymous = post.clone();
        anonymous.author.handle.clear();
        assert_eq!(anonymous.permalink("https://x.com"), "https://x.com/i/status/9");
    }

    // ==================== media selection tests ====================

    #[test]
    fn test_media_prefers_extended() {
        let mut raw = tweet("9");
        raw["legacy"]["entities"] = json!({ "media": [photo("https://legacy/0.jpg")] });
        raw["legacy"]["extended_entities"] = json!({
            "media": [photo("https://extended/0.jpg"), photo("https://extended/1.jpg")]
        });
        let post = normalize(envelope(raw), "9").unwrap();
        assert_eq!(post.media.len(), 2);
        assert_eq!(post.primary_media().unwrap().url, "https://extended/0.jpg");
    }

    #[test]
    fn test_media_falls_back_to_legacy() {
        let mut raw = tweet("9");
        raw["legacy"]["entities"] = json!({ "media": [photo("https://legacy/0.jpg")] });
        let post = normalize(envelope(raw), "9").unwrap();
        let media = post.primary_media().unwrap();
        assert_eq!(media.url, "https://legacy/0.jpg");
        assert_eq!((media.width, media.height), (1200, 675));
        assert_eq!(media.kind, MediaKind::Photo);
    }

    #[test]
    fn test_empty_extended_list_falls_back_to_legacy() {
        let mut raw = tweet("9");
        raw["legacy"]["entities"] = json!({ "media": [photo("https://legacy/0.jpg")] });
        raw["legacy"]["extended_entities"] = json!({ "media": [] });
        let post = normalize(envelope(raw), "9").unwrap();
        assert_eq!(post.primary_media().unwrap().url, "https://legacy/0.jpg");
    }

    #[test]
    fn test_no_media() {
        let post = normalize(envelope(tweet("9")), "9").unwrap();
        assert!(post.media.is_empty());
        assert!(post.primary_media().is_none());
    }

    #[test]
    fn test_media_size_falls_back_to_large() {
        let mut raw = tweet("9");
        raw["legacy"]["extended_entities"] = json!({ "media": [{
            "type": "video",
            "media_url_https": "https://pbs.twimg.com/thumb.jpg",
            "sizes": { "large": { "w": 1280, "h": 720, "resize": "fit" } }
        }]});
        let post = normalize(envelope(raw), "9").unwrap();
        let media = post.primary_media().unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!((media.width, media.height), (1280, 720));
    }

    // ==================== display text tests ====================

    #[test]
    fn test_display_text_without_range_is_full_text() {
        assert_eq!(display_text("full body", None), "full body");
    }

    #[test]
    fn test_display_text_uses_utf16_offsets() {
        // U+1F389 is two UTF-16 code units.
        let text = "\u{1F389} party https://t.co/x";
        assert_eq!(display_text(text, Some((0, 8))), "\u{1F389} party");
        assert_eq!(display_text(text, Some((3, 8))), "party");
    }

    #[test]
    fn test_display_text_clamps_out_of_range() {
        assert_eq!(display_text("abc", Some((1, 99))), "bc");
        assert_eq!(display_text("abc", Some((5, 9))), "");
        assert_eq!(display_text("abc", Some((2, 1))), "");
    }

    #[test]
    fn test_display_text_every_in_bounds_range_matches_substring() {
        let text = "ascii text";
        let len = text.len();
        for start in 0..=len {
            for end in start..=len {
                assert_eq!(display_text(text, Some((start, end))), &text[start..end]);
            }
        }
    }
}
