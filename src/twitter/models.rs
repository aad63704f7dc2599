//! Wire types for the upstream API.
//!
//! Every field is optional or defaulted: the upstream omits fields freely
//! and the normalizer decides what an absent field means.

use serde::Deserialize;

/// Body of a successful guest activation.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestTokenResponse {
    pub guest_token: String,
}

/// Top-level `TweetResultByRestId` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetResultEnvelope {
    #[serde(default)]
    pub data: Option<EnvelopeData>,
}

impl TweetResultEnvelope {
    /// The `data.tweetResult.result` object, if present.
    pub fn into_result(self) -> Option<TweetResult> {
        self.data?.tweet_result?.result
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeData {
    #[serde(default)]
    pub tweet_result: Option<TweetResultSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetResultSlot {
    #[serde(default)]
    pub result: Option<TweetResult>,
}

/// A result object of any kind.
///
/// The three shapes share one struct: `__typename` discriminates, and the
/// fields that belong to other shapes are simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetResult {
    #[serde(rename = "__typename", default)]
    pub typename: Option<String>,

    // TweetTombstone
    #[serde(default)]
    pub tombstone: Option<Tombstone>,

    // TweetWithVisibilityResults
    #[serde(default)]
    pub tweet: Option<Box<TweetResult>>,

    // Tweet
    #[serde(default)]
    pub rest_id: Option<String>,
    #[serde(default)]
    pub core: Option<TweetCore>,
    #[serde(default)]
    pub legacy: Option<TweetLegacy>,
    #[serde(default)]
    pub views: Option<TweetViews>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tombstone {
    #[serde(default)]
    pub text: Option<TombstoneText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TombstoneText {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetCore {
    #[serde(default)]
    pub user_results: Option<UserResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserResults {
    #[serde(default)]
    pub result: Option<UserResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserResult {
    #[serde(default)]
    pub rest_id: Option<String>,
    #[serde(default)]
    pub core: Option<UserCore>,
    #[serde(default)]
    pub legacy: Option<UserLegacy>,
    #[serde(default)]
    pub avatar: Option<UserAvatar>,
}

/// Name block used by the current API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserCore {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub screen_name: Option<String>,
}

/// Name block used by older API revisions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserLegacy {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub screen_name: Option<String>,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAvatar {
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetViews {
    #[serde(default)]
    pub count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetLegacy {
    #[serde(default)]
    pub id_str: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub full_text: String,
    /// Half-open `[start, end)` in UTF-16 code units.
    #[serde(default)]
    pub display_text_range: Option<[usize; 2]>,
    #[serde(default)]
    pub entities: Option<TweetEntities>,
    #[serde(default)]
    pub extended_entities: Option<TweetEntities>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub quote_count: u64,
    #[serde(default)]
    pub possibly_sensitive: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetEntities {
    #[serde(default)]
    pub media: Option<Vec<MediaEntity>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaEntity {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub media_url_https: String,
    #[serde(default)]
    pub original_info: Option<OriginalInfo>,
    #[serde(default)]
    pub sizes: Option<MediaSizes>,
    #[serde(default)]
    pub ext_alt_text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OriginalInfo {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaSizes {
    #[serde(default)]
    pub large: Option<MediaSize>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MediaSize {
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub h: u32,
}
