//! Upstream protocol contract.
//!
//! The GraphQL query id, the `features` object and the `fieldToggles`
//! object are versioned by the upstream service. Change them only when the
//! accepted shape changes; a mismatch surfaces as `FETCH_FAILED` or
//! `NOT_FOUND`, never as a crash.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{json, Value};

/// Guest activation endpoint.
pub const GUEST_ACTIVATE_URL: &str = "https://api.x.com/1.1/guest/activate.json";

/// `TweetResultByRestId` GraphQL endpoint.
pub const TWEET_BY_REST_ID_URL: &str =
    "https://api.x.com/graphql/Xl5pC_lBk_gcO2ItU39DQw/TweetResultByRestId";

/// Public bearer token used by the logged-out web client. Not a secret.
pub const AUTHORIZATION_TOKEN: &str = "Bearer AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

/// Header carrying the guest credential on lookup requests.
pub const GUEST_TOKEN_HEADER: &str = "x-guest-token";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// `variables` payload for `TweetResultByRestId`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupVariables<'a> {
    pub tweet_id: &'a str,
    pub include_promoted_content: bool,
    pub with_birdwatch_notes: bool,
    pub with_voice: bool,
    pub with_community: bool,
}

impl<'a> LookupVariables<'a> {
    pub fn for_tweet(tweet_id: &'a str) -> Self {
        Self {
            tweet_id,
            include_promoted_content: true,
            with_birdwatch_notes: true,
            with_voice: true,
            with_community: true,
        }
    }
}

/// `fieldToggles` payload for `TweetResultByRestId`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldToggles {
    pub with_article_rich_content_state: bool,
    pub with_article_plain_text: bool,
}

pub const FIELD_TOGGLES: FieldToggles = FieldToggles {
    with_article_rich_content_state: true,
    with_article_plain_text: false,
};

/// `features` payload for `TweetResultByRestId`.
pub static TWEET_FEATURES: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "creator_subscriptions_tweet_preview_api_enabled": true,
        "premium_content_api_read_enabled": false,
        "communities_web_enable_tweet_community_results_fetch": true,
        "c9s_tweet_anatomy_moderator_badge_enabled": true,
        "responsive_web_grok_analyze_button_fetch_trends_enabled": false,
        "responsive_web_grok_analyze_post_followups_enabled": false,
        "responsive_web_jetfuel_frame": false,
        "responsive_web_grok_share_attachment_enabled": true,
        "articles_preview_enabled": true,
        "responsive_web_edit_tweet_api_enabled": true,
        "graphql_is_translatable_rweb_tweet_is_translatable_enabled": true,
        "view_counts_everywhere_api_enabled": true,
        "longform_notetweets_consumption_enabled": true,
        "responsive_web_twitter_article_tweet_consumption_enabled": true,
        "tweet_awards_web_tipping_enabled": false,
        "responsive_web_grok_show_grok_translated_post": false,
        "responsive_web_grok_analysis_button_from_backend": false,
        "creator_subscriptions_quote_tweet_preview_enabled": false,
        "freedom_of_speech_not_reach_fetch_enabled": true,
        "standardized_nudges_misinfo": true,
        "tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled": true,
        "longform_notetweets_rich_text_read_enabled": true,
        "longform_notetweets_inline_media_enabled": true,
        "payments_enabled": false,
        "profile_label_improvements_pcf_label_in_post_enabled": true,
        "rweb_tipjar_consumption_enabled": true,
        "verified_phone_label_enabled": false,
        "responsive_web_grok_image_annotation_enabled": true,
        "responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
        "responsive_web_graphql_timeline_navigation_enabled": true,
        "responsive_web_enhance_cards_enabled": false
    })
});

/// Query pairs for one lookup, each value JSON-serialized.
pub fn lookup_query(tweet_id: &str) -> Result<[(&'static str, String); 3], serde_json::Error> {
    Ok([
        (
            "variables",
            serde_json::to_string(&LookupVariables::for_tweet(tweet_id))?,
        ),
        ("features", serde_json::to_string(&*TWEET_FEATURES)?),
        ("fieldToggles", serde_json::to_string(&FIELD_TOGGLES)?),
    ])
}
