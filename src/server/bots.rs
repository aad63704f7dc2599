//! Link-preview bot detection.
//!
//! Unfurlers identify themselves in `User-Agent`. Matching is a
//! case-insensitive substring test against known signatures.

/// Built-in signatures of link-preview crawlers.
pub const BOT_SIGNATURES: &[&str] = &[
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "slackbot",
    "discordbot",
    "telegrambot",
    "whatsapp",
    "linkedinbot",
    "embedly",
    "redditbot",
    "skypeuripreview",
    "iframely",
    "vkshare",
    "mastodon",
    "applebot",
    "google-inspectiontool",
    "pinterestbot",
    "snapchat",
    "viber",
    "line/",
];

/// User-agent matcher with optional extra signatures.
#[derive(Debug, Clone, Default)]
pub struct BotMatcher {
    extra: Vec<String>,
}

impl BotMatcher {
    pub fn new(extra: &[String]) -> Self {
        Self {
            extra: extra
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Whether `user_agent` belongs to a preview bot. Missing agents are not bots.
    pub fn is_bot(&self, user_agent: Option<&str>) -> bool {
        let Some(ua) = user_agent else {
            return false;
        };
        let ua = ua.to_lowercase();
        BOT_SIGNATURES.iter().any(|sig| ua.contains(sig))
            || self.extra.iter().any(|sig| ua.contains(sig.as_str()))
    }
}
