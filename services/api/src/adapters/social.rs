//! services/api/src/adapters/social.rs
//!
//! Extraction of provider-independent profile data from social-login
//! payloads. The OAuth flow itself is an external collaborator; what arrives
//! here is the provider's profile response, and what leaves is a
//! `SocialProfile` applied to the user's stored avatar.
//!
//! Each provider shapes its payload differently, so each gets its own
//! extractor behind one common trait instead of any dynamic field lookup.

use serde_json::Value;

use askaway_core::domain::{ProfileUpdate, SocialProfile, SocialProvider, User};
use askaway_core::ports::{PortResult, UserStore};

/// Extracts a `SocialProfile` from one provider's payload shape.
pub trait ProfileExtractor: Send + Sync {
    fn provider(&self) -> SocialProvider;

    /// Returns `None` when the payload is missing the fields the provider
    /// normally sends.
    fn extract(&self, payload: &Value) -> Option<SocialProfile>;
}

/// Facebook sends the user's graph id plus first/last name; the picture is
/// addressed by id rather than sent inline.
pub struct FacebookExtractor;

impl ProfileExtractor for FacebookExtractor {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Facebook
    }

    fn extract(&self, payload: &Value) -> Option<SocialProfile> {
        let id = payload.get("id")?.as_str()?;
        let first = payload.get("first_name")?.as_str()?;
        let last = payload.get("last_name")?.as_str()?;
        Some(SocialProfile {
            provider: SocialProvider::Facebook,
            display_name: format!("{} {}", first, last),
            avatar_url: Some(format!("http://graph.facebook.com/{}/picture", id)),
        })
    }
}

/// Google nests the picture under `image.url`.
pub struct GoogleExtractor;

impl ProfileExtractor for GoogleExtractor {
    fn provider(&self) -> SocialProvider {
        SocialProvider::GoogleOauth2
    }

    fn extract(&self, payload: &Value) -> Option<SocialProfile> {
        let display_name = payload.get("displayName")?.as_str()?;
        let avatar_url = payload
            .get("image")
            .and_then(|image| image.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(SocialProfile {
            provider: SocialProvider::GoogleOauth2,
            display_name: display_name.to_string(),
            avatar_url,
        })
    }
}

/// Twitter sends the picture inline as `profile_image_url`.
pub struct TwitterExtractor;

impl ProfileExtractor for TwitterExtractor {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Twitter
    }

    fn extract(&self, payload: &Value) -> Option<SocialProfile> {
        let display_name = payload.get("name")?.as_str()?;
        let avatar_url = payload
            .get("profile_image_url")
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(SocialProfile {
            provider: SocialProvider::Twitter,
            display_name: display_name.to_string(),
            avatar_url,
        })
    }
}

/// Runs the payload through the extractor registered for its provider.
pub fn extract_profile(
    extractors: &[&dyn ProfileExtractor],
    provider: SocialProvider,
    payload: &Value,
) -> Option<SocialProfile> {
    extractors
        .iter()
        .find(|e| e.provider() == provider)
        .and_then(|e| e.extract(payload))
}

/// Stores the extracted avatar on the user's profile.
pub async fn apply_social_profile(
    users: &dyn UserStore,
    username: &str,
    profile: &SocialProfile,
) -> PortResult<User> {
    users
        .update_profile(
            username,
            ProfileUpdate {
                about: None,
                avatar: profile.avatar_url.clone(),
            },
        )
        .await
}
