use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<i64>,
    pub restaurant_id: i64,
    pub content: String,
    pub media_urls: Vec<String>,
    pub platforms: Vec<Platform>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub status: PostStatus,
    pub engagement_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Session record for a logged-in mobile client. `token` is the bearer
/// credential the app sends on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobileSession {
    pub id: Option<i64>,
    pub user_id: i64,
    pub token: String,
    pub device_id: Option<String>,
    pub push_token: Option<String>,
    pub last_active: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
        };
        write!(f, "{}", s)
    }
}

impl PostStatus {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "scheduled" => Some(PostStatus::Scheduled),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
    Tiktok,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::Tiktok => "tiktok",
        };
        write!(f, "{}", s)
    }
}

impl Platform {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "instagram" => Some(Platform::Instagram),
            "facebook" => Some(Platform::Facebook),
            "twitter" | "x" => Some(Platform::Twitter),
            "tiktok" => Some(Platform::Tiktok),
            _ => None,
        }
    }
}

/// Caller-supplied facts about the restaurant that flow into caption and
/// content generation. Every field is optional; consumers substitute the
/// documented defaults instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantContext {
    pub name: Option<String>,
    pub cuisine: Option<String>,
    pub style: Option<String>,
    pub location: Option<String>,
}

impl RestaurantContext {
    pub const DEFAULT_NAME: &'static str = "Our Restaurant";
    pub const DEFAULT_CUISINE: &'static str = "International";
    pub const DEFAULT_STYLE: &'static str = "Casual Dining";
    pub const DEFAULT_LOCATION: &'static str = "Local";

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::DEFAULT_NAME)
    }

    pub fn cuisine(&self) -> &str {
        self.cuisine.as_deref().unwrap_or(Self::DEFAULT_CUISINE)
    }

    pub fn style(&self) -> &str {
        self.style.as_deref().unwrap_or(Self::DEFAULT_STYLE)
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(Self::DEFAULT_LOCATION)
    }
}

impl Restaurant {
    /// Context record handed to the caption generator.
    pub fn to_context(&self) -> RestaurantContext {
        RestaurantContext {
            name: Some(self.name.clone()),
            cuisine: self.cuisine.clone(),
            style: Some("Restaurant".to_string()),
            location: self.location.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_string() {
        assert_eq!(Platform::from_string("Instagram"), Some(Platform::Instagram));
        assert_eq!(Platform::from_string("X"), Some(Platform::Twitter));
        assert_eq!(Platform::from_string("myspace"), None);
    }

    #[test]
    fn test_post_status_round_trip() {
        assert_eq!(
            PostStatus::from_string("published"),
            Some(PostStatus::Published)
        );
        assert_eq!(
            PostStatus::from_string(&PostStatus::Draft.to_string()),
            Some(PostStatus::Draft)
        );
        assert_eq!(PostStatus::from_string("archived"), None);
    }

    #[test]
    fn test_context_defaults() {
        let ctx = RestaurantContext::default();
        assert_eq!(ctx.name(), "Our Restaurant");
        assert_eq!(ctx.cuisine(), "International");
        assert_eq!(ctx.style(), "Casual Dining");
        assert_eq!(ctx.location(), "Local");

        let ctx = RestaurantContext {
            name: Some("Tony's Bistro".to_string()),
            ..Default::default()
        };
        assert_eq!(ctx.name(), "Tony's Bistro");
    }
}
