//! # Domain Models
//!
//! These structs represent the core entities of SaasList.
//! Counters (`upvotes_count`, `comments_count`) are owned by storage and only
//! ever read here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// How a product is monetized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    #[default]
    Free,
    Freemium,
    Premium,
}

impl PricingModel {
    pub const ALL: [PricingModel; 3] = [Self::Free, Self::Freemium, Self::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Freemium => "freemium",
            Self::Premium => "premium",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Freemium => "Freemium",
            Self::Premium => "Premium",
        }
    }
}

impl FromStr for PricingModel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "freemium" => Ok(Self::Freemium),
            "premium" => Ok(Self::Premium),
            other => Err(DomainError::validation(format!(
                "unknown pricing model '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a product runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Web,
    Ios,
    Android,
    Desktop,
    Api,
    BrowserExtension,
    Other,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Self::Web,
        Self::Ios,
        Self::Android,
        Self::Desktop,
        Self::Api,
        Self::BrowserExtension,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Desktop => "desktop",
            Self::Api => "api",
            Self::BrowserExtension => "browser_extension",
            Self::Other => "other",
        }
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown platform '{s}'")))
    }
}

/// Listing visibility. Only `Published` products reach the leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Published,
    Hidden,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Hidden => "hidden",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "hidden" => Ok(Self::Hidden),
            other => Err(DomainError::validation(format!("unknown status '{other}'"))),
        }
    }
}

/// A submitted micro-SaaS product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub website_url: String,
    pub repo_url: Option<String>,
    pub logo_url: Option<String>,
    /// Loom or YouTube link
    pub demo_url: Option<String>,
    pub pricing_model: PricingModel,
    pub promo_code: Option<String>,
    pub tags: Vec<String>,
    pub twitter_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub product_hunt_url: Option<String>,
    pub platforms: Vec<Platform>,
    /// Submitter
    pub user_id: Uuid,
    pub upvotes_count: i64,
    pub comments_count: i64,
    pub views_count: i64,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Placeholder glyph shown when no logo is set.
    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }

    /// YouTube watch links cannot be framed; swap them for the embed form.
    pub fn embed_demo_url(&self) -> Option<String> {
        self.demo_url.as_ref().map(|url| {
            if url.contains("youtube.com") {
                url.replace("watch?v=", "embed/")
            } else {
                url.clone()
            }
        })
    }

    pub fn has_socials(&self) -> bool {
        self.twitter_url.is_some() || self.linkedin_url.is_some() || self.product_hunt_url.is_some()
    }
}

/// A validated product ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub website_url: String,
    pub repo_url: Option<String>,
    pub logo_url: Option<String>,
    pub demo_url: Option<String>,
    pub pricing_model: PricingModel,
    pub promo_code: Option<String>,
    pub tags: Vec<String>,
    pub twitter_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub product_hunt_url: Option<String>,
    pub platforms: Vec<Platform>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl NewProduct {
    /// Materializes the stored row with zeroed counters.
    pub fn into_product(self, id: Uuid) -> Product {
        Product {
            id,
            name: self.name,
            tagline: self.tagline,
            description: self.description,
            website_url: self.website_url,
            repo_url: self.repo_url,
            logo_url: self.logo_url,
            demo_url: self.demo_url,
            pricing_model: self.pricing_model,
            promo_code: self.promo_code,
            tags: self.tags,
            twitter_url: self.twitter_url,
            linkedin_url: self.linkedin_url,
            product_hunt_url: self.product_hunt_url,
            platforms: self.platforms,
            user_id: self.user_id,
            upvotes_count: 0,
            comments_count: 0,
            views_count: 0,
            status: ProductStatus::Published,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A vote linking one user to one product, unique per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upvote {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A discussion entry on a product. `parent_id` makes it a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_flagged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// The slice of a profile shown next to a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Author {
    pub name: String,
    pub avatar_url: Option<String>,
}

impl Author {
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: Author,
}

/// Public identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("User")
    }

    /// Up to two uppercase initials, "U" when the profile has no name.
    pub fn initials(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name
                .split_whitespace()
                .filter_map(|word| word.chars().next())
                .flat_map(char::to_uppercase)
                .take(2)
                .collect(),
            _ => "U".to_string(),
        }
    }

    pub fn author(&self) -> Author {
        Author {
            name: self.display_name().to_string(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// A profile together with its stored password hash (PHC string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub profile: Profile,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: Option<&str>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: name.map(str::to_string),
            avatar_url: None,
            email: None,
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(profile(Some("ada lovelace")).initials(), "AL");
        assert_eq!(profile(Some("Grace Brewster Hopper")).initials(), "GB");
        assert_eq!(profile(Some("linus")).initials(), "L");
        assert_eq!(profile(None).initials(), "U");
        assert_eq!(profile(Some("   ")).initials(), "U");
    }

    #[test]
    fn test_pricing_model_parse() {
        assert_eq!("freemium".parse::<PricingModel>().unwrap(), PricingModel::Freemium);
        assert!("enterprise".parse::<PricingModel>().is_err());
        assert_eq!(
            "browser_extension".parse::<Platform>().unwrap(),
            Platform::BrowserExtension
        );
    }

    #[test]
    fn test_youtube_demo_is_embedded() {
        let now = Utc::now();
        let mut product = NewProduct {
            name: "Tally".into(),
            tagline: "t".into(),
            description: "d".into(),
            website_url: "https://tally.so".into(),
            repo_url: None,
            logo_url: None,
            demo_url: Some("https://www.youtube.com/watch?v=abc123".into()),
            pricing_model: PricingModel::Free,
            promo_code: None,
            tags: vec![],
            twitter_url: None,
            linkedin_url: None,
            product_hunt_url: None,
            platforms: vec![],
            user_id: Uuid::new_v4(),
            created_at: now,
        }
        .into_product(Uuid::new_v4());
        assert_eq!(
            product.embed_demo_url().as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );
        assert_eq!(product.initial(), "T");

        product.demo_url = Some("https://loom.com/share/xyz".into());
        assert_eq!(product.embed_demo_url().as_deref(), Some("https://loom.com/share/xyz"));
    }

    #[test]
    fn test_comment_is_edited() {
        let now = Utc::now();
        let mut comment = Comment {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            parent_id: None,
            content: "Nice".into(),
            is_flagged: false,
            created_at: now,
            updated_at: now,
        };
        assert!(!comment.is_edited());
        comment.updated_at = now + chrono::Duration::seconds(5);
        assert!(comment.is_edited());
    }
}
