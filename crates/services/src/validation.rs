//! Input checks for product submissions and comments.

use chrono::{DateTime, Utc};
use domains::{DomainError, NewProduct, Platform, PricingModel, Result};
use url::{Host, Url};
use uuid::Uuid;

pub const NAME_MAX: usize = 60;
pub const TAGLINE_MAX: usize = 120;
pub const DESCRIPTION_MIN: usize = 50;
pub const DESCRIPTION_MAX: usize = 1000;
pub const TAGS_MAX: usize = 3;
pub const PROMO_CODE_MAX: usize = 32;
pub const COMMENT_MAX: usize = 2000;

/// Raw submission form values, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub tagline: String,
    pub website_url: String,
    pub repo_url: Option<String>,
    pub is_open_source: bool,
    pub description: String,
    pub tags: Vec<String>,
    pub logo_url: Option<String>,
    pub demo_url: Option<String>,
    pub pricing_model: String,
    pub promo_code: Option<String>,
    pub twitter_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub product_hunt_url: Option<String>,
    pub platforms: Vec<String>,
}

impl ProductDraft {
    /// Checks every field and reports all problems at once.
    pub fn validate(self, user_id: Uuid, now: DateTime<Utc>) -> Result<NewProduct> {
        let mut problems = Vec::new();

        let name = self.name.trim().to_string();
        check_length(&mut problems, "Name", &name, 1, NAME_MAX);

        let tagline = self.tagline.trim().to_string();
        check_length(&mut problems, "Tagline", &tagline, 1, TAGLINE_MAX);

        let description = self.description.trim().to_string();
        check_length(&mut problems, "Description", &description, DESCRIPTION_MIN, DESCRIPTION_MAX);

        let website_url = self.website_url.trim().to_string();
        if !is_http_url(&website_url) {
            problems.push("Website URL must be a valid http(s) URL".to_string());
        }

        // Closed-source products drop whatever was typed into the repository field.
        let repo_url = optional(self.repo_url).filter(|_| self.is_open_source);
        if self.is_open_source && repo_url.is_none() {
            problems.push("Repository URL is required for open source products".to_string());
        }

        let logo_url = optional(self.logo_url);
        let demo_url = optional(self.demo_url);
        let twitter_url = optional(self.twitter_url);
        let linkedin_url = optional(self.linkedin_url);
        let product_hunt_url = optional(self.product_hunt_url);
        for (label, url) in [
            ("Repository URL", &repo_url),
            ("Logo URL", &logo_url),
            ("Demo URL", &demo_url),
            ("Twitter URL", &twitter_url),
            ("LinkedIn URL", &linkedin_url),
            ("Product Hunt URL", &product_hunt_url),
        ] {
            if let Some(url) = url {
                if !is_http_url(url) {
                    problems.push(format!("{label} must be a valid http(s) URL"));
                }
            }
        }

        let tags: Vec<String> = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            problems.push("Add at least one tag".to_string());
        } else if tags.len() > TAGS_MAX {
            problems.push(format!("Add up to {TAGS_MAX} tags"));
        }

        let pricing_model = match self.pricing_model.trim() {
            "" => PricingModel::default(),
            raw => raw.parse().unwrap_or_else(|err: DomainError| {
                problems.push(err.to_string());
                PricingModel::default()
            }),
        };

        let promo_code = optional(self.promo_code);
        if let Some(code) = &promo_code {
            if code.chars().count() > PROMO_CODE_MAX {
                problems.push(format!("Promo code must be at most {PROMO_CODE_MAX} characters"));
            }
        }

        let mut platforms = Vec::new();
        for raw in &self.platforms {
            match raw.parse::<Platform>() {
                Ok(p) if !platforms.contains(&p) => platforms.push(p),
                Ok(_) => {}
                Err(err) => problems.push(err.to_string()),
            }
        }

        if !problems.is_empty() {
            return Err(DomainError::InvalidFields(problems));
        }

        Ok(NewProduct {
            name,
            tagline,
            description,
            website_url,
            repo_url,
            logo_url,
            demo_url,
            pricing_model,
            promo_code,
            tags,
            twitter_url,
            linkedin_url,
            product_hunt_url,
            platforms,
            user_id,
            created_at: now,
        })
    }
}

/// Trims comment text and enforces its length bounds.
pub fn comment_content(raw: &str) -> Result<String> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(DomainError::validation("Comment cannot be empty"));
    }
    if content.chars().count() > COMMENT_MAX {
        return Err(DomainError::validation(format!(
            "Comment must be at most {COMMENT_MAX} characters"
        )));
    }
    Ok(content.to_string())
}

/// An absolute `http`/`https` URL whose host is an IP, `localhost`, or a
/// dotted domain with no empty labels.
pub fn is_http_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => {
            domain == "localhost"
                || (domain.contains('.') && domain.split('.').all(|label| !label.is_empty()))
        }
        None => false,
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_length(problems: &mut Vec<String>, label: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min {
        if min == 1 {
            problems.push(format!("{label} is required"));
        } else {
            problems.push(format!("{label} must be at least {min} characters"));
        }
    } else if len > max {
        problems.push(format!("{label} must be at most {max} characters"));
    }
}
