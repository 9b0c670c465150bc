//! # Views
//!
//! askama page templates and the view models they render. Everything a
//! template shows is precomputed here so the templates stay declarative.

use askama::Template;
use chrono::{DateTime, Utc};
use domains::{PricingModel, Platform, Product, Profile};
use services::{CommentEntry, Leaderboard, ProductDraft};

use crate::flash::{Flash, FlashKind};

/// Header and flash banner shared by every page.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub viewer: Option<ViewerView>,
    pub flash: Option<FlashView>,
}

impl Layout {
    pub fn new(viewer: Option<&Profile>, flash: Option<Flash>) -> Self {
        Self {
            viewer: viewer.map(ViewerView::from),
            flash: flash.map(FlashView::from),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerView {
    pub name: String,
    pub email: String,
    pub initials: String,
    pub avatar_url: Option<String>,
}

impl From<&Profile> for ViewerView {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.display_name().to_string(),
            email: profile.email.clone().unwrap_or_else(|| "No email set".to_string()),
            initials: profile.initials(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlashView {
    pub class: &'static str,
    pub message: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        Self {
            class: match flash.kind {
                FlashKind::Success => "flash flash-success",
                FlashKind::Error => "flash flash-error",
            },
            message: flash.message,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomePage {
    pub layout: Layout,
    pub boards: Vec<BoardView>,
}

#[derive(Debug, Clone)]
pub struct BoardView {
    pub slug: &'static str,
    pub title: &'static str,
    pub products: Vec<ProductCard>,
}

impl From<Leaderboard> for BoardView {
    fn from(board: Leaderboard) -> Self {
        Self {
            slug: board.window.slug(),
            title: board.title(),
            products: board.products.iter().map(ProductCard::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub website_url: String,
    pub logo_url: Option<String>,
    pub initial: String,
    pub upvotes_count: i64,
    pub comments_count: i64,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            tagline: product.tagline.clone(),
            website_url: product.website_url.clone(),
            logo_url: product.logo_url.clone(),
            initial: product.initial(),
            upvotes_count: product.upvotes_count,
            comments_count: product.comments_count,
        }
    }
}

#[derive(Template)]
#[template(path = "product.html")]
pub struct ProductPage {
    pub layout: Layout,
    pub product: Product,
    pub id: String,
    pub initial: String,
    pub embed_url: Option<String>,
    pub pricing: &'static str,
    pub platforms: Vec<&'static str>,
    pub is_upvoted: bool,
    pub upvote_label: &'static str,
    pub signed_in: bool,
    pub comments: Vec<CommentView>,
}

impl ProductPage {
    pub fn new(
        layout: Layout,
        product: Product,
        is_upvoted: bool,
        comments: Vec<CommentEntry>,
        now: DateTime<Utc>,
    ) -> Self {
        let signed_in = layout.viewer.is_some();
        Self {
            id: product.id.to_string(),
            initial: product.initial(),
            embed_url: product.embed_demo_url(),
            pricing: product.pricing_model.label(),
            platforms: product.platforms.iter().map(|p| p.as_str()).collect(),
            upvote_label: if is_upvoted { "Upvoted" } else { "Upvote" },
            comments: comments
                .into_iter()
                .map(|entry| CommentView::new(entry, now))
                .collect(),
            layout,
            product,
            is_upvoted,
            signed_in,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub id: String,
    pub author_name: String,
    pub author_initial: String,
    pub avatar_url: Option<String>,
    pub content: String,
    pub when: String,
    pub indent: usize,
    /// Replies border-join their previous sibling
    pub class: &'static str,
    pub is_edited: bool,
    pub is_flagged: bool,
    pub can_reply: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_flag: bool,
}

impl CommentView {
    pub fn new(entry: CommentEntry, now: DateTime<Utc>) -> Self {
        let is_reply = entry.depth > 0;
        let class = match (is_reply, entry.is_first) {
            (false, _) => "comment",
            (true, true) => "comment reply",
            (true, false) => "comment reply joined",
        };
        Self {
            id: entry.comment.id.to_string(),
            author_initial: entry.author.initial(),
            author_name: entry.author.name,
            avatar_url: entry.author.avatar_url,
            when: relative_time(entry.comment.created_at, now),
            is_edited: entry.comment.is_edited(),
            is_flagged: entry.comment.is_flagged,
            content: entry.comment.content,
            indent: entry.depth * 2,
            class,
            can_reply: entry.can_reply,
            can_edit: entry.can_edit,
            can_delete: entry.can_delete,
            can_flag: entry.can_flag,
        }
    }
}

#[derive(Template)]
#[template(path = "new_product.html")]
pub struct NewProductPage {
    pub layout: Layout,
    pub form: ProductFormView,
    pub errors: Vec<String>,
    pub pricing_options: Vec<ChoiceView>,
    pub platform_options: Vec<ChoiceView>,
}

impl NewProductPage {
    pub fn new(layout: Layout, draft: &ProductDraft, errors: Vec<String>) -> Self {
        let pricing = if draft.pricing_model.is_empty() {
            PricingModel::default().as_str()
        } else {
            draft.pricing_model.as_str()
        };
        Self {
            layout,
            form: ProductFormView::from(draft),
            errors,
            pricing_options: PricingModel::ALL
                .into_iter()
                .map(|p| ChoiceView {
                    value: p.as_str(),
                    label: p.label(),
                    selected: p.as_str() == pricing,
                })
                .collect(),
            platform_options: Platform::ALL
                .into_iter()
                .map(|p| ChoiceView {
                    value: p.as_str(),
                    label: p.as_str(),
                    selected: draft.platforms.iter().any(|s| s == p.as_str()),
                })
                .collect(),
        }
    }
}

/// Form values echoed back after a failed submission.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub name: String,
    pub tagline: String,
    pub website_url: String,
    pub is_open_source: bool,
    pub repo_url: String,
    pub description: String,
    pub tags: String,
    pub logo_url: String,
    pub demo_url: String,
    pub promo_code: String,
    pub twitter_url: String,
    pub linkedin_url: String,
    pub product_hunt_url: String,
}

impl From<&ProductDraft> for ProductFormView {
    fn from(draft: &ProductDraft) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: draft.name.clone(),
            tagline: draft.tagline.clone(),
            website_url: draft.website_url.clone(),
            is_open_source: draft.is_open_source,
            repo_url: text(&draft.repo_url),
            description: draft.description.clone(),
            tags: draft.tags.join(", "),
            logo_url: text(&draft.logo_url),
            demo_url: text(&draft.demo_url),
            promo_code: text(&draft.promo_code),
            twitter_url: text(&draft.twitter_url),
            linkedin_url: text(&draft.linkedin_url),
            product_hunt_url: text(&draft.product_hunt_url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChoiceView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub layout: Layout,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupPage {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub layout: Layout,
    pub status: u16,
    pub title: &'static str,
    pub message: String,
}

/// "5 minutes ago" / "in 2 days", whole units, rounded.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    let delta = (now - then).num_seconds();
    let secs = delta.abs();
    let rounded = |unit: i64| (secs + unit / 2) / unit;
    let (n, unit) = match secs {
        s if s < MINUTE => (s, "second"),
        s if s < HOUR => (rounded(MINUTE), "minute"),
        s if s < DAY => (rounded(HOUR), "hour"),
        s if s < MONTH => (rounded(DAY), "day"),
        s if s < YEAR => (rounded(MONTH), "month"),
        _ => (rounded(YEAR), "year"),
    };
    let plural = if n == 1 { "" } else { "s" };
    if delta < 0 {
        format!("in {n} {unit}{plural}")
    } else {
        format!("{n} {unit}{plural} ago")
    }
}
