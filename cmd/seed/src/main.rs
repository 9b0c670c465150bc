//! Fills a development database with demo profiles, products, upvotes and
//! a short comment thread. Every seeded account uses the password
//! `saaslist-demo`.

use anyhow::Context;
use auth_adapters::Argon2Hasher;
use chrono::{Duration, Utc};
use configs::Settings;
use domains::{
    CommentRepository, DomainError, NewComment, NewProduct, PasswordHasher, Platform,
    PricingModel, Product, ProductRepository, Profile, ProfileRepository, UpvoteRepository,
};
use secrecy::ExposeSecret;
use storage_adapters::PgStore;
use tracing::{info, warn};
use uuid::Uuid;

const DEMO_PASSWORD: &str = "saaslist-demo";

struct DemoProduct {
    name: &'static str,
    tagline: &'static str,
    website: &'static str,
    tags: &'static [&'static str],
    pricing: PricingModel,
    platforms: &'static [Platform],
    age: Duration,
}

fn catalog() -> Vec<DemoProduct> {
    vec![
        DemoProduct {
            name: "Invoicely",
            tagline: "Invoices for freelancers",
            website: "https://invoicely.example.com",
            tags: &["finance", "billing"],
            pricing: PricingModel::Freemium,
            platforms: &[Platform::Web],
            age: Duration::hours(2),
        },
        DemoProduct {
            name: "Standup Bot",
            tagline: "Async standups in Slack",
            website: "https://standup.example.com",
            tags: &["productivity", "slack"],
            pricing: PricingModel::Premium,
            platforms: &[Platform::Web, Platform::Api],
            age: Duration::hours(30),
        },
        DemoProduct {
            name: "Tabby",
            tagline: "Tab groups that sync everywhere",
            website: "https://tabby.example.com",
            tags: &["browser"],
            pricing: PricingModel::Free,
            platforms: &[Platform::BrowserExtension],
            age: Duration::days(4),
        },
        DemoProduct {
            name: "Pingwise",
            tagline: "Uptime checks with sane alerts",
            website: "https://pingwise.example.com",
            tags: &["devops", "monitoring", "alerts"],
            pricing: PricingModel::Freemium,
            platforms: &[Platform::Web, Platform::Ios, Platform::Android],
            age: Duration::days(20),
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let settings = Settings::load().context("failed to load configuration")?;
    let store = PgStore::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("failed to connect to postgres")?;
    store.migrate().await.context("failed to run migrations")?;

    let hasher = Argon2Hasher::new();
    let mut users = Vec::new();
    for (name, email) in [
        ("Ada Lovelace", "ada@example.com"),
        ("Grace Hopper", "grace@example.com"),
        ("Linus Torvalds", "linus@example.com"),
    ] {
        users.push(profile(&store, &hasher, name, email).await?);
    }

    let now = Utc::now();
    let mut products = Vec::new();
    let mut created = Vec::new();
    for (i, demo) in catalog().into_iter().enumerate() {
        let maker = &users[i % users.len()];
        let (product, is_new) = product(&store, maker.id, demo, now).await?;
        products.push(product);
        created.push(is_new);
    }

    // Earlier products collect more votes.
    for (i, product) in products.iter().enumerate() {
        for voter in users.iter().skip(i) {
            match UpvoteRepository::insert(&store, voter.id, product.id).await {
                Ok(_) | Err(DomainError::Conflict(_)) => {}
                Err(err) => return Err(err).context("failed to seed upvote"),
            }
        }
    }

    // Re-runs leave the existing thread alone.
    if let (Some(first), Some(true)) = (products.first(), created.first()) {
        thread(&store, first.id, &users, now).await?;
    }
    info!(
        profiles = users.len(),
        products = products.len(),
        "seed complete; password for every account is {DEMO_PASSWORD}"
    );
    Ok(())
}

async fn profile(
    store: &PgStore,
    hasher: &Argon2Hasher,
    name: &str,
    email: &str,
) -> anyhow::Result<Profile> {
    if let Some(existing) = store.find_credentials(email).await? {
        warn!(email, "profile already seeded");
        return Ok(existing.profile);
    }
    let profile = Profile {
        id: Uuid::new_v4(),
        name: Some(name.to_string()),
        avatar_url: None,
        email: Some(email.to_string()),
    };
    ProfileRepository::insert(store, profile.clone(), hasher.hash(DEMO_PASSWORD)?).await?;
    Ok(profile)
}

async fn product(
    store: &PgStore,
    maker: Uuid,
    demo: DemoProduct,
    now: chrono::DateTime<Utc>,
) -> anyhow::Result<(Product, bool)> {
    if let Some(existing) = store.find_product_named(maker, demo.name).await? {
        warn!(name = demo.name, "product already seeded");
        return Ok((existing, false));
    }
    let product = ProductRepository::insert(
        store,
        NewProduct {
            name: demo.name.to_string(),
            tagline: demo.tagline.to_string(),
            description: format!(
                "{} is a demo listing seeded for local development. {}.",
                demo.name, demo.tagline
            ),
            website_url: demo.website.to_string(),
            repo_url: None,
            logo_url: None,
            demo_url: None,
            pricing_model: demo.pricing,
            promo_code: None,
            tags: demo.tags.iter().map(|t| t.to_string()).collect(),
            twitter_url: None,
            linkedin_url: None,
            product_hunt_url: None,
            platforms: demo.platforms.to_vec(),
            user_id: maker,
            created_at: now - demo.age,
        },
    )
    .await?;
    Ok((product, true))
}

async fn thread(
    store: &PgStore,
    product_id: Uuid,
    users: &[Profile],
    now: chrono::DateTime<Utc>,
) -> anyhow::Result<()> {
    let mut parent_id = None;
    let lines = [
        "Love the clean invoice templates.",
        "Agreed, the reminders saved me hours last month.",
        "Do reminders support custom wording?",
    ];
    for (i, (content, author)) in lines.iter().zip(users.iter().cycle()).enumerate() {
        let comment = CommentRepository::insert(
            store,
            NewComment {
                product_id,
                user_id: author.id,
                parent_id,
                content: content.to_string(),
                created_at: now - Duration::minutes(30 - i as i64 * 10),
            },
        )
        .await?;
        parent_id = Some(comment.id);
    }
    Ok(())
}
