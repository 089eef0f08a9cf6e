//! Demo data seeder for Voice Anchors development and testing.
//!
//! Seeds members, applications, and activity posts through the same adapter
//! the server uses, so it works against either hosted provider.
//!
//! Usage: cargo run --bin seeder
//!
//! Set `ANCHORS_SEED_TOKEN` to sign requests with a user access token
//! instead of the configured keys.

use anchors_core::application::{ApplicationStatus, NewApplication, ReviewDecision};
use anchors_core::media::{MEDIA_BUCKET, MediaKind, NewMediaUpload};
use anchors_core::member::NewMember;
use anchors_db::{Backend, RepositoryError, Session};
use anchors_shared::AppConfig;
use anyhow::Context;
use chrono::Utc;

const DEMO_MEMBERS: &[(&str, &str, &str)] = &[
    ("anchor_demo", "demo123", "anchor.demo@voiceanchors.test"),
    ("night_owl", "demo123", "night.owl@voiceanchors.test"),
    ("morning_voice", "demo123", "morning.voice@voiceanchors.test"),
];

const DEMO_APPLICATIONS: &[(&str, &str, Option<ReviewDecision>)] = &[
    ("fan.one@voiceanchors.test", "@fanone", None),
    ("fan.two@voiceanchors.test", "fantwo", Some(ReviewDecision::Approve)),
    ("fan.three@voiceanchors.test", "@fanthree", Some(ReviewDecision::Reject)),
];

const DEMO_ACTIVITIES: &[(&str, &str, &str, MediaKind)] = &[
    ("Community meetup", "Our first offline meetup.", "demo-meetup.jpg", MediaKind::Photo),
    ("Live highlights", "Best moments from the weekly live.", "demo-live.mp4", MediaKind::Video),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let backend = Backend::connect(&config.backend).context("Failed to configure backend")?;
    println!("Using {} at {}", backend.provider().name(), config.backend.base_url);

    if let Ok(token) = std::env::var("ANCHORS_SEED_TOKEN") {
        backend.sessions().store_session(Some(Session::with_token(token)));
        println!("Signing requests with ANCHORS_SEED_TOKEN");
    }

    println!("Seeding members...");
    seed_members(&backend).await?;

    println!("Seeding applications...");
    seed_applications(&backend).await?;

    println!("Seeding activities...");
    seed_activities(&backend).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Seeds demo members, skipping ones that already exist.
async fn seed_members(backend: &Backend) -> anyhow::Result<()> {
    let members = backend.members();
    for (username, password, email) in DEMO_MEMBERS {
        match members.create(&NewMember::new(username, password, email)?).await {
            Ok(member) => println!("  Created member {} ({})", member.username, member.id),
            Err(RepositoryError::Duplicate(reason)) => {
                println!("  {reason} for {username}, skipping...");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Seeds applications, reviewing some of them.
async fn seed_applications(backend: &Backend) -> anyhow::Result<()> {
    let applications = backend.applications();
    let existing = applications.list().await?;

    for (email, handle, decision) in DEMO_APPLICATIONS {
        if existing.iter().any(|a| a.email == *email) {
            println!("  Application from {email} already exists, skipping...");
            continue;
        }
        let created = applications.submit(&NewApplication::new(email, handle)?).await?;
        let status = match decision {
            Some(decision) => {
                applications
                    .review(&created.id, *decision, "seeder", Utc::now())
                    .await?
                    .status
            }
            None => ApplicationStatus::Pending,
        };
        println!("  Application from {email}: {status}");
    }
    Ok(())
}

/// Seeds activity rows pointing at demo objects in the media bucket.
async fn seed_activities(backend: &Backend) -> anyhow::Result<()> {
    let media = backend.media();
    let existing = media.list().await?;

    for (title, description, key, kind) in DEMO_ACTIVITIES {
        if existing.iter().any(|m| m.title == *title) {
            println!("  Activity '{title}' already exists, skipping...");
            continue;
        }
        let url = backend.storage().public_url(MEDIA_BUCKET, key)?;
        let row = NewMediaUpload::new(title, Some(*description), url.into(), *kind)?;
        let created = media.create(&row).await?;
        println!("  Created activity '{}' ({})", created.title, created.id);
    }
    Ok(())
}
