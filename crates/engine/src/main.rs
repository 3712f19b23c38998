//! MushWorld Engine - Main entry point.
//!
//! Builds the in-memory world, walks a character through it as the system
//! subject and logs every event the walk produced.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mushworld_domain::{Character, Containment, Exit, Location, LocationType, Object, PlayerId};
use mushworld_engine::infrastructure::{grants::SYSTEM_SUBJECT, settings::WorldSettings};
use mushworld_engine::request_context::RequestContext;
use mushworld_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mushworld_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MushWorld Engine");

    let settings = WorldSettings::from_env();
    tracing::info!(
        "Event emission configured with retry: max_retries={}, base_delay_ms={}",
        settings.retry.max_retries,
        settings.retry.base_delay_ms
    );
    let app = App::in_memory(settings);

    walkthrough(&app).await?;

    for stream in app.event_log.streams().await {
        for event in app.event_log.read_stream(&stream).await {
            tracing::info!(
                stream = %event.stream,
                event_type = %event.event_type,
                actor = %event.actor,
                payload = %String::from_utf8_lossy(&event.payload),
                "event"
            );
        }
    }
    tracing::info!(events = app.event_log.len().await, "Walkthrough complete");
    Ok(())
}

/// Two rooms joined both ways, one visitor and a lamp.
async fn walkthrough(app: &App) -> anyhow::Result<()> {
    let ctx = RequestContext::new();
    let service = &app.world_service;
    let now = chrono::Utc::now();

    let square = service
        .create_location(
            &ctx,
            SYSTEM_SUBJECT,
            Location::new(LocationType::Persistent, "Town Square", "A cobbled square.", now),
        )
        .await
        .context("creating Town Square")?;
    let inn = service
        .create_location(
            &ctx,
            SYSTEM_SUBJECT,
            Location::new(LocationType::Persistent, "The Inn", "Warm and noisy.", now),
        )
        .await
        .context("creating The Inn")?;
    let replay = service
        .replay_limit(&ctx, SYSTEM_SUBJECT, inn.id())
        .await
        .context("reading replay policy")?;
    tracing::info!(location = inn.name(), %replay, "Replay policy");

    let door = Exit::new(square.id(), inn.id(), "inn", now)?
        .with_aliases(["in"])
        .with_return("out");
    let door = service
        .create_exit(&ctx, SYSTEM_SUBJECT, door)
        .await
        .context("creating exit pair")?;

    let visitor = service
        .create_character(&ctx, SYSTEM_SUBJECT, Character::new(PlayerId::new(), "visitor", now)?)
        .await
        .context("creating character")?;
    service
        .move_character(&ctx, SYSTEM_SUBJECT, visitor.id(), square.id())
        .await
        .context("placing character")?;

    let exit = service
        .find_exit(&ctx, SYSTEM_SUBJECT, square.id(), "in")
        .await
        .context("resolving exit")?;
    service
        .move_character(&ctx, SYSTEM_SUBJECT, visitor.id(), exit.to_location_id())
        .await
        .context("walking through exit")?;

    let lamp = service
        .create_object(
            &ctx,
            SYSTEM_SUBJECT,
            Object::new("brass lamp", Containment::in_location(inn.id()), now)?,
        )
        .await
        .context("creating lamp")?;
    service
        .examine_object(&ctx, SYSTEM_SUBJECT, visitor.id(), lamp.id())
        .await
        .context("examining lamp")?;

    let deletion = service
        .delete_exit(&ctx, SYSTEM_SUBJECT, door.id())
        .await
        .context("deleting exit pair")?;
    tracing::info!(?deletion, "Exit removed");
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
