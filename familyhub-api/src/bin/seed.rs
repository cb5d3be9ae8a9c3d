//! # FamilyHub development data loader
//!
//! Applies migrations and loads a small household: two users, one family
//! with both as members, two labels, a single task and a routine task.
//! Everything goes through the service layer, in one transaction.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p familyhub-api --bin familyhub-seed            # migrate + seed
//! cargo run -p familyhub-api --bin familyhub-seed -- --reset # drop schema first
//! ```

use anyhow::Context;
use chrono::{Duration, Utc};
use familyhub_api::config::Config;
use familyhub_shared::{
    auth::CurrentUser,
    db::{migrations, pool, session},
    models::{
        family::{CreateFamily, Family},
        label::CreateLabel,
        membership::{AddMember, MembershipRole},
        routine::{RepeatEvery, RoutineSettings},
        task::{CreateTask, TaskType},
        user::{CreateUser, User},
    },
    services::{family as family_service, label as label_service, task as task_service},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FAMILY_NAME: &str = "Smith Family";

async fn ensure_user(
    conn: &mut sqlx::PgConnection,
    subject: &str,
    name: &str,
    email: &str,
) -> anyhow::Result<User> {
    if let Some(user) = User::find_by_oidc_subject(&mut *conn, subject).await? {
        return Ok(user);
    }

    let user = User::create(
        &mut *conn,
        CreateUser {
            oidc_subject: subject.to_string(),
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            avatar_url: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, name, "Seeded user");
    Ok(user)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "familyhub_seed=info,familyhub_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let reset = std::env::args().skip(1).any(|arg| arg == "--reset");

    let db = pool::create_pool(config.database.pool_config()?).await?;

    if reset {
        tracing::warn!("Dropping and recreating the public schema");
        migrations::reset_schema(&db).await?;
    }
    migrations::run_migrations(&db)
        .await
        .context("applying migrations")?;

    let mut tx = session::begin(&db).await?;

    if Family::find_by_name(&mut tx, FAMILY_NAME).await?.is_some() {
        tracing::info!("Seed data already present, nothing to do");
        pool::close_pool(db).await;
        return Ok(());
    }

    let alice = ensure_user(&mut tx, "dev|alice", "Alice Smith", "alice@example.com").await?;
    let bob = ensure_user(&mut tx, "dev|bob", "Bob Smith", "bob@example.com").await?;
    let owner = CurrentUser::from(&alice);

    let family = family_service::create_family_with_owner(
        &mut tx,
        &CreateFamily {
            family_name: FAMILY_NAME.to_string(),
        },
        &owner,
    )
    .await?;

    family_service::add_member(
        &mut tx,
        family.id,
        &owner,
        &AddMember {
            user_id: bob.id,
            role: MembershipRole::Member,
        },
    )
    .await?;

    let chores = label_service::create_label(
        &mut tx,
        &CreateLabel {
            name: "Chores".to_string(),
            color: Some("#FFDDC1".to_string()),
        },
        family.id,
        &owner,
    )
    .await?;

    let groceries = label_service::create_label(
        &mut tx,
        &CreateLabel {
            name: "Groceries".to_string(),
            color: Some("#C1FFD7".to_string()),
        },
        family.id,
        &owner,
    )
    .await?;

    task_service::create_task(
        &mut tx,
        &CreateTask {
            title: "Buy milk".to_string(),
            priority: Some(2),
            due_date: Some((Utc::now() + Duration::days(1)).date_naive()),
            assignee_id: Some(bob.id),
            label_ids: Some(vec![groceries.id]),
            ..Default::default()
        },
        family.id,
        &owner,
    )
    .await?;

    task_service::create_task(
        &mut tx,
        &CreateTask {
            title: "Take out trash".to_string(),
            task_type: TaskType::Routine,
            routine_settings: Some(RoutineSettings {
                repeat_every: RepeatEvery::Weekly,
                weekdays: Some(vec![0, 3]),
                day_of_month: None,
            }),
            assignee_id: Some(alice.id),
            label_ids: Some(vec![chores.id]),
            ..Default::default()
        },
        family.id,
        &owner,
    )
    .await?;

    session::commit(tx).await?;

    tracing::info!(
        family_id = family.id,
        alice = alice.id,
        bob = bob.id,
        "Seed complete; use X-User-Id: {} to act as Alice",
        alice.id
    );

    pool::close_pool(db).await;
    Ok(())
}
