//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the SplitBuddy ledger,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (account, group, expense, balance, report, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::AppConfig,
    core::{
        group,
        user::{self, Caller},
    },
    entities::expense_group,
    errors::{Error, Failure, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the loaded settings
/// that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Application settings loaded at startup
    pub settings: AppConfig,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection and settings.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: AppConfig) -> Self {
        Self { database, settings }
    }
}

/// Resolves the author of a command to a ledger [`Caller`].
///
/// Authors who have not run `/register` get [`Error::UserNotFound`].
pub async fn author_caller(ctx: poise::Context<'_, BotData, Error>) -> Result<Caller> {
    user::resolve_caller(&ctx.data().database, &ctx.author().id.to_string()).await
}

/// Resolves the author and checks they belong to `group_id`.
///
/// Group views and writes go through this so nobody can read a group by guessing its id.
pub async fn member_caller(
    ctx: poise::Context<'_, BotData, Error>,
    group_id: i64,
) -> Result<(Caller, expense_group::Model)> {
    let caller = author_caller(ctx).await?;
    let group = group::require_member(&ctx.data().database, group_id, caller.user_id).await?;
    Ok((caller, group))
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let failure = Failure::from(&error);
            error!(
                command = %ctx.command().name,
                kind = %failure.kind,
                "Command failed: {}",
                failure.cause
            );
            if let Err(e) = ctx.say(format!("❌ {failure}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// All slash commands the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::register(),
        commands::group(),
        commands::expense(),
        commands::balances(),
        commands::settle(),
        commands::dashboard(),
    ]
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// Commands are registered globally, or only in `bot.dev_guild_id` when that is set,
/// which makes changes show up immediately during development.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let dev_guild = data.settings.bot.dev_guild_id.map(serenity::GuildId::new);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if let Some(guild_id) = dev_guild {
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                        .await?;
                    info!(%guild_id, "Registered commands in development guild");
                } else {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Registered commands globally");
                }
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;

    Ok(())
}
