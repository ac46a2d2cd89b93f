//! Account Discord commands - `register`.
//!
//! Registration links the Discord account running the command to a new ledger user,
//! so every later command can resolve its author without a login step.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::user::{self, NewUser},
        errors::{Error, Result},
    };

    /// Creates your SplitBuddy account and links it to your Discord account.
    ///
    /// The reply is ephemeral since the command carries a password.
    #[poise::command(slash_command, ephemeral)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Display name"] name: String,
        #[description = "Email address other members will use to add you"] email: String,
        #[description = "Password"] password: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let discord_id = ctx.author().id.to_string();

        if let Some(existing) = user::get_user_by_discord_id(db, &discord_id).await? {
            ctx.say(format!(
                "ℹ️ Your Discord account is already registered as **{}** ({}).",
                existing.name, existing.email
            ))
            .await?;
            return Ok(());
        }

        let registered = user::register_user(
            db,
            NewUser {
                name,
                email,
                password,
                discord_id: Some(discord_id),
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Registered **{}** ({}). Use `/group create` to start a group.",
            registered.name, registered.email
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
