//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**SplitBuddy Help**\n\
        Track shared expenses with your groups and settle up.\n\n\
        **Getting Started**\n\
        • `/register <name> <email> <password>` - Creates your account and links it to Discord.\n\
        • `/group create <name> [description]` - Creates a group with you as its first member.\n\
        • `/group add_member <group> <email>` - Adds a registered user to a group.\n\n\
        **Expenses**\n\
        • `/expense add <group> <amount> <shares> [description]` - Records an expense you paid. `shares` lists each participant's percentage, e.g. `alice@example.com:50, bob@example.com:50`.\n\n\
        **Balances**\n\
        • `/balances <group>` - Shows who owes whom in a group.\n\
        • `/settle <group> <to> <amount>` - Pays back what you owe another member.\n\
        • `/dashboard` - Shows your groups, recent expenses, and what you owe.\n\
        • `/group show <group>` - Shows a group's members and expenses.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
