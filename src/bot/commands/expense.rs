//! Expense Discord commands - `expense add`.
//!
//! The command author is always the payer. Shares are given as a comma-separated
//! list of `email:percent` entries and resolved to registered users before the
//! expense is recorded.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, author_caller, handlers::autocomplete},
        core::{
            expense::{self, NewExpense},
            group, report,
        },
        errors::{Error, Result},
    };

    /// Parent command for recording expenses.
    #[poise::command(slash_command, subcommands("expense_add"))]
    pub async fn expense(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Expense command. Available subcommands:\n`/expense add` - Record an expense you paid")
            .await?;
        Ok(())
    }

    /// Records an expense you paid and splits it between group members by percentage.
    #[poise::command(slash_command, rename = "add")]
    pub async fn expense_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group the expense belongs to"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group_id: i64,
        #[description = "Total amount paid (e.g., 42.50)"] amount: String,
        #[description = "Shares as email:percent, comma separated (e.g., a@x.com:50, b@x.com:50)"]
        shares: String,
        #[description = "Optional description of the expense"] description: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let caller = author_caller(ctx).await?;

        let amount = expense::parse_amount(&amount)?;
        let shares = expense::resolve_shares(db, expense::parse_shares(&shares)?).await?;
        let participants = shares.len();

        let recorded = expense::create_expense(
            db,
            &caller,
            NewExpense {
                group_id,
                amount,
                description,
                shares,
            },
            &data.settings.ledger.share_policy(),
        )
        .await?;

        let group_name = group::require_group(db, group_id).await?.name;
        ctx.say(format!(
            "✅ Recorded {} in **{group_name}** split between {participants} member{} (Expense ID: {})",
            report::format_currency(recorded.amount),
            if participants == 1 { "" } else { "s" },
            recorded.id
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
