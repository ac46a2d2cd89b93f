//! Report Discord commands - `dashboard`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, author_caller},
        core::report,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Shows your groups, the latest expenses across them, and what you owe.
    #[poise::command(slash_command, ephemeral)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let caller = author_caller(ctx).await?;
        let board = report::dashboard(
            &data.database,
            caller.user_id,
            data.settings.ledger.recent_expense_limit,
        )
        .await?;

        let groups = if board.groups.is_empty() {
            "You are not in any group yet. Use `/group create` to start one.".to_string()
        } else {
            board
                .groups
                .iter()
                .map(|g| format!("• {} (#{})", g.name, g.id))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let recent = if board.recent_expenses.is_empty() {
            "No expenses yet.".to_string()
        } else {
            board
                .recent_expenses
                .iter()
                .map(|s| {
                    format!(
                        "• {} {} paid {} in {}{}",
                        s.expense.expense_date,
                        s.payer_name,
                        report::format_currency(s.expense.amount),
                        s.group_name,
                        if s.expense.description.is_empty() {
                            String::new()
                        } else {
                            format!(" ({})", s.expense.description)
                        }
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("📊 Dashboard for {}", board.user.name))
            .color(0x0034_98DB)
            .field("Groups", groups, false)
            .field("Recent expenses", recent, false)
            .field(
                "You owe",
                report::format_currency(board.total_owed),
                false,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
