//! Balance Discord commands - `balances` and `settle`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, author_caller, handlers::autocomplete, member_caller},
        core::{balance, expense, report, settlement, user},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Shows who owes whom in a group.
    ///
    /// Each direction is listed separately; amounts owed both ways are not netted.
    #[poise::command(slash_command)]
    pub async fn balances(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to show balances for"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let (_, target) = member_caller(ctx, group_id).await?;
        let balances = balance::get_balances_with_names(db, group_id).await?;

        let description = if balances.is_empty() {
            "Everyone is settled up. 🎉".to_string()
        } else {
            balances
                .iter()
                .map(|b| {
                    format!(
                        "• **{}** owes **{}** {}",
                        b.debtor_name,
                        b.creditor_name,
                        report::format_currency(b.amount)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("💸 Balances in {}", target.name))
            .description(description)
            .color(0x00E6_7E22);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Pays back money you owe another member of a group.
    ///
    /// The payment is applied to your oldest unpaid shares of their expenses first.
    #[poise::command(slash_command)]
    pub async fn settle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group the debt belongs to"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group_id: i64,
        #[description = "Email of the member you are paying"] to: String,
        #[description = "Amount to pay (e.g., 20.00)"] amount: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let caller = author_caller(ctx).await?;

        let amount = expense::parse_amount(&amount)?;
        let payee = user::get_user_by_email(db, &to)
            .await?
            .ok_or_else(|| Error::UserNotFound {
                identifier: to.trim().to_string(),
            })?;

        let record = settlement::settle(db, group_id, caller.user_id, payee.id, amount).await?;

        let remaining: f64 = balance::get_balances(db, group_id)
            .await?
            .iter()
            .filter(|b| b.debtor_id == caller.user_id && b.creditor_id == payee.id)
            .map(|b| b.amount)
            .sum();

        ctx.say(format!(
            "✅ Paid {} to **{}**. You still owe them {}.",
            report::format_currency(record.amount),
            payee.name,
            report::format_currency(remaining)
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
