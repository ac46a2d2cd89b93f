//! Group Discord commands - `group create`, `group add_member`, `group members`, `group show`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, author_caller, handlers::autocomplete, member_caller},
        core::{group, report},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Expenses shown by `/group show`; Discord caps an embed at 25 fields.
    const SHOWN_EXPENSES: usize = 10;

    /// Parent command for creating and inspecting expense groups.
    #[poise::command(
        slash_command,
        subcommands("group_create", "group_add_member", "group_members", "group_show")
    )]
    pub async fn group(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Group command. Available subcommands:\n\
            `/group create` - Create a new group\n\
            `/group add_member` - Add a registered user by email\n\
            `/group members` - List a group's members\n\
            `/group show` - Show a group's members and expenses";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a group with you as its first member.
    #[poise::command(slash_command, rename = "create")]
    pub async fn group_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group name (e.g., 'Flatmates')"] name: String,
        #[description = "Optional description"] description: Option<String>,
    ) -> Result<()> {
        let caller = author_caller(ctx).await?;
        let created =
            group::create_group(&ctx.data().database, &caller, &name, description).await?;

        ctx.say(format!(
            "✅ Created group **{}** (#{}). Add people with `/group add_member`.",
            created.name, created.id
        ))
        .await?;
        Ok(())
    }

    /// Adds a registered user to a group you belong to.
    #[poise::command(slash_command, rename = "add_member")]
    pub async fn group_add_member(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to add the member to"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group_id: i64,
        #[description = "Email the member registered with"] email: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let (_, target) = member_caller(ctx, group_id).await?;

        group::add_member(db, group_id, &email).await?;

        ctx.say(format!(
            "✅ Added {} to **{}**.",
            email.trim(),
            target.name
        ))
        .await?;
        Ok(())
    }

    /// Lists the members of a group.
    #[poise::command(slash_command, rename = "members")]
    pub async fn group_members(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to list"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let (_, target) = member_caller(ctx, group_id).await?;
        let members = group::get_group_members(db, group_id).await?;

        let lines: Vec<String> = members
            .iter()
            .map(|m| format!("• **{}** ({}) since {}", m.name, m.email, m.joined_at))
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title(format!("👥 {} members", target.name))
            .description(lines.join("\n"))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows a group's members and its most recent expenses with their splits.
    #[poise::command(slash_command, rename = "show")]
    pub async fn group_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Group to show"]
        #[autocomplete = "autocomplete::autocomplete_group"]
        group_id: i64,
    ) -> Result<()> {
        member_caller(ctx, group_id).await?;
        let details = report::group_details(&ctx.data().database, group_id).await?;

        let member_names: Vec<&str> = details.members.iter().map(|m| m.name.as_str()).collect();
        let mut description = format!("**Members:** {}", member_names.join(", "));
        if let Some(text) = &details.group.description {
            description = format!("{text}\n{description}");
        }

        let fields: Vec<(String, String, bool)> = details
            .expenses
            .iter()
            .take(SHOWN_EXPENSES)
            .map(|detail| {
                let label = if detail.expense.description.is_empty() {
                    "Expense"
                } else {
                    detail.expense.description.as_str()
                };
                let name = format!(
                    "{label} - {} paid by {}",
                    report::format_currency(detail.expense.amount),
                    detail.payer_name
                );
                let splits: Vec<String> = detail
                    .splits
                    .iter()
                    .map(|s| {
                        let marker = if s.split.settled { " ✅" } else { "" };
                        format!(
                            "{}: {}{marker}",
                            s.user_name,
                            report::format_currency(s.split.share_amount)
                        )
                    })
                    .collect();
                let value = format!("{}\n{}", detail.expense.expense_date, splits.join(", "));
                (name, value, false)
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title(format!("📒 {} (#{})", details.group.name, details.group.id))
            .description(description)
            .color(0x0034_98DB)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} expense{}",
                details.expenses.len(),
                if details.expenses.len() == 1 { "" } else { "s" }
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
