//! Autocomplete handlers for Discord slash command parameters.
//!
//! Commands take a group id. These handlers let the user pick it by name from the
//! groups they belong to instead of remembering numbers.

use crate::{
    bot::BotData,
    core::{group, user},
    entities::expense_group,
    errors::Error,
};
use poise::serenity_prelude as serenity;

/// Discord caps autocomplete responses at 25 entries.
const MAX_CHOICES: usize = 25;

/// Keeps the groups whose name contains `partial` (case-insensitive), sorted by name.
#[must_use]
pub fn matching_groups(
    groups: Vec<expense_group::Model>,
    partial: &str,
) -> Vec<expense_group::Model> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<_> = groups
        .into_iter()
        .filter(|g| g.name.to_lowercase().contains(&partial_lower))
        .collect();
    matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    matching.truncate(MAX_CHOICES);
    matching
}

/// Provides autocomplete suggestions for the groups the author belongs to.
///
/// Each choice is labelled `name (#id)` and carries the group id as its value.
/// Unregistered authors get no suggestions.
pub async fn autocomplete_group(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let db = &ctx.data().database;

    let Ok(caller) = user::resolve_caller(db, &ctx.author().id.to_string()).await else {
        return Vec::new();
    };
    let Ok(groups) = group::get_groups_for_user(db, caller.user_id).await else {
        return Vec::new();
    };

    matching_groups(groups, partial)
        .into_iter()
        .map(|g| serenity::AutocompleteChoice::new(format!("{} (#{})", g.name, g.id), g.id))
        .collect()
}
