use crate::core::{prompt, schema, CompletionClient, CompletionOptions, GroceryList, Menu, Profile};
use crate::utils::error::Result;

/// Stage 1: asks the model for a daily menu matching `profile`.
pub async fn generate_menu<C: CompletionClient + ?Sized>(
    client: &C,
    options: &CompletionOptions,
    language: &str,
    profile: &Profile,
    additional_notes: &str,
) -> Result<Menu> {
    let prompt = prompt::menu_prompt(language, profile, additional_notes)?;
    tracing::debug!("Menu prompt rendered ({} chars)", prompt.len());

    let raw = client.complete(&prompt, options).await?;
    tracing::debug!("Menu response received ({} chars)", raw.len());

    let menu: Menu = schema::parse(&raw)?;
    tracing::info!("🍽️ Menu generated with {} items", menu.item_count());
    Ok(menu)
}

/// Stage 2: asks the model for the groceries needed to cook `menu`.
pub async fn generate_grocery_list<C: CompletionClient + ?Sized>(
    client: &C,
    options: &CompletionOptions,
    language: &str,
    menu: &Menu,
) -> Result<GroceryList> {
    let prompt = prompt::grocery_prompt(language, menu)?;
    tracing::debug!("Grocery prompt rendered ({} chars)", prompt.len());

    let raw = client.complete(&prompt, options).await?;
    tracing::debug!("Grocery response received ({} chars)", raw.len());

    let grocery_list: GroceryList = schema::parse(&raw)?;
    tracing::info!("🛒 Grocery list generated with {} items", grocery_list.len());
    Ok(grocery_list)
}
