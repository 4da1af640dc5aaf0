use crate::core::generator::{generate_grocery_list, generate_menu};
use crate::core::{CompletionClient, CompletionOptions, MealPlan, Profile, Storage};
use crate::utils::error::Result;

/// File the finished plan is written to, relative to the storage root.
pub const RESULT_FILE_NAME: &str = "result.json";

pub struct MealPlanner<C: CompletionClient, S: Storage> {
    client: C,
    storage: S,
    options: CompletionOptions,
}

impl<C: CompletionClient, S: Storage> MealPlanner<C, S> {
    pub fn new(client: C, storage: S, options: CompletionOptions) -> Self {
        Self {
            client,
            storage,
            options,
        }
    }

    /// Generates the menu, then the grocery list for it, and writes both to
    /// [`RESULT_FILE_NAME`]. Nothing is written unless both stages succeed.
    pub async fn run(
        &self,
        language: &str,
        profile: &Profile,
        additional_notes: &str,
    ) -> Result<MealPlan> {
        tracing::info!(
            "Starting meal plan generation (language: {}, model: {})",
            language,
            self.options.model
        );

        // Stage 1
        let menu = generate_menu(
            &self.client,
            &self.options,
            language,
            profile,
            additional_notes,
        )
        .await?;

        // Stage 2
        let grocery_list =
            generate_grocery_list(&self.client, &self.options, language, &menu).await?;

        let plan = MealPlan { menu, grocery_list };

        let json_data = serde_json::to_string_pretty(&plan)?;
        tracing::debug!("Writing {} ({} bytes)", RESULT_FILE_NAME, json_data.len());
        self.storage
            .write_file(RESULT_FILE_NAME, json_data.as_bytes())
            .await?;

        Ok(plan)
    }
}
