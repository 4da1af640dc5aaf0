pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    openai::{OpenAiClient, OpenAiConfig, RetryPolicy},
    storage::LocalStorage,
};
pub use crate::core::planner::{MealPlanner, RESULT_FILE_NAME};
pub use domain::model::{FoodItemWithQuantity, GroceryList, MealPlan, Menu, Profile};
pub use domain::ports::{CompletionClient, CompletionOptions, Storage};
pub use utils::error::{CompletionError, PlannerError, Result};
