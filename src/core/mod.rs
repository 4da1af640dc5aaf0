pub mod generator;
pub mod planner;
pub mod prompt;
pub mod schema;

pub use crate::domain::model::{
    ActivityLevel, FoodItemWithQuantity, Gender, GroceryList, MealPlan, MeasurementSystem, Menu,
    Profile,
};
pub use crate::domain::ports::{CompletionClient, CompletionOptions, Storage};
pub use crate::utils::error::Result;
