use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasurementSystem {
    Metric,
    Imperial,
}

/// The person a menu is generated for. Weight and height are in kg/cm or lb/in
/// depending on `measurement_system`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub weight_goal: f64,
    pub weight_loss_per_week: f64,
    pub daily_calories: u32,
    #[serde(default)]
    pub allergies: BTreeSet<String>,
    #[serde(default)]
    pub regimes: BTreeSet<String>,
    pub measurement_system: MeasurementSystem,
}

impl Profile {
    /// Profile used when no profile file is given.
    pub fn sample() -> Self {
        Self {
            age: 30,
            weight: 70.0,
            height: 175.0,
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
            weight_goal: 68.0,
            weight_loss_per_week: 0.5,
            daily_calories: 2000,
            allergies: BTreeSet::from(["milk".to_string()]),
            regimes: BTreeSet::new(),
            measurement_system: MeasurementSystem::Metric,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItemWithQuantity {
    pub food: String,
    pub quantity: String,
}

impl FoodItemWithQuantity {
    pub fn new(food: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            food: food.into(),
            quantity: quantity.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub breakfast: Vec<FoodItemWithQuantity>,
    pub morning_snack: Vec<FoodItemWithQuantity>,
    pub lunch: Vec<FoodItemWithQuantity>,
    pub afternoon_snack: Vec<FoodItemWithQuantity>,
    pub dinner: Vec<FoodItemWithQuantity>,
    pub evening_snack: Vec<FoodItemWithQuantity>,
}

impl Menu {
    pub const MEAL_SLOTS: [&'static str; 6] = [
        "breakfast",
        "morning_snack",
        "lunch",
        "afternoon_snack",
        "dinner",
        "evening_snack",
    ];

    pub fn item_count(&self) -> usize {
        self.breakfast.len()
            + self.morning_snack.len()
            + self.lunch.len()
            + self.afternoon_snack.len()
            + self.dinner.len()
            + self.evening_snack.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroceryList(pub Vec<FoodItemWithQuantity>);

impl GroceryList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of one planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    pub menu: Menu,
    pub grocery_list: GroceryList,
}
