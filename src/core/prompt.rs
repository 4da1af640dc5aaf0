use crate::core::schema;
use crate::core::{GroceryList, Menu, Profile};
use crate::utils::error::{PlannerError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("token pattern is valid"));

pub const MENU_TEMPLATE: &str = "You are a nutritionist with 20 years of experience. \
Please generate a daily menu in {language} for a person with the following profile: {profile}. \
Respect the following format: {format_instructions}. \
Additional notes: {additional_notes}";

pub const GROCERY_TEMPLATE: &str = "You are a nutritionist with 20 years of experience. \
For the following menu: {menu}, please create a grocery list for your client in {language}. \
You should respect the following format: {format_instructions}.";

/// Substitutes every `{name}` token in `template` in a single pass.
///
/// Substituted values are not scanned again, so values containing braces
/// (JSON, schemas) are inserted verbatim.
pub fn render(template: &str, variables: &HashMap<&str, String>) -> Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;

    for caps in TOKEN.captures_iter(template) {
        let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = variables
            .get(name.as_str())
            .ok_or_else(|| PlannerError::MissingVariable {
                name: name.as_str().to_string(),
            })?;

        rendered.push_str(&template[last..token.start()]);
        rendered.push_str(value);
        last = token.end();
    }

    rendered.push_str(&template[last..]);
    Ok(rendered)
}

pub fn menu_prompt(language: &str, profile: &Profile, additional_notes: &str) -> Result<String> {
    let variables = HashMap::from([
        ("language", language.to_string()),
        ("profile", serde_json::to_string(profile)?),
        ("format_instructions", schema::format_instructions::<Menu>()),
        ("additional_notes", additional_notes.to_string()),
    ]);
    render(MENU_TEMPLATE, &variables)
}

pub fn grocery_prompt(language: &str, menu: &Menu) -> Result<String> {
    let variables = HashMap::from([
        ("language", language.to_string()),
        ("menu", serde_json::to_string(menu)?),
        ("format_instructions", schema::format_instructions::<GroceryList>()),
    ]);
    render(GROCERY_TEMPLATE, &variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FoodItemWithQuantity, MeasurementSystem};

    fn template_variables(template: &str) -> Vec<String> {
        TOKEN
            .captures_iter(template)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }

    fn sample_menu() -> Menu {
        let one = |food: &str, quantity: &str| vec![FoodItemWithQuantity::new(food, quantity)];
        Menu {
            breakfast: one("Oatmeal", "80 g"),
            morning_snack: one("Almonds", "30 g"),
            lunch: one("Chicken breast", "150 g"),
            afternoon_snack: one("Apple", "1 medium"),
            dinner: one("Salmon", "140 g"),
            evening_snack: one("Soy yogurt", "125 g"),
        }
    }

    #[test]
    fn test_render_substitutes_all_tokens() {
        let variables = HashMap::from([("name", "Ada".to_string()), ("dish", "soup".to_string())]);
        let rendered = render("{name} likes {dish}, {name} said.", &variables).unwrap();
        assert_eq!(rendered, "Ada likes soup, Ada said.");
    }

    #[test]
    fn test_render_fails_on_missing_variable() {
        let variables = HashMap::from([("name", "Ada".to_string())]);
        match render("{name} likes {dish}", &variables) {
            Err(PlannerError::MissingVariable { name }) => assert_eq!(name, "dish"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let variables = HashMap::from([("a", "{b}".to_string())]);
        assert_eq!(render("[{a}]", &variables).unwrap(), "[{b}]");
    }

    #[test]
    fn test_menu_prompt_contains_every_value_verbatim() {
        let mut profile = Profile::sample();
        profile.measurement_system = MeasurementSystem::Imperial;
        profile.regimes.insert("vegetarian".to_string());

        let prompt = menu_prompt("Français", &profile, "No sugar").unwrap();

        assert!(prompt.contains("Français"));
        assert!(prompt.contains(&serde_json::to_string(&profile).unwrap()));
        assert!(prompt.contains(&schema::format_instructions::<Menu>()));
        assert!(prompt.ends_with("Additional notes: No sugar"));
        assert!(prompt.contains("nutritionist"));
        for name in template_variables(MENU_TEMPLATE) {
            assert!(!prompt.contains(&format!("{{{name}}}")), "token {name} left in prompt");
        }
    }

    #[test]
    fn test_grocery_prompt_embeds_menu_and_instructions() {
        let menu = sample_menu();
        let prompt = grocery_prompt("English", &menu).unwrap();

        assert!(prompt.contains(&serde_json::to_string(&menu).unwrap()));
        assert!(prompt.contains(&schema::format_instructions::<GroceryList>()));
        assert!(prompt.contains("create a grocery list for your client in English"));
        assert!(!prompt.contains("{menu}"));
        assert!(!prompt.contains("{language}"));
    }

    #[test]
    fn test_template_variables() {
        assert_eq!(
            template_variables(MENU_TEMPLATE),
            vec!["language", "profile", "format_instructions", "additional_notes"]
        );
        assert_eq!(
            template_variables(GROCERY_TEMPLATE),
            vec!["menu", "language", "format_instructions"]
        );
    }
}
