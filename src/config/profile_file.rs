use crate::core::Profile;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_positive, validate_range, Validate};
use std::path::Path;

/// 從 TOML 檔案載入個人資料，未指定時使用內建範例
pub fn load_profile(path: Option<&Path>) -> Result<Profile> {
    let profile = match path {
        Some(path) => {
            tracing::debug!("Loading profile from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            profile_from_toml_str(&content)?
        }
        None => Profile::sample(),
    };

    profile.validate()?;
    Ok(profile)
}

/// 從 TOML 字串解析個人資料（camelCase 鍵名）
pub fn profile_from_toml_str(content: &str) -> Result<Profile> {
    Ok(toml::from_str(content)?)
}

impl Validate for Profile {
    fn validate(&self) -> Result<()> {
        validate_range("age", self.age, 1, 120)?;
        validate_positive("weight", self.weight)?;
        validate_positive("height", self.height)?;
        validate_positive("weightGoal", self.weight_goal)?;
        validate_range("weightLossPerWeek", self.weight_loss_per_week, 0.0, 2.0)?;
        validate_range("dailyCalories", self.daily_calories, 500, 10_000)?;

        for allergy in &self.allergies {
            validate_non_empty_string("allergies", allergy)?;
        }
        for regime in &self.regimes {
            validate_non_empty_string("regimes", regime)?;
        }
        Ok(())
    }
}
