use clap::Parser;
use meal_planner::config::{load_dotenv, load_profile};
use meal_planner::utils::{logger, validation::Validate};
use meal_planner::{CliConfig, LocalStorage, MealPlanner, OpenAiClient, PlannerError};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = load_dotenv();

    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose, config.log_json);

    match dotenv {
        Ok(Some(path)) => tracing::debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => tracing::warn!("⚠️ Ignoring unreadable .env file: {}", e),
    }

    tracing::info!("Starting meal-planner CLI");
    tracing::debug!("CLI config: {:?}", config);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(
                "❌ Meal planning failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            ExitCode::from(e.severity().exit_code() as u8)
        }
    }
}

async fn run(config: &CliConfig) -> Result<(), PlannerError> {
    config.validate()?;
    let profile = load_profile(config.profile.as_deref())?;

    // API key 缺少時在送出任何請求前就失敗
    let client = OpenAiClient::from_env(config.client_config())?;
    let storage = LocalStorage::new(config.output_path.clone());
    let output_file = storage.full_path(meal_planner::RESULT_FILE_NAME);

    let planner = MealPlanner::new(client, storage, config.completion_options());
    let plan = planner.run(&config.language, &profile, &config.notes).await?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    tracing::info!("✅ Meal plan completed successfully!");
    tracing::info!("📁 Output saved to: {}", output_file.display());
    Ok(())
}
