use anyhow::Context;
use serde::Serialize;

use mealmind_core::activity::{DailyActivityBucket, DailyCalories, MonthlyStats};
use mealmind_core::nutrition::{recommended_goals, NutritionGoals, NutritionProfile};
use mealmind_core::{telemetry, AppConfig, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    user_id: String,
    goals: Option<NutritionGoals>,
    today: DailyActivityBucket,
    week: Vec<DailyCalories>,
    month: MonthlyStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let user_id = std::env::args()
        .nth(1)
        .context("usage: mealmind-core <user-id>")?;

    let config = AppConfig::from_env()?;
    let state = AppState::init(config).await?;

    let goals = state
        .users
        .get_user_by_id(&user_id)
        .await
        .map(|user| recommended_goals(&NutritionProfile::from(&user)));
    if goals.is_none() {
        tracing::warn!(user_id = %user_id, "no local account, skipping goals");
    }

    let report = Report {
        goals,
        today: state.activities.get_today_activity(&user_id).await,
        week: state.stats.get_weekly_stats(&user_id).await,
        month: state.stats.get_monthly_stats(&user_id).await,
        user_id,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
