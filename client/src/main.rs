use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use raffify_guess::application::player::{enter_contest, SessionController, SessionPorts};
use raffify_guess::config::Settings;
use raffify_guess::domain::value_objects::ContestId;
use raffify_guess::infrastructure::driven::HttpContestGateway;
use raffify_guess::infrastructure::driving::terminal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not mix with the game prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load().context("Failed to load configuration")?;
    let contest_id = std::env::args()
        .nth(1)
        .or_else(|| settings.contest_id.clone())
        .context("No contest given: pass it as first argument or set RAFFIFY__CONTEST_ID")?;
    let contest_id = ContestId::new(contest_id)?;

    let gateway = Arc::new(HttpContestGateway::new(&settings.backend)?);
    info!("Using backend at {}", settings.backend.base_url);

    let contest =
        enter_contest::execute(gateway.as_ref(), &contest_id, settings.game.max_time_seconds)
            .await?;
    if let Some(title) = &contest.title {
        println!("{}", title);
    }

    let handle = SessionController::spawn(
        contest.contest_id,
        contest.rules,
        SessionPorts {
            registry: gateway.clone(),
            evaluator: gateway.clone(),
            reporter: gateway,
        },
        settings.controller_config(),
    );

    let mut stdout = tokio::io::stdout();
    terminal::run(&handle, BufReader::new(tokio::io::stdin()), &mut stdout).await?;

    info!("Bye");
    Ok(())
}
