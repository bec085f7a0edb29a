use clap::Parser;
use std::time::Duration;
use tracing::{debug, error};

use agentest::cli::{Cli, Commands, SettingsCommands};
use agentest::dispatch::RunDispatcher;
use agentest::scenario::Step;
use agentest::settings::{default_settings_path, ExecutorSettings, SettingsClient};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("agentest started with verbosity level: {}", cli.verbose);

    let result = match cli.command {
        Commands::Run {
            model,
            goal,
            steps,
            endpoint,
            timeout_secs,
        } => run_test(&model, &goal, &steps, &endpoint, timeout_secs).await,
        Commands::Settings { command } => run_settings_command(command).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_test(
    model: &str,
    goal: &str,
    steps: &[String],
    endpoint: &str,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let steps: Vec<Step> = steps
        .iter()
        .enumerate()
        .map(|(i, description)| Step::new(i as u64 + 1, description.clone()))
        .collect();

    let dispatcher = RunDispatcher::with_timeout(endpoint, Duration::from_secs(timeout_secs));
    let outcome = dispatcher.dispatch(model, goal, &steps).await;

    println!("{}", outcome.user_message());
    if let agentest::dispatch::RunOutcome::Success(body) = &outcome {
        println!("{}", serde_json::to_string_pretty(body)?);
    }
    if !outcome.is_success() {
        anyhow::bail!("test run did not succeed");
    }
    Ok(())
}

async fn run_settings_command(command: SettingsCommands) -> anyhow::Result<()> {
    let path = default_settings_path()?;
    match command {
        SettingsCommands::Show => {
            let settings = ExecutorSettings::load(&path)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommands::Set {
            executor_info_id,
            llm_temperature,
            max_agent_iterations,
            log_tokens_consumption,
            push,
            endpoint,
        } => {
            let mut settings = ExecutorSettings::load(&path)?;
            if let Some(id) = executor_info_id {
                settings.executor_info_id = id;
            }
            if let Some(temperature) = llm_temperature {
                settings.llm_temperature = temperature;
            }
            if let Some(iterations) = max_agent_iterations {
                settings.max_agent_iterations = iterations;
            }
            if let Some(log_tokens) = log_tokens_consumption {
                settings.log_tokens_consumption = log_tokens;
            }

            settings.save(&path)?;
            println!("Settings saved to {}", path.display());

            if push {
                SettingsClient::new(endpoint).push(&settings).await?;
                println!("Settings pushed to backend");
            }
        }
    }
    Ok(())
}
