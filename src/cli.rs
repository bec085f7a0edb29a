//! Command-line interface definitions

use clap::{Parser, Subcommand};

/// Compose and dispatch AI-driven mobile test scenarios
#[derive(Parser)]
#[command(name = "agentest", version)]
#[command(about = "Compose and dispatch AI-driven mobile test scenarios", long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dispatch a test scenario to a model backend
    Run {
        /// Model identifier (gpt_4, gwen_3, gemini, llama_3_2)
        #[arg(short, long)]
        model: String,

        /// Test goal
        #[arg(short, long)]
        goal: String,

        /// Step description; repeat for multiple steps, order is execution order
        #[arg(short, long = "step")]
        steps: Vec<String>,

        /// Backend base URL
        #[arg(long, default_value = "http://localhost:8080")]
        endpoint: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },
    /// Show or update executor settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,
    /// Update settings locally, optionally pushing them to the backend
    Set {
        /// Default executor/model configuration id
        #[arg(long)]
        executor_info_id: Option<String>,

        /// LLM temperature (0 = deterministic, 10 = very creative)
        #[arg(long)]
        llm_temperature: Option<f64>,

        /// Maximum number of steps the agent may take per task
        #[arg(long)]
        max_agent_iterations: Option<u32>,

        /// Enable detailed token-usage logging
        #[arg(long)]
        log_tokens_consumption: Option<bool>,

        /// Also push the updated settings to the backend
        #[arg(long)]
        push: bool,

        /// Backend base URL (used with --push)
        #[arg(long, default_value = "http://localhost:8080")]
        endpoint: String,
    },
}
