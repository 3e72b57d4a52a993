pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser, Subcommand};
use inboxpilot_core::config::{
    AppConfig, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig, ProviderSelection,
};
use tracing_subscriber::EnvFilter;

use commands::chat::ChatArgs;
use commands::draft::DraftArgs;
use commands::drafts::DraftAction;
use commands::emails::EmailAction;
use commands::extract::ExtractTarget;
use commands::prompts::PromptAction;
use commands::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Parser)]
#[command(
    name = "inboxpilot",
    about = "Inbox assistant CLI",
    long_about = "Categorize a mock inbox, extract action items, draft replies and chat about emails using a hosted or offline language model.",
    after_help = "Examples:\n  inboxpilot seed\n  inboxpilot categorize\n  inboxpilot --provider mock chat --email-id 3 --query \"summarize\"\n  inboxpilot doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Override the configured provider (auto|mock|openai|gemini|huggingface)")]
    provider: Option<String>,
    #[arg(long, global = true, help = "Read configuration from this TOML file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override the data directory")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Replace the stored inbox with the sample emails")]
    Seed,
    #[command(about = "Categorize every stored email with the Categorization prompt")]
    Categorize,
    #[command(about = "Extract action items for one email or the whole inbox")]
    #[command(group(ArgGroup::new("target").required(true).args(["email_id", "all"])))]
    Extract {
        #[arg(long)]
        email_id: Option<u64>,
        #[arg(long)]
        all: bool,
    },
    #[command(about = "Generate a reply draft with the Auto-Reply prompt")]
    Draft {
        #[arg(long)]
        email_id: u64,
        #[arg(long, help = "Extra instruction for the reply")]
        instruction: Option<String>,
        #[arg(long, help = "Store the draft")]
        save: bool,
    },
    #[command(about = "Ask questions about an email (interactive without --query)")]
    Chat {
        #[arg(long)]
        email_id: u64,
        #[arg(long)]
        query: Option<String>,
        #[arg(long, help = "Store drafts produced during the conversation")]
        save_drafts: bool,
    },
    #[command(about = "List, show, edit or reset prompt templates")]
    Prompts {
        #[command(subcommand)]
        action: PromptCommand,
    },
    #[command(about = "List, edit or delete saved drafts")]
    Drafts {
        #[command(subcommand)]
        action: DraftCommand,
    },
    #[command(about = "List or clear stored emails")]
    Emails {
        #[command(subcommand)]
        action: EmailCommand,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, provider credentials and stored documents")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
enum PromptCommand {
    List,
    Show { name: String },
    Set { name: String, template: String },
    Reset { name: String },
}

#[derive(Debug, Subcommand)]
enum DraftCommand {
    List,
    Edit {
        id: u64,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    Delete { id: u64 },
}

#[derive(Debug, Subcommand)]
enum EmailCommand {
    List {
        #[arg(long)]
        category: Option<String>,
    },
    Clear,
}

impl Cli {
    fn load_options(&self) -> Result<LoadOptions, String> {
        let llm_provider = self
            .provider
            .as_deref()
            .map(str::parse::<ProviderSelection>)
            .transpose()
            .map_err(|error| error.to_string())?;

        Ok(LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides { llm_provider, data_dir: self.data_dir.clone(), log_level: None },
        })
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let options = match cli.load_options() {
        Ok(options) => options,
        Err(message) => {
            let result = CommandResult::failure("inboxpilot", "config_validation", message, EXIT_CONFIG);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };

    let logging = AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or(LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact });
    init_logging(&logging);

    let result = dispatch(cli.command, options);
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn dispatch(command: Command, options: LoadOptions) -> CommandResult {
    match command {
        Command::Seed => commands::seed::run(options),
        Command::Categorize => commands::categorize::run(options),
        Command::Extract { email_id, all: _ } => {
            let target = email_id
                .map(|id| ExtractTarget::One(inboxpilot_core::EmailId(id)))
                .unwrap_or(ExtractTarget::All);
            commands::extract::run(options, target)
        }
        Command::Draft { email_id, instruction, save } => {
            commands::draft::run(options, DraftArgs { email_id, instruction, save })
        }
        Command::Chat { email_id, query, save_drafts } => {
            commands::chat::run(options, ChatArgs { email_id, query, save_drafts })
        }
        Command::Prompts { action } => {
            let action = match action {
                PromptCommand::List => PromptAction::List,
                PromptCommand::Show { name } => PromptAction::Show { name },
                PromptCommand::Set { name, template } => PromptAction::Set { name, template },
                PromptCommand::Reset { name } => PromptAction::Reset { name },
            };
            commands::prompts::run(options, action)
        }
        Command::Drafts { action } => {
            let action = match action {
                DraftCommand::List => DraftAction::List,
                DraftCommand::Edit { id, subject, body } => DraftAction::Edit { id, subject, body },
                DraftCommand::Delete { id } => DraftAction::Delete { id },
            };
            commands::drafts::run(options, action)
        }
        Command::Emails { action } => {
            let action = match action {
                EmailCommand::List { category } => EmailAction::List { category },
                EmailCommand::Clear => EmailAction::Clear,
            };
            commands::emails::run(options, action)
        }
        Command::Config => CommandResult { exit_code: 0, output: commands::config::run(options) },
        Command::Doctor { json } => {
            CommandResult { exit_code: 0, output: commands::doctor::run(options, json) }
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    let _ = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
