use std::io::{self, BufRead, Write};

use inboxpilot_agent::AgentRuntime;
use inboxpilot_core::config::{AppConfig, LoadOptions};
use inboxpilot_core::domain::chat::{ChatReply, ChatSession};
use inboxpilot_core::domain::email::{Email, EmailId};
use inboxpilot_core::domain::prompt::PromptRegistry;
use inboxpilot_core::errors::ApplicationError;
use inboxpilot_store::JsonStore;
use tracing::warn;

use crate::commands::draft::render_draft;
use crate::commands::{
    agent_for, email_mut, execute, store_for, CommandError, CommandResult, EXIT_RUNTIME,
};

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

#[derive(Clone, Debug, Default)]
pub struct ChatArgs {
    pub email_id: u64,
    pub query: Option<String>,
    pub save_drafts: bool,
}

/// One-shot with `--query`, otherwise reads questions from stdin until EOF
/// or `exit`.
pub fn run(options: LoadOptions, args: ChatArgs) -> CommandResult {
    let stdin = io::stdin();
    run_with_io(options, args, stdin.lock(), io::stdout())
}

pub fn run_with_io<R, W>(options: LoadOptions, args: ChatArgs, input: R, output: W) -> CommandResult
where
    R: BufRead,
    W: Write,
{
    execute("chat", options, |config| chat(config, args, input, output))
}

struct Conversation {
    agent: AgentRuntime,
    store: JsonStore,
    prompts: PromptRegistry,
    email: Email,
    session: ChatSession,
    save_drafts: bool,
}

/// One answered question, rendered for the terminal.
struct ChatTurn {
    rendered: String,
    backend_error: Option<String>,
}

impl Conversation {
    async fn ask(&mut self, query: &str) -> Result<ChatTurn, CommandError> {
        self.session.push_user(query);
        let outcome = self.agent.chat(query, &self.email, &self.prompts).await;
        self.session.push_reply(&outcome.value);

        if let Some(error) = &outcome.backend_error {
            warn!(
                event_name = "cli.chat.backend_failed",
                email_id = self.email.id.0,
                error = %error,
                "chat reply degraded"
            );
        }

        let reply: ChatReply = outcome.value;
        let mut rendered = reply.response;
        if let Some(draft) = reply.data {
            rendered.push_str("\n\n");
            rendered.push_str(&render_draft(&draft));
            if self.save_drafts && outcome.backend_error.is_none() {
                let saved = self.store.add_draft(self.email.id, draft).await?;
                rendered.push_str(&format!("\n\nsaved as draft {}", saved.id));
            }
        }

        Ok(ChatTurn { rendered, backend_error: outcome.backend_error })
    }
}

async fn chat<R, W>(
    config: AppConfig,
    args: ChatArgs,
    mut input: R,
    mut output: W,
) -> Result<String, CommandError>
where
    R: BufRead,
    W: Write,
{
    let store = store_for(&config);
    let agent = agent_for(&config)?;
    let prompts = store.load_prompts().await;

    let mut emails = store.load_emails().await;
    let id = EmailId(args.email_id);
    let email = email_mut(&mut emails, id)?;
    let was_unread = !email.is_read;
    email.mark_read();
    let email = email.clone();
    if was_unread {
        store.save_emails(&emails).await?;
    }

    let mut session = ChatSession::default();
    session.select(id);
    let mut conversation =
        Conversation { agent, store, prompts, email, session, save_drafts: args.save_drafts };

    if let Some(query) = args.query {
        let turn = conversation.ask(&query).await?;
        return match turn.backend_error {
            Some(error) => Err(ApplicationError::BackendCall(error).into()),
            None => Ok(turn.rendered),
        };
    }

    let mut exchanges = 0usize;
    let mut line = String::new();
    loop {
        write!(output, "> ").and_then(|()| output.flush()).map_err(io_error)?;
        line.clear();
        if input.read_line(&mut line).map_err(io_error)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if EXIT_WORDS.iter().any(|word| query.eq_ignore_ascii_case(word)) {
            break;
        }

        let turn = conversation.ask(query).await?;
        writeln!(output, "{}\n", turn.rendered).map_err(io_error)?;
        exchanges += 1;
    }

    Ok(format!(
        "chat about email {id} ended after {exchanges} exchanges ({} messages)",
        conversation.session.messages().len()
    ))
}

fn io_error(error: io::Error) -> CommandError {
    CommandError::new("terminal_io", format!("terminal i/o failed: {error}"), EXIT_RUNTIME)
}
