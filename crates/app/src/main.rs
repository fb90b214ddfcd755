//! filechat - chat with an OpenAI model about your text files, in the terminal.

mod commands;
mod utils;

use agent_host::{ChatEvent, ChatSession, Composer};
use anyhow::Result;
use commands::Command;
use services::JsonFileStore;
use shared::conversation::Role;
use shared::credentials::CredentialStore;
use shared::errors::CredentialError;
use shared::settings::AppSettings;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing_subscriber::EnvFilter;
use utils::*;
use zeroize::Zeroizing;

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let (mut settings, loaded) = load_settings_or_default();
    if !loaded {
        if let Err(e) = save_settings(&settings) {
            tracing::warn!("could not write default settings: {:#}", e);
        }
    }
    apply_env_overrides(&mut settings);

    let credentials = CredentialStore::new(Arc::new(JsonFileStore::in_config_dir()));
    let (tx, rx) = unbounded_channel();
    let session = ChatSession::from_settings(&settings, credentials)?.with_events(tx);

    let mut app = ChatApp {
        session,
        composer: Composer::new(),
        events: rx,
        settings,
    };
    app.run().await
}

struct ChatApp {
    session: ChatSession,
    composer: Composer,
    events: UnboundedReceiver<ChatEvent>,
    settings: AppSettings,
}

impl ChatApp {
    async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("filechat ({}) - type /help for commands", self.session.options().model());
        self.print_history();

        if !self.session.has_valid_credential() {
            println!("No OpenAI API key found.");
            self.prompt_for_key(&mut lines).await?;
        }

        loop {
            print_prompt(self.composer.pending().len());
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let Some(command) = commands::parse(&line) else {
                continue;
            };

            match command {
                Command::Send(text) => self.send(&text, &mut lines).await?,
                Command::Attach(path) => {
                    match services::ingest_path(&path, self.settings.max_file_chars).await {
                        Ok(file) => {
                            println!("Attached {} ({})", file.name, file.size_label());
                            self.composer.attach(file);
                        }
                        Err(e) => println!("{}", e),
                    }
                }
                Command::Detach(which) => self.detach(&which),
                Command::Files => self.list_files(),
                Command::Export(path) => match self.session.history().to_json() {
                    Ok(json) => match std::fs::write(&path, json) {
                        Ok(()) => println!("Conversation written to {}", path.display()),
                        Err(e) => println!("Could not write {}: {}", path.display(), e),
                    },
                    Err(e) => println!("Could not export conversation: {}", e),
                },
                Command::Key => self.prompt_for_key(&mut lines).await?,
                Command::ForgetKey => {
                    if let Err(e) = self.session.clear_credential() {
                        println!("{}", e);
                    }
                }
                Command::Reset => {
                    self.session.reset_conversation();
                    self.composer.take();
                }
                Command::Help => println!("{}", commands::HELP),
                Command::Quit => break,
                Command::Usage(usage) => println!("Usage: {}", usage),
                Command::Unknown(name) => {
                    println!("Unknown command /{}. Type /help for commands.", name)
                }
            }
            self.render_events();
        }

        Ok(())
    }

    async fn send(&mut self, text: &str, lines: &mut InputLines) -> Result<()> {
        if !self.composer.is_sendable(text) {
            return Ok(());
        }
        let files = self.composer.take();
        println!("Thinking...");

        if let Err(err) = self.session.send_message(text, files).await {
            self.render_events();
            if err.requires_credential_prompt() {
                self.prompt_for_key(lines).await?;
            }
        }
        Ok(())
    }

    fn detach(&mut self, which: &str) {
        let id = match which.parse::<usize>() {
            Ok(n) if n >= 1 => self
                .composer
                .pending()
                .get(n - 1)
                .map(|f| f.id.clone()),
            _ => Some(which.to_string()),
        };
        match id {
            Some(id) if self.composer.remove(&id) => println!("Removed attachment."),
            _ => println!("No pending attachment {}", which),
        }
    }

    fn list_files(&self) {
        if self.composer.pending().is_empty() {
            println!("No files attached.");
            return;
        }
        for (i, file) in self.composer.pending().iter().enumerate() {
            println!("  {}. {} ({}) [{}]", i + 1, file.name, file.size_label(), file.id);
        }
    }

    /// Ask for a key until a valid one is saved or the user leaves it blank
    async fn prompt_for_key(&mut self, lines: &mut InputLines) -> Result<()> {
        loop {
            print!("Enter your OpenAI API key (blank to skip): ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };
            let key = Zeroizing::new(line);
            if key.trim().is_empty() {
                return Ok(());
            }

            match self.session.set_credential(&key) {
                Ok(()) => {
                    self.render_events();
                    return Ok(());
                }
                Err(CredentialError::InvalidFormat) => {
                    println!("{}", CredentialError::InvalidFormat)
                }
                Err(e) => {
                    println!("{}", e);
                    return Ok(());
                }
            }
        }
    }

    fn print_history(&self) {
        for turn in self.session.history().turns() {
            print_turn(turn.role, &turn.content);
        }
    }

    /// Drain pending session events and print what the user needs to see
    fn render_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                ChatEvent::TurnAppended(turn) if turn.role == Role::Assistant => {
                    print_turn(turn.role, &turn.content)
                }
                ChatEvent::TurnAppended(_) | ChatEvent::Thinking(_) => {}
                ChatEvent::Failed(err) => println!("\n{}\n", format_error_message(&err)),
                ChatEvent::Reset => {
                    println!("Conversation cleared.");
                    self.print_history();
                }
                ChatEvent::CredentialChanged { present: true } => println!("API key saved."),
                ChatEvent::CredentialChanged { present: false } => println!("API key removed."),
            }
        }
    }
}

fn print_turn(role: Role, content: &str) {
    let label = match role {
        Role::Assistant => "AI",
        Role::User => "You",
        Role::System => "System",
    };
    println!("\n{}: {}\n", label, content);
}

fn print_prompt(pending_files: usize) {
    if pending_files > 0 {
        print!("[{} file(s)] > ", pending_files);
    } else {
        print!("> ");
    }
    let _ = std::io::stdout().flush();
}
