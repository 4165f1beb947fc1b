use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use docchat_application::{ChatOrchestrator, TurnOutcome, UploadReport};
use docchat_core::config::Credentials;
use docchat_core::remote::RawFile;
use docchat_core::session::{Role, SessionContext};
use docchat_infrastructure::{ConfigService, DocchatPaths, SecretService};
use docchat_interaction::HttpClientFactory;

mod command;
mod helper;
mod interrupt;

use command::{COMMANDS, Command, is_pdf};
use helper::CliHelper;
use interrupt::Interrupts;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Chat with uploaded PDF documents, falling back to web search", long_about = None)]
struct Cli {
    /// Directory holding config.toml and secret.json (default: ~/.config/docchat)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "error")]
    log_level: String,
}

/// The docchat REPL.
///
/// Owns the single [`SessionContext`] and hands it to the orchestrator for
/// every line. Each line is fully handled before the next prompt.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ===== Backend Initialization =====
    let paths = DocchatPaths::new(cli.config_dir.as_deref())?;
    let settings = ConfigService::new(paths.config_file()).load()?;
    let factory = Arc::new(HttpClientFactory::new(settings.clone())?);
    let orchestrator = ChatOrchestrator::new(factory, settings);
    let mut ctx = SessionContext::new();

    match SecretService::new(paths.secret_file()).load_credentials() {
        Ok(Some(credentials)) => configure(&orchestrator, &mut ctx, credentials),
        Ok(None) => {}
        Err(err) => eprintln!("{}", format!("Failed to load API keys: {:#}", err).red()),
    }

    // ===== REPL Setup =====
    let interrupts = Interrupts::new();
    let _listener = interrupts.listen();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== docchat ===".bright_magenta().bold());
    print_help();
    if ctx.credentials.is_none() {
        println!("{}", "API keys not found. Set them with /keys <openai> <tavily>.".yellow());
    }
    println!();

    // ===== Main REPL Loop =====
    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Keys stay out of the line history
        if !trimmed.starts_with("/keys") {
            let _ = rl.add_history_entry(trimmed);
        }

        match Command::parse(trimmed) {
            Command::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Command::Help => print_help(),
            Command::Keys { openai, tavily } => match Credentials::new(openai, tavily) {
                Ok(credentials) => configure(&orchestrator, &mut ctx, credentials),
                Err(err) => eprintln!("{}", err.to_string().red()),
            },
            Command::Upload(paths) => {
                let running = interrupts.begin();
                upload(&orchestrator, &mut ctx, &paths, running.token()).await;
            }
            Command::Search(text) => {
                println!("{}", format!("> {}", text).green());
                let running = interrupts.begin();
                let outcome = orchestrator.on_user_turn(&mut ctx, text, running.token()).await;
                print_outcome(&outcome, true);
            }
            Command::Chat(text) => {
                println!("{}", format!("> {}", text).green());
                let running = interrupts.begin();
                let outcome = chat(&orchestrator, &mut ctx, text, running.token()).await;
                print_outcome(&outcome, false);
            }
            Command::Save => match orchestrator.save_session(&mut ctx) {
                Some(name) => println!("{}", format!("세션 '{}'이(가) 저장되었습니다.", name).bright_green()),
                None => println!("{}", "Nothing to save.".bright_black()),
            },
            Command::Sessions => {
                if ctx.saved().is_empty() {
                    println!("{}", "No saved sessions.".bright_black());
                }
                for name in ctx.saved().names() {
                    println!("  {}", name.bright_cyan());
                }
            }
            Command::Load(name) => {
                if orchestrator.load_session(&mut ctx, name) {
                    println!("{}", format!("세션 '{}'이(가) 복원되었습니다.", name).bright_green());
                    print_history(&ctx);
                } else {
                    println!("{}", format!("No saved session named '{}'.", name).yellow());
                }
            }
            Command::Clear => {
                orchestrator.clear_session(&mut ctx);
                println!("{}", "세션이 초기화되었습니다.".bright_green());
            }
            Command::History => print_history(&ctx),
            Command::Usage(usage) => println!("{}", format!("Usage: {}", usage).yellow()),
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command {}. Try /help.", name).bright_black())
            }
        }
    }

    Ok(())
}

fn configure(orchestrator: &ChatOrchestrator, ctx: &mut SessionContext, credentials: Credentials) {
    match orchestrator.configure(ctx, credentials) {
        Ok(()) => println!("{}", "API keys configured.".bright_green()),
        Err(err) => eprintln!("{}", err.to_string().red()),
    }
}

/// Ctrl-C abandons the upload; the vector store created so far is kept.
async fn upload(
    orchestrator: &ChatOrchestrator,
    ctx: &mut SessionContext,
    paths: &[&str],
    cancel: &CancellationToken,
) {
    let mut files = Vec::new();
    for path in paths {
        if !is_pdf(path) {
            println!("{}", format!("Skipping {}: only PDF files are accepted.", path).yellow());
            continue;
        }
        match RawFile::read(path).await {
            Ok(file) => files.push(file),
            Err(err) => eprintln!("{}", err.to_string().red()),
        }
    }
    if files.is_empty() {
        return;
    }

    println!("{}", format!("Uploading {} file(s)...", files.len()).bright_black());
    match orchestrator.on_file_upload(ctx, files, cancel).await {
        Ok(report) => print_upload_report(&report),
        Err(err) => eprintln!("{}", format!("Upload failed: {}", err).red()),
    }
}

/// Runs an assistant turn; Ctrl-C while waiting cancels it.
async fn chat(
    orchestrator: &ChatOrchestrator,
    ctx: &mut SessionContext,
    text: &str,
    cancel: &CancellationToken,
) -> TurnOutcome {
    orchestrator
        .on_chat_input(ctx, text, cancel, |fragment| {
            for line in fragment.lines() {
                println!("{}", line.bright_blue());
            }
            let _ = std::io::stdout().flush();
        })
        .await
}

fn print_outcome(outcome: &TurnOutcome, print_answer: bool) {
    match outcome {
        TurnOutcome::Ignored => {}
        TurnOutcome::NotReady => {
            println!("{}", "Upload a PDF with /upload first.".yellow());
        }
        TurnOutcome::Answered(reply) if print_answer => {
            for line in reply.lines() {
                println!("{}", line.bright_blue());
            }
        }
        TurnOutcome::Answered(_) => {}
    }
    println!();
}

fn print_upload_report(report: &UploadReport) {
    if let Some(batch) = &report.batch {
        println!(
            "{}",
            format!(
                "Indexed {}/{} file(s) into {} ({}).",
                batch.file_counts.completed, batch.file_counts.total, report.vector_store_id, batch.status
            )
            .bright_green()
        );
    }
    for err in &report.errors {
        eprintln!("{}", err.to_string().red());
    }
}

fn print_history(ctx: &SessionContext) {
    for message in ctx.messages().iter().filter(|m| m.is_visible()) {
        match message.role {
            Role::User => println!("{}", format!("> {}", message.content).green()),
            _ => {
                for line in message.content.lines() {
                    println!("{}", line.bright_blue());
                }
            }
        }
    }
    println!();
}

fn print_help() {
    println!(
        "{}",
        "Type a question to ask the assistant, /search <question> to search documents, or 'quit' to exit."
            .bright_black()
    );
    println!("{}", format!("Commands: {}", COMMANDS.join(" ")).bright_black());
}
