//! Tween CLI
//!
//! Command-line interface for Digital Tween:
//! - Sign in and out
//! - Create, list, inspect and delete chats
//! - Send messages and wait for video replies
//! - Upload voice samples and follow cloning

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tween::config::{generate_default_config, Config};
use tween::conversation::{self, ConversationEvent};
use tween::models::{Sender, UiKind};
use tween::poll::{cancellable, flatten_cancelled};
use tween::resources::{load_timeline, relative_time, ChatStore};
use tween::{
    auth, persona, voice, ClientError, ClientResult, FileTokenStore, HttpClient, PersonaSetup,
    Session, TokioSleeper, TweenApi, UploadFile,
};

#[derive(Parser)]
#[command(name = "tween")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with your Digital Tween from the terminal")]
#[command(long_about = "Digital Tween turns a photo and a voice sample into an avatar that answers in video.\nCreate personas, send messages and manage voice clones.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, then ./tween.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the token
    SignIn {
        login: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account
    SignUp {
        login: String,
        /// Password (prompted twice when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// End the session
    Logout,

    /// List chats
    Chats,

    /// Show a chat and its messages
    Show {
        /// Chat ID
        id: i64,
    },

    /// Create a persona chat from a photo and a voice sample
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Photo of the persona
        #[arg(long)]
        photo: PathBuf,
        /// Voice sample to clone
        #[arg(long)]
        voice: PathBuf,
        /// Wait until the chat is ready
        #[arg(short, long)]
        wait: bool,
    },

    /// Delete a chat
    Delete {
        /// Chat ID
        id: i64,
    },

    /// Send a message and wait for the video reply
    Send {
        /// Chat ID
        chat: i64,
        /// Message text
        text: String,
    },

    /// Voice cloning
    Voice {
        #[command(subcommand)]
        command: VoiceCommands,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum VoiceCommands {
    /// Upload a voice sample
    Upload {
        file: PathBuf,
        /// Wait for the clone and list its responses
        #[arg(short, long)]
        wait: bool,
    },

    /// Show a clone job
    Status {
        /// Upload ID
        id: i64,
    },

    /// List responses generated for a voice
    Responses {
        voice_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    tween::logging::init(&config.logging);

    if let Commands::Config { output } = &cli.command {
        return write_config(output.as_ref());
    }

    let session = Arc::new(Session::new(FileTokenStore::new(config.session.token_file())));
    session.init().context("Failed to read the saved session")?;
    let api = HttpClient::new(&config.api, session.clone())?;

    if let Err(e) = run(&cli, &config, &api, &session).await {
        report(&e, &config);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &Cli, config: &Config, api: &HttpClient, session: &Session) -> ClientResult<()> {
    let json = cli.format == "json";

    match &cli.command {
        Commands::SignIn { login, password } => {
            let password = match password {
                Some(p) => p.clone(),
                None => prompt("Password: ")?,
            };
            let response = auth::sign_in(api, session, login, &password).await?;
            println!("{}", response.message.as_deref().unwrap_or("Signed in"));
        }

        Commands::SignUp { login, password } => {
            let (password, confirm) = match password {
                Some(p) => (p.clone(), p.clone()),
                None => (prompt("Password: ")?, prompt("Repeat password: ")?),
            };
            let response = auth::sign_up(api, session, login, &password, &confirm).await?;
            println!("{}", response.message.as_deref().unwrap_or("Account created"));
        }

        Commands::Logout => {
            auth::logout(api, session).await?;
            println!("Logged out");
        }

        Commands::Chats => {
            let mut store = ChatStore::new();
            store.refresh(api).await;
            if let Some(error) = store.error.take() {
                eprintln!("Failed to load chats: {}", error);
                std::process::exit(1);
            }

            if json {
                print_json(&store.chats())?;
            } else if store.chats().is_empty() {
                println!("No chats yet.");
                println!();
                println!("Create your first persona with:");
                println!("  tween create --name Grandma --photo photo.jpg --voice voice.wav");
            } else {
                let now = Utc::now();
                println!("{:<8} {:<24} {:<12} {}", "ID", "Name", "Status", "Updated");
                println!("{}", "-".repeat(60));
                for chat in store.chats() {
                    println!(
                        "{:<8} {:<24} {:<12} {}",
                        chat.id,
                        truncate(&chat.name, 24),
                        chat.status,
                        relative_time(chat.updated_at, now)
                    );
                }
            }
        }

        Commands::Show { id } => {
            let chat = api.chat_status(*id).await?;
            let timeline = load_timeline(api, *id).await?;

            if json {
                print_json(&serde_json::json!({ "chat": chat, "messages": timeline }))?;
            } else {
                println!("{} (#{})", chat.name, chat.id);
                if let Some(description) = chat.description.as_deref().filter(|d| !d.is_empty()) {
                    println!("{}", description);
                }
                println!("Status: {}", chat.status);
                println!();
                if timeline.is_empty() {
                    println!("No messages yet.");
                }
                for bubble in &timeline {
                    print_bubble(&bubble.sender, bubble.kind, &bubble.content);
                }
            }
        }

        Commands::Create {
            name,
            description,
            photo,
            voice,
            wait,
        } => {
            let mut setup = PersonaSetup::new();
            setup.name = name.clone();
            setup.description = description.clone().unwrap_or_default();
            setup.photo = Some(UploadFile::from_path(photo)?);
            setup.voice = Some(UploadFile::from_path(voice)?);

            let mut chat = persona::create_persona(api, setup.finish()?).await?;
            println!("Created chat #{} ({})", chat.id, chat.status);

            if *wait {
                println!("Waiting for the persona to be ready... (Ctrl-C to stop)");
                let patch = until_interrupted(persona::await_persona_ready(
                    api,
                    &TokioSleeper,
                    &config.polling.chat_policy(),
                    chat.id,
                ))
                .await?;
                chat.apply(&patch);
                println!("{}", chat.status.chat_banner());
            }

            if json {
                print_json(&chat)?;
            }
        }

        Commands::Delete { id } => {
            let mut store = ChatStore::new();
            store.delete(api, *id).await?;
            println!("Deleted chat #{}", id);
        }

        Commands::Send { chat, text } => {
            let outcome = until_interrupted(conversation::send_text(
                api,
                &TokioSleeper,
                &config.polling.message_policy(),
                *chat,
                text,
                |event| {
                    if !json {
                        print_event(&event);
                    }
                },
            ))
            .await?;

            if json {
                print_json(&outcome.reply)?;
            }
        }

        Commands::Voice { command } => match command {
            VoiceCommands::Upload { file, wait } => {
                let upload = UploadFile::from_path(file)?;
                if *wait {
                    println!("Uploading and cloning... (Ctrl-C to stop)");
                    let clone = until_interrupted(voice::clone_voice(
                        api,
                        &TokioSleeper,
                        &config.polling,
                        upload,
                    ))
                    .await?;

                    if json {
                        print_json(&serde_json::json!({
                            "audio": clone.audio,
                            "responses": clone.responses,
                        }))?;
                    } else {
                        println!("Voice ready: {}", clone.audio.voice_id);
                        print_responses(&clone.responses);
                    }
                } else {
                    let id = voice::upload_voice_sample(api, upload).await?;
                    println!("Uploaded sample #{}", id);
                    println!("Check progress with:");
                    println!("  tween voice status {}", id);
                }
            }

            VoiceCommands::Status { id } => {
                let audio = api.audio_status(*id).await?;
                if json {
                    print_json(&audio)?;
                } else {
                    println!("Upload:   #{}", audio.id);
                    println!("Status:   {:?}", audio.status);
                    println!("Voice ID: {}", audio.voice_id);
                    println!("Original: {}", audio.original_url);
                    if let Some(url) = &audio.cloned_url {
                        println!("Cloned:   {}", url);
                    }
                }
            }

            VoiceCommands::Responses { voice_id } => {
                let responses = voice::voice_responses(api, voice_id).await?;
                if json {
                    print_json(&responses)?;
                } else {
                    print_responses(&responses);
                }
            }
        },

        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Run a long wait until it finishes or the user presses Ctrl-C
async fn until_interrupted<T, F>(future: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    let (task, handle) = cancellable(future);
    tokio::select! {
        result = task => flatten_cancelled(result)?,
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            Err(ClientError::Cancelled)
        }
    }
}

fn write_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}

fn report(error: &ClientError, config: &Config) {
    match error {
        e if e.is_unauthorized() => {
            eprintln!("Not signed in or the session has expired.");
            eprintln!("Sign in with:");
            eprintln!("  tween sign-in <login>");
        }
        ClientError::Network(e) => {
            eprintln!("Cannot connect to the Tween backend at {}", config.api.base_url);
            eprintln!("Error: {}", e);
        }
        ClientError::Cancelled => {
            eprintln!("Stopped waiting. The server keeps working; check again later.");
        }
        e => eprintln!("Error: {}", e),
    }
}

fn prompt(label: &str) -> ClientResult<String> {
    eprint!("{}", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_event(event: &ConversationEvent) {
    match event {
        ConversationEvent::Append(bubble) => print_bubble(&bubble.sender, bubble.kind, &bubble.content),
        ConversationEvent::Notify(notice) if notice.is_error() => eprintln!("! {}", notice.text),
        ConversationEvent::Notify(notice) => println!("{}", notice.text),
        ConversationEvent::Remove(_) | ConversationEvent::Replace(_) => {}
    }
}

fn print_bubble(sender: &Sender, kind: UiKind, content: &str) {
    let who = match sender {
        Sender::User => "You",
        Sender::Ai => "Tween",
    };
    match kind {
        UiKind::Loading => println!("{:>6}: ... {}", who, content),
        UiKind::Video => println!("{:>6}: [video] {}", who, content),
        UiKind::Voice => println!("{:>6}: [voice] {}", who, content),
        UiKind::Text => println!("{:>6}: {}", who, content),
    }
}

fn print_responses(responses: &[tween::VoiceResponse]) {
    if responses.is_empty() {
        println!("No responses generated yet.");
        return;
    }
    println!("{:<6} {:<40} {}", "ID", "Question", "Audio");
    println!("{}", "-".repeat(80));
    for response in responses {
        println!(
            "{:<6} {:<40} {}",
            response.id,
            truncate(&response.question, 40),
            response.audio_url
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
