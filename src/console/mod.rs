//! Terminal front end. Only reads input and renders the session log; all
//! state changes go through `ChatSession`.

use crate::audio::FileCapture;
use crate::error::ChatError;
use crate::models::chat::{ ChatMessage, MessageKind, Sender };
use crate::session::{ ChatSession, SendOutcome };
use log::{ error, info, warn };
use std::error::Error;
use std::path::Path;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Lines, Stdout };

const HELP: &str =
    "Commands: /audio <file> sends a clip, /save <file> writes the last clip, /logout signs out, /quit exits.";

enum Command<'a> {
    Quit,
    Logout,
    Help,
    Audio(&'a str),
    Save(&'a str),
    Say(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some(("/audio", path)) => Command::Audio(path.trim()),
        Some(("/save", path)) => Command::Save(path.trim()),
        _ =>
            match trimmed {
                "/quit" | "/exit" => Command::Quit,
                "/logout" => Command::Logout,
                "/help" => Command::Help,
                "/audio" => Command::Audio(""),
                "/save" => Command::Save(""),
                _ => Command::Say(line),
            }
    }
}

pub fn render_message(msg: &ChatMessage) -> String {
    let who = match msg.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    let time = msg.sent_at.format("%H:%M");
    match (msg.kind, &msg.audio) {
        (MessageKind::Audio, Some(audio)) =>
            format!("[{}] {}: <audio {} bytes>", time, who, audio.size),
        _ => format!("[{}] {}: {}", time, who, msg.content),
    }
}

/// A store that cannot be read sends the user to the login prompt.
fn restore_session(session: &mut ChatSession) -> bool {
    match session.restore() {
        Ok(restored) => restored,
        Err(e) => {
            warn!("Could not restore saved name: {}", e);
            false
        }
    }
}

/// `Err` carries the text to show next to the prompt.
fn attempt_login(session: &mut ChatSession, name: &str) -> Result<(), String> {
    match session.login(name) {
        Ok(()) => Ok(()),
        Err(ChatError::Validation(msg)) => Err(msg),
        Err(e) => {
            error!("Login failed: {}", e);
            Err(e.to_string())
        }
    }
}

/// Writes the most recent audio clip to `path`, returning its size.
async fn save_latest_clip(session: &ChatSession, path: &Path) -> Result<usize, ChatError> {
    let Some(bytes) = session.latest_clip() else {
        return Err(ChatError::validation("No audio clip to save"));
    };
    tokio::fs::write(path, bytes).await?;
    info!("Saved {} byte clip to {}", bytes.len(), path.display());
    Ok(bytes.len())
}

struct Console {
    lines: Lines<BufReader<Stdin>>,
    out: Stdout,
}

impl Console {
    async fn print(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }

    async fn prompt(&mut self, text: &str) -> std::io::Result<Option<String>> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        self.lines.next_line().await
    }
}

async fn login_loop(
    console: &mut Console,
    session: &mut ChatSession
) -> Result<bool, Box<dyn Error + Send + Sync>> {
    console.print("Bienvenido al chat").await?;
    loop {
        let Some(name) = console.prompt("Tu nombre: ").await? else {
            return Ok(false);
        };
        match attempt_login(session, &name) {
            Ok(()) => return Ok(true),
            Err(msg) => console.print(&format!("  ! {}", msg)).await?,
        }
    }
}

pub async fn run(mut session: ChatSession) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut console = Console {
        lines: BufReader::new(tokio::io::stdin()).lines(),
        out: tokio::io::stdout(),
    };

    if !restore_session(&mut session) && !login_loop(&mut console, &mut session).await? {
        return Ok(());
    }

    'chat: loop {
        console.print(
            &format!("¡Bienvenido, {}! Escribe un mensaje. {}", session.user_name(), HELP)
        ).await?;

        loop {
            let Some(line) = console.prompt("> ").await? else {
                break 'chat;
            };
            let before = session.messages().len();

            let result = match parse_command(&line) {
                Command::Quit => break 'chat,
                Command::Help => {
                    console.print(HELP).await?;
                    continue;
                }
                Command::Logout => {
                    if let Err(e) = session.logout() {
                        error!("Failed to clear saved name: {}", e);
                    }
                    if !login_loop(&mut console, &mut session).await? {
                        break 'chat;
                    }
                    continue 'chat;
                }
                Command::Save("") => Err(ChatError::validation("Usage: /save <file>")),
                Command::Save(path) => {
                    match save_latest_clip(&session, Path::new(path)).await {
                        Ok(size) => {
                            console.print(&format!("  saved {} bytes to {}", size, path)).await?;
                            continue;
                        }
                        Err(e) => Err(e),
                    }
                }
                Command::Audio("") => Err(ChatError::validation("Usage: /audio <file>")),
                Command::Audio(path) => session.send_recording(&FileCapture::new(path)).await,
                Command::Say(text) => session.send_text(text).await,
            };

            match result {
                Ok(SendOutcome::Skipped) => info!("Send skipped while a request is pending"),
                Ok(_) => {}
                Err(e) => {
                    console.print(&format!("  ! {}", e)).await?;
                    continue;
                }
            }

            let fresh: Vec<String> = session.messages()[before..]
                .iter()
                .filter(|m| m.sender == Sender::Bot || m.kind == MessageKind::Audio)
                .map(render_message)
                .collect();
            for line in fresh {
                console.print(&line).await?;
            }
        }
    }

    info!("Chat session ended");
    Ok(())
}
