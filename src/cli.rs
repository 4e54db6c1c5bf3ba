use std::future::Future;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Settings;
use crate::session::Session;

const RULE: &str = "==================================================";
const THIN_RULE: &str = "--------------------------------------------------";

#[derive(Parser, Debug)]
#[command(name = "simple-agent", version, about = "Chat with an OpenAI-compatible model")]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    /// Defaults to an interactive chat when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the chat page and JSON API over HTTP
    Serve(ServeArgs),
    /// Chat in the terminal, or send a single message and exit
    Chat {
        /// Message to send; starts an interactive session when empty.
        /// Everything after the first word is taken as message text.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "SERVER_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory served under /static
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Directory holding index.html
    #[arg(long, default_value = "templates")]
    pub template_dir: PathBuf,
}

/// Joins command-line words into one message; `None` when nothing is left.
pub fn one_shot_message(words: &[String]) -> Option<String> {
    let message = words.join(" ");
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}

enum Input<'a> {
    Skip,
    Quit,
    Reset,
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        Input::Skip
    } else if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        Input::Quit
    } else if line.eq_ignore_ascii_case("reset") {
        Input::Reset
    } else {
        Input::Message(line)
    }
}

/// Interactive loop. Ends on `quit`, `exit`, end of input or when
/// `shutdown` resolves (Ctrl-C in the binary), whether waiting for input or
/// for a reply.
///
/// Failed turns are printed in place of the reply and the loop carries on.
pub async fn run_repl<R, W, S>(
    session: &Session,
    input: R,
    mut output: W,
    shutdown: S,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let banner = format!(
        "{RULE}\nSimple Agent - interactive chat\n{RULE}\n\
         Commands: 'quit' or 'exit' to leave, 'reset' to clear the conversation\n{THIN_RULE}\n"
    );
    output.write_all(banner.as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"\nYou: ").await?;
        output.flush().await?;

        let next = tokio::select! {
            biased;
            _ = &mut shutdown => None,
            line = lines.next_line() => line?,
        };
        let Some(line) = next else {
            output.write_all(b"\n\nGoodbye!\n").await?;
            break;
        };

        match classify(&line) {
            Input::Skip => continue,
            Input::Quit => {
                output.write_all(b"Goodbye!\n").await?;
                break;
            }
            Input::Reset => {
                session.reset().await;
                output.write_all(b"Conversation reset\n").await?;
            }
            Input::Message(text) => {
                output.write_all(b"\nAgent: ").await?;
                output.flush().await?;
                let result = tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        output.write_all(b"\n\nGoodbye!\n").await?;
                        break;
                    }
                    result = session.submit(text) => result,
                };
                let reply = match result {
                    Ok(reply) => reply,
                    Err(e) => e.to_string(),
                };
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
        }
    }

    output.flush().await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::SessionConfig;
    use crate::error::ClientError;
    use crate::model::{ChatCompletionRequest, CompletionClient, Message};

    struct Upper;

    #[async_trait]
    impl CompletionClient for Upper {
        async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ClientError> {
            let last = request.messages.last().map(|m| m.content.as_str()).unwrap_or("");
            if last == "boom" {
                return Err(ClientError::Transport("connection refused".into()));
            }
            Ok(last.to_uppercase())
        }
    }

    fn session() -> Session {
        Session::new(
            Arc::new(Upper),
            SessionConfig {
                model: "m".into(),
                system_prompt: "s".into(),
                max_tokens: 8,
            },
        )
    }

    async fn drive(session: &Session, input: &str) -> String {
        let mut out = Vec::new();
        run_repl(session, input.as_bytes(), &mut out, std::future::pending())
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_one_shot_chat() {
        let cli = Cli::try_parse_from(["simple-agent", "chat", "hello", "there"]).unwrap();
        match cli.command {
            Some(Command::Chat { message }) => {
                assert_eq!(one_shot_message(&message).as_deref(), Some("hello there"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_words_means_interactive() {
        assert_eq!(one_shot_message(&[]), None);
        assert_eq!(one_shot_message(&["  ".to_string()]), None);
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["simple-agent", "serve"]).unwrap();
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.static_dir, PathBuf::from("static"));
        assert_eq!(args.template_dir, PathBuf::from("templates"));
    }

    #[test]
    fn one_shot_keeps_words_that_look_like_flags() {
        let cli = Cli::try_parse_from(["simple-agent", "chat", "what", "does", "-v", "mean"])
            .unwrap();
        let Some(Command::Chat { message }) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(one_shot_message(&message).as_deref(), Some("what does -v mean"));

        let cli = Cli::try_parse_from(["simple-agent", "chat", "explain", "--help", "flags"])
            .unwrap();
        let Some(Command::Chat { message }) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(one_shot_message(&message).as_deref(), Some("explain --help flags"));
    }

    #[test]
    fn settings_before_message_are_still_options() {
        let cli = Cli::try_parse_from([
            "simple-agent",
            "chat",
            "--model",
            "other",
            "hi",
            "--max-tokens",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.settings.model, "other");
        let Some(Command::Chat { message }) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(message, vec!["hi", "--max-tokens", "5"]);
    }

    #[tokio::test]
    async fn repl_chats_until_quit() {
        let session = session();
        let out = drive(&session, "hello\n\n   \nQUIT\nnever sent\n").await;

        assert!(out.contains("Agent: HELLO\n"));
        assert!(out.ends_with("Goodbye!\n"));
        assert!(!out.contains("NEVER SENT"));
        assert_eq!(
            session.history().await,
            vec![Message::user("hello"), Message::assistant("HELLO")]
        );
    }

    #[tokio::test]
    async fn repl_reset_clears_history() {
        let session = session();
        let out = drive(&session, "one\nreset\ntwo\nexit\n").await;

        assert!(out.contains("Conversation reset\n"));
        assert_eq!(
            session.history().await,
            vec![Message::user("two"), Message::assistant("TWO")]
        );
    }

    #[tokio::test]
    async fn repl_prints_failures_and_keeps_going() {
        let session = session();
        let out = drive(&session, "boom\nok\n").await;

        assert!(out.contains("Agent: Request error: connection refused\n"));
        assert!(out.contains("Agent: OK\n"));
        assert_eq!(session.len().await, 3);
    }

    #[tokio::test]
    async fn repl_trims_input_before_sending() {
        let session = session();
        drive(&session, "  padded  \n").await;
        assert_eq!(session.history().await[0], Message::user("padded"));
    }

    #[tokio::test]
    async fn shutdown_while_waiting_says_goodbye() {
        let session = session();
        let mut out = Vec::new();
        run_repl(&session, "hello\n".as_bytes(), &mut out, async {})
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.ends_with("Goodbye!\n"));
        assert!(session.is_empty().await);
    }

    #[tokio::test]
    async fn shutdown_during_a_turn_says_goodbye() {
        struct Stalled;

        #[async_trait]
        impl CompletionClient for Stalled {
            async fn complete(&self, _: &ChatCompletionRequest) -> Result<String, ClientError> {
                std::future::pending().await
            }
        }

        let session = Session::new(
            Arc::new(Stalled),
            SessionConfig {
                model: "m".into(),
                system_prompt: "s".into(),
                max_tokens: 8,
            },
        );
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let shutdown = async move {
            let _ = rx.await;
        };
        let mut out = Vec::new();
        let repl = run_repl(&session, "hello\n".as_bytes(), &mut out, shutdown);
        let interrupt = async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            let _ = tx.send(());
        };
        let (result, ()) = tokio::join!(repl, interrupt);
        result.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Agent: "));
        assert!(out.ends_with("Goodbye!\n"));
        assert_eq!(session.history().await, vec![Message::user("hello")]);
    }
}
