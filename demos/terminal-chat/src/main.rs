use roomchat::prelude::*;
use roomchat::DEFAULT_ENDPOINT;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Prints everything the session renders to stdout.
struct TerminalView;

impl View for TerminalView {
    fn append_message(&mut self, message: RenderedMessage) {
        let classes = message.style_classes().join(" ");
        println!("[{classes}] {}: {}", message.sender, message.text);
    }

    fn clear_messages(&mut self) {
        println!("----------------------------------------");
    }

    fn set_header(&mut self, text: &str) {
        println!("== {text} ==");
    }

    fn set_action_affordance(&mut self, affordance: Affordance) {
        match affordance {
            Affordance::Join => println!("({}: /join <room> <username>)", affordance.label()),
            Affordance::Leave => println!("({}: /leave)", affordance.label()),
        }
    }

    fn set_inputs_enabled(&mut self, _enabled: bool) {}
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// What one line of input asks for.
#[derive(Debug, PartialEq)]
enum Input {
    Join { room: String, username: String },
    Leave,
    Quit,
    Say(String),
    Usage,
}

fn parse_line(line: &str) -> Input {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("/join") => match (words.next(), words.next()) {
            (Some(room), Some(username)) => Input::Join {
                room: room.to_string(),
                username: username.to_string(),
            },
            _ => Input::Usage,
        },
        Some("/leave") => Input::Leave,
        Some("/quit") => Input::Quit,
        _ => Input::Say(line.to_string()),
    }
}

/// Reads stdin until EOF or `/quit`, turning lines into commands.
async fn read_input(handle: ClientHandle) -> Result<(), RoomchatError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut username = String::new();

    while let Ok(Some(line)) = lines.next_line().await {
        match parse_line(&line) {
            Input::Join { room, username: name } => {
                handle.join(&room, &name).await?;
                username = name;
            }
            Input::Leave => handle.leave().await?,
            Input::Quit => break,
            Input::Say(text) => handle.send_message(&text, &username).await?,
            Input::Usage => eprintln!("usage: /join <room> <username>"),
        }
    }
    handle.disconnect().await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let client = RoomchatClient::builder()
        .endpoint(&endpoint)
        .build(TerminalView);
    let (handle, commands) = client.command_channel();

    let input = tokio::spawn(read_input(handle));
    let exit = client.run(commands).await;
    input.abort();

    match exit.reason {
        ExitReason::UserDisconnected | ExitReason::CommandsClosed => {}
        reason => {
            tracing::error!(?reason, "chat session ended");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join() {
        assert_eq!(
            parse_line("/join lobby alice"),
            Input::Join {
                room: "lobby".into(),
                username: "alice".into()
            }
        );
    }

    #[test]
    fn test_parse_join_missing_username_shows_usage() {
        assert_eq!(parse_line("/join lobby"), Input::Usage);
    }

    #[test]
    fn test_parse_commands_and_text() {
        assert_eq!(parse_line("/leave"), Input::Leave);
        assert_eq!(parse_line("/quit"), Input::Quit);
        assert_eq!(parse_line("  hello there "), Input::Say("  hello there ".into()));
    }
}
