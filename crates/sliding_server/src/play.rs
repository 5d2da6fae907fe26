//! Terminal player: drives a [`ClientController`] over a live socket.

use crate::client::ClientController;
use crate::protocol::{ClientEvent, ServerEvent, decode, encode};
use futures::{Sink, SinkExt, StreamExt};
use sliding_tictactoe::{GameStatus, Position};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, instrument, warn};

/// A line typed by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Start the game.
    Start,
    /// Reset the game.
    Reset,
    /// Place a mark.
    Play(Position),
    /// Show the command list.
    Help,
    /// Leave.
    Quit,
}

impl Input {
    /// Parses one input line.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "start" | "s" => Some(Input::Start),
            "reset" | "r" => Some(Input::Reset),
            "help" | "h" | "?" => Some(Input::Help),
            "quit" | "q" | "exit" => Some(Input::Quit),
            other => Position::parse(other).map(Input::Play),
        }
    }
}

const HELP: &str = "Commands: start | reset | 0-8 (place mark) | help | quit";

/// Connects to `server_url`, joins `room` and plays from stdin until quit.
#[instrument]
pub async fn run(server_url: &str, room: &str) -> anyhow::Result<()> {
    info!("Connecting to game server");
    let (socket, _) = tokio_tungstenite::connect_async(server_url).await?;
    let (mut sink, mut stream) = socket.split();

    let mut client = ClientController::new();
    let join = client
        .join(room)
        .ok_or_else(|| anyhow::anyhow!("Room name must not be empty"))?;
    send(&mut sink, &join).await?;

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match decode::<ServerEvent>(text.as_str()) {
                    Ok(event) => {
                        debug!(?event, "Server event");
                        client.handle(event);
                        render(&client);
                    }
                    Err(e) => warn!(error = %e, "Dropping malformed frame"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    println!("Server closed the connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let outbound = match Input::parse(&line) {
                    Some(Input::Quit) => break,
                    Some(Input::Help) | None => {
                        println!("{HELP}");
                        continue;
                    }
                    Some(Input::Start) => client.start(),
                    Some(Input::Reset) => client.reset(),
                    Some(Input::Play(pos)) => client.play(pos),
                };
                match outbound {
                    Ok(event) => {
                        send(&mut sink, &event).await?;
                        render(&client);
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    sink.close().await.ok();
    info!("Left game");
    Ok(())
}

async fn send<S>(sink: &mut S, event: &ClientEvent) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let text = encode(event)?;
    sink.send(Message::Text(text.into())).await?;
    Ok(())
}

fn render(client: &ClientController) {
    let game = client.game();
    let side = client
        .side()
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    let status = match game.status() {
        GameStatus::Waiting => "waiting for start".to_string(),
        GameStatus::InProgress if client.my_turn() => "your turn".to_string(),
        GameStatus::InProgress => format!("{} to move", game.current_player()),
        GameStatus::Won(winner) => format!("{winner} wins"),
    };
    println!(
        "\nroom {} | you: {} | players: {}/2 | {}\n{}",
        client.room().as_deref().unwrap_or("-"),
        side,
        client.players_in_room(),
        status,
        game.board()
    );
}
