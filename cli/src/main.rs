//! Lineroom CLI client - vote in rooms and watch live money lines

mod client;
mod messages;
mod tui;

use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::messages::{Snapshot, Vote};

#[derive(Parser)]
#[command(name = "lineroom")]
#[command(about = "CLI client for Lineroom - live voting rooms with money-line odds")]
#[command(version)]
struct Cli {
    /// Server URL (default: ws://localhost:3000/ws)
    #[arg(short, long, default_value = "ws://localhost:3000/ws")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new room and print its ID
    Create,

    /// Join a room with a display name
    Join {
        /// Room ID
        #[arg(short, long)]
        room: String,

        /// Your display name
        #[arg(short, long)]
        name: String,
    },

    /// Cast a vote (yes or no)
    Vote {
        /// Room ID
        #[arg(short, long)]
        room: String,

        /// Your display name
        #[arg(short, long)]
        name: String,

        /// The vote: yes or no
        #[arg(short, long)]
        vote: String,
    },

    /// Print the current room results
    Show {
        /// Room ID
        #[arg(short, long)]
        room: String,
    },

    /// Watch a room live in an interactive screen
    Watch {
        /// Room ID
        #[arg(short, long)]
        room: String,

        /// Display name; enables voting with the y/n keys
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lineroom_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create => run_create(&cli.server).await,
        Commands::Join { room, name } => run_join(&cli.server, &room, &name).await,
        Commands::Vote { room, name, vote } => run_vote(&cli.server, &room, &name, &vote).await,
        Commands::Show { room } => run_show(&cli.server, &room).await,
        Commands::Watch { room, name } => run_watch(&cli.server, &room, name).await,
    }
}

async fn run_create(server: &str) -> Result<()> {
    let mut client = client::LineClient::connect(server).await?;
    let room_id = client.create_room().await?;

    println!("Created room: {}", room_id);
    Ok(())
}

async fn run_join(server: &str, room_id: &str, name: &str) -> Result<()> {
    let mut client = client::LineClient::connect(server).await?;
    let snapshot = client.join(room_id, name).await?;

    println!("Joined room: {}", room_id);
    print_snapshot(&snapshot);
    Ok(())
}

async fn run_vote(server: &str, room_id: &str, name: &str, vote: &str) -> Result<()> {
    let vote = Vote::from_str(vote).map_err(anyhow::Error::msg)?;

    let mut client = client::LineClient::connect(server).await?;
    let snapshot = client.cast_vote(room_id, name, vote).await?;

    println!("{} voted {} in room {}", name, vote.as_str(), room_id);
    print_snapshot(&snapshot);
    Ok(())
}

async fn run_show(server: &str, room_id: &str) -> Result<()> {
    let mut client = client::LineClient::connect(server).await?;
    let snapshot = client.snapshot(room_id).await?;

    print_snapshot(&snapshot);
    Ok(())
}

async fn run_watch(server: &str, room_id: &str, name: Option<String>) -> Result<()> {
    let mut client = client::LineClient::connect(server).await?;

    // Joining first makes the y/n keys usable immediately
    if let Some(name) = &name {
        client.join(room_id, name).await?;
    }
    let snapshot = client.snapshot(room_id).await?;
    client.subscribe(room_id).await?;

    tui::run(client, snapshot, name).await
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("{:─<40}", "");
    println!(
        "Votes: {} yes / {} no",
        snapshot.tally.yes_count, snapshot.tally.no_count
    );
    println!(
        "Money line: yes {:.2} / no {:.2}",
        snapshot.money_line.yes_line, snapshot.money_line.no_line
    );
    println!("Users:");
    for (user, vote) in &snapshot.users {
        match vote {
            Some(vote) => println!("  {}: {}", user, vote.as_str()),
            None => println!("  {}: hasn't voted yet", user),
        }
    }
}
