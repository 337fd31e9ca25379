//! Live room watch screen using ratatui

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;

use crate::client::LineClient;
use crate::messages::{ServerMessage, Snapshot, Vote};

/// Application state for the watch screen
struct App {
    /// The WebSocket client
    client: LineClient,
    /// Latest room snapshot
    snapshot: Snapshot,
    /// Display name, if the watcher joined and may vote
    name: Option<String>,
    /// Should quit
    should_quit: bool,
    /// Status message
    status: String,
}

impl App {
    fn new(client: LineClient, snapshot: Snapshot, name: Option<String>) -> Self {
        let status = match &name {
            Some(name) => format!("Watching as {} (y/n to vote, q to quit)", name),
            None => "Watching (q to quit)".to_string(),
        };
        Self {
            client,
            snapshot,
            name,
            should_quit: false,
            status,
        }
    }

    fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Snapshot(snapshot) | ServerMessage::RoomUpdate(snapshot) => {
                self.snapshot = snapshot;
            }
            ServerMessage::Error { message } => {
                self.status = format!("Error: {}", message);
            }
            _ => {}
        }
    }

    async fn cast_vote(&mut self, vote: Vote) {
        let Some(name) = self.name.clone() else {
            self.status = "Join with --name to vote".to_string();
            return;
        };

        let room_id = self.snapshot.room_id.clone();
        match self.client.cast_vote(&room_id, &name, vote).await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.status = format!("Voted {}", vote.as_str());
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
            }
        }
    }
}

/// Run the watch screen
pub async fn run(client: LineClient, snapshot: Snapshot, name: Option<String>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, snapshot, name);

    // Main loop
    loop {
        // Draw UI
        terminal.draw(|f| draw_ui(f, &app))?;

        // Handle events with timeout
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match (key.code, key.modifiers) {
                    (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                        app.should_quit = true;
                    }
                    (KeyCode::Char('q'), _) => {
                        app.should_quit = true;
                    }
                    (KeyCode::Char('y'), _) => {
                        app.cast_vote(Vote::Yes).await;
                    }
                    (KeyCode::Char('n'), _) => {
                        app.cast_vote(Vote::No).await;
                    }
                    _ => {}
                }
            }
        }

        // Check for server messages
        while let Some(msg) = app.client.try_recv() {
            app.handle_server_message(msg);
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

fn draw_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Results
            Constraint::Min(5),    // Users
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_results(f, app, chunks[0]);
    draw_users(f, app, chunks[1]);
    draw_status(f, app, chunks[2]);
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let tally = &app.snapshot.tally;
    let line = &app.snapshot.money_line;

    let lines = vec![
        Line::from(vec![
            Span::styled("Yes ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} votes", tally.yes_count)),
            Span::raw("   money line "),
            Span::styled(
                format!("{:.2}", line.yes_line),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("No  ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} votes", tally.no_count)),
            Span::raw("   money line "),
            Span::styled(
                format!("{:.2}", line.no_line),
                Style::default().fg(Color::Red),
            ),
        ]),
    ];

    let results = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" Room {} ", app.snapshot.room_id))
            .borders(Borders::ALL),
    );

    f.render_widget(results, area);
}

fn draw_users(f: &mut Frame, app: &App, area: Rect) {
    let mut names: Vec<&String> = app.snapshot.users.keys().collect();
    names.sort();

    let items: Vec<ListItem> = names
        .into_iter()
        .map(|name| {
            let (label, style) = match app.snapshot.users[name] {
                Some(Vote::Yes) => ("yes", Style::default().fg(Color::Green)),
                Some(Vote::No) => ("no", Style::default().fg(Color::Red)),
                None => ("hasn't voted yet", Style::default().fg(Color::DarkGray)),
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{}: ", name)),
                Span::styled(label, style),
            ]))
        })
        .collect();

    let users = List::new(items).block(
        Block::default()
            .title(" Users ")
            .borders(Borders::ALL),
    );

    f.render_widget(users, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let user_count = app.snapshot.users.len();
    let status_text = format!(
        " {} | {} user{}",
        app.status,
        user_count,
        if user_count == 1 { "" } else { "s" }
    );

    let status = Paragraph::new(status_text).style(
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray),
    );

    f.render_widget(status, area);
}
