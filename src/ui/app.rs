use crate::config::Config;
use crate::display::{Flag, SharedSurface, Targets, Toggle};
use crate::feeds::ProfileSource;
use crate::reader::{Outcome, Reader, SharedReader};
use crate::ui::widgets::ProfileWidget;
use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

pub struct App {
    reader: SharedReader,
    widget: ProfileWidget,
    load_more: Flag,
    username: String,
    status_message: Option<String>,
    outcome_tx: UnboundedSender<Outcome>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: &Config,
        source: Arc<dyn ProfileSource>,
        username: Option<String>,
    ) -> (Self, UnboundedReceiver<Outcome>) {
        let surface = SharedSurface::new();
        let loader = Flag::new(false);
        let load_more = Flag::new(false);

        let reader = Reader::new(
            source,
            Targets {
                display: Box::new(surface.clone()),
                loaders: vec![Box::new(loader.clone()) as Box<dyn Toggle>],
                load_more: Box::new(load_more.clone()),
            },
        )
        .with_page_size(config.page_size);

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let app = Self {
            reader: SharedReader::new(reader),
            widget: ProfileWidget::new("catfeed".to_string(), surface, loader),
            load_more,
            username: username.unwrap_or_else(|| config.username.clone()),
            status_message: None,
            outcome_tx,
            should_quit: false,
        };
        (app, outcome_rx)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('n') if ctrl => self.get_more_posts(),
            KeyCode::Char('o') if ctrl => self.open_selected(),
            KeyCode::Enter => self.get_posts(),
            KeyCode::Up => self.widget.scroll_up(),
            KeyCode::Down => self.widget.scroll_down(),
            KeyCode::Backspace => {
                self.username.pop();
            }
            KeyCode::Char(c) if !ctrl => self.username.push(c),
            _ => {}
        }
    }

    fn get_posts(&mut self) {
        self.start_load(false);
    }

    fn get_more_posts(&mut self) {
        if self.load_more.is_visible() {
            self.start_load(true);
        }
    }

    fn start_load(&mut self, more: bool) {
        let mut reader = match self.reader.try_acquire() {
            Ok(reader) => reader,
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };

        // read under the lock so a finished page is never requested twice
        let cursor = if more {
            match reader.cursor() {
                Some(timestamp) => Some(timestamp.saturating_sub(1)),
                None => return,
            }
        } else {
            self.widget.reset_scroll();
            None
        };
        self.status_message = None;

        let username = self.username.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = reader.show_data(&username, cursor).await;
            let _ = tx.send(outcome);
        });
    }

    fn open_selected(&mut self) {
        let Some(url) = self.widget.get_selected_url() else {
            self.status_message = Some("No link in the selected entry.".to_string());
            return;
        };
        info!(%url, "opening link");
        if let Err(e) = open::that(&url) {
            warn!(%url, error = %e, "failed to open link");
            self.status_message = Some(format!("Failed to open {}: {}", url, e));
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let input = Paragraph::new(self.username.as_str()).block(
            Block::default()
                .title(" Username ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(input, chunks[0]);

        self.widget.render(frame, chunks[1], true);

        let footer = match &self.status_message {
            Some(message) => Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Yellow),
            )),
            None => {
                let mut help = String::from("Enter: get posts | ");
                if self.load_more.is_visible() {
                    help.push_str("Ctrl+n: load more | ");
                }
                help.push_str("Ctrl+o: open link | Up/Down: scroll | Esc: quit");
                Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)))
            }
        };
        frame.render_widget(Paragraph::new(footer), chunks[2]);
    }

    pub async fn run(
        mut self,
        terminal: &mut DefaultTerminal,
        mut outcomes: UnboundedReceiver<Outcome>,
    ) -> Result<()> {
        let mut events = EventStream::new();
        // redraws while a load is running on a background task
        let mut tick = tokio::time::interval(Duration::from_millis(250));

        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                // redraw as soon as a load finishes
                Some(_) = outcomes.recv() => {}
                _ = tick.tick() => {}
            }
        }

        Ok(())
    }
}

/// Take over the terminal and run the reader UI until the user quits.
pub async fn run(
    config: &Config,
    source: Arc<dyn ProfileSource>,
    username: Option<String>,
) -> Result<()> {
    let (app, outcomes) = App::new(config, source, username);
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal, outcomes).await;
    ratatui::restore();
    result
}
