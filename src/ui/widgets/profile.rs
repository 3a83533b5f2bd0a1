use crate::display::{Block as NodeBlock, Flag, Node, SharedSurface};
use crate::format::find_urls;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Scrollable view over the reader's output surface.
pub struct ProfileWidget {
    title: String,
    surface: SharedSurface,
    loader: Flag,
    scroll_state: ListState,
}

impl ProfileWidget {
    pub fn new(title: String, surface: SharedSurface, loader: Flag) -> Self {
        let mut scroll_state = ListState::default();
        scroll_state.select(Some(0));

        Self {
            title,
            surface,
            loader,
            scroll_state,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, selected: bool) {
        let border_style = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };

        let loading = self.loader.is_visible();
        let title = if loading {
            format!(" {} (loading...) ", self.title)
        } else {
            format!(" {} ", self.title)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let nodes = self.surface.snapshot();
        if nodes.is_empty() {
            let hint = if loading {
                "Loading..."
            } else {
                "Type a username and press Enter."
            };
            let hint_text = List::new(vec![ListItem::new(hint)]).block(block);
            frame.render_widget(hint_text, area);
            return;
        }

        // borders and the highlight symbol
        let width = area.width.saturating_sub(4).max(1) as usize;
        let items: Vec<ListItem> = nodes.iter().map(|node| node_item(node, width)).collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let mut state = self.scroll_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }

    pub fn scroll_up(&mut self) {
        if let Some(selected) = self.scroll_state.selected() {
            if selected > 0 {
                self.scroll_state.select(Some(selected - 1));
            }
        }
    }

    pub fn scroll_down(&mut self) {
        if let Some(selected) = self.scroll_state.selected() {
            if selected < self.surface.len().saturating_sub(1) {
                self.scroll_state.select(Some(selected + 1));
            }
        }
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_state.select(Some(0));
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.scroll_state.selected()
    }

    /// First link found in the selected entry.
    pub fn get_selected_url(&self) -> Option<String> {
        let idx = self.scroll_state.selected()?;
        let node = self.surface.snapshot().into_iter().nth(idx)?;
        match node {
            Node::Article(blocks) => blocks.iter().find_map(|block| match block {
                NodeBlock::Markup { text, .. } => find_urls(text).into_iter().next(),
                _ => None,
            }),
            Node::Paragraph { .. } => None,
        }
    }
}

fn wrapped(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    textwrap::wrap(text, width)
        .into_iter()
        .map(|line| Line::from(Span::styled(line.into_owned(), style)))
        .collect()
}

fn node_item(node: &Node, width: usize) -> ListItem<'static> {
    let mut lines = Vec::new();
    match node {
        Node::Paragraph { text, .. } => {
            let style = if node.is_error() {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Cyan)
            };
            lines.extend(wrapped(text, width, style));
        }
        Node::Article(blocks) => {
            for block in blocks {
                match block {
                    NodeBlock::Text(text) => {
                        lines.extend(wrapped(text, width, Style::default().fg(Color::DarkGray)));
                    }
                    NodeBlock::Label(text) => {
                        lines.push(Line::from(Span::styled(
                            text.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        )));
                    }
                    NodeBlock::Avatar(src) => {
                        lines.push(Line::from(Span::styled(
                            format!("[avatar] {}", src),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                    NodeBlock::Markup { text, .. } => {
                        lines.extend(wrapped(text, width, Style::default().fg(Color::White)));
                    }
                }
            }
            lines.push(Line::from(""));
        }
    }
    ListItem::new(lines)
}
