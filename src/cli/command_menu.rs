//! Command Menu (TUI popup)
//!
//! Shown when the user types a bare "/" at the prompt.

use ratatui::{
    crossterm::event::{self, Event, KeyCode, KeyEventKind},
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::io;

/// Command menu item
#[derive(Debug, Clone, PartialEq)]
pub struct CommandItem {
    /// Command name
    pub name: &'static str,
    /// Description
    pub description: &'static str,
}

/// All menu entries
pub fn menu_items() -> &'static [CommandItem] {
    &[
        CommandItem {
            name: "/tables",
            description: "Show the tables and columns of the store",
        },
        CommandItem {
            name: "/help",
            description: "Show detailed help",
        },
        CommandItem {
            name: "/quit",
            description: "Exit sql-chat",
        },
    ]
}

/// Result of running the command menu
#[derive(Debug, Clone, PartialEq)]
pub enum MenuResult {
    /// User selected a command
    Command(String),
    /// User cancelled (ESC)
    Cancelled,
    /// User wants to type their own input
    TextInput,
}

/// Display the command menu and return the selection
pub fn show_command_menu() -> io::Result<MenuResult> {
    let commands = menu_items();
    let mut state = ListState::default();
    state.select(Some(0));

    crossterm::terminal::enable_raw_mode()?;
    let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
    let result = ratatui::Terminal::new(backend)
        .and_then(|mut terminal| {
            let picked = run_menu(&mut terminal, commands, &mut state);
            terminal.clear()?;
            picked
        });
    crossterm::terminal::disable_raw_mode()?;

    result
}

fn run_menu(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>,
    commands: &[CommandItem],
    state: &mut ListState,
) -> io::Result<MenuResult> {
    loop {
        terminal.draw(|f| ui(f, commands, state))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if let Some(result) = apply_key(key.code, commands, state) {
            return Ok(result);
        }
    }
}

/// Move the selection or finish, depending on the key
fn apply_key(code: KeyCode, commands: &[CommandItem], state: &mut ListState) -> Option<MenuResult> {
    let selected = state.selected().unwrap_or(0);
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(MenuResult::Cancelled),
        KeyCode::Enter => commands
            .get(selected)
            .map(|item| MenuResult::Command(item.name.to_string())),
        KeyCode::Down | KeyCode::Char('j') => {
            if selected + 1 < commands.len() {
                state.select(Some(selected + 1));
            }
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.select(Some(selected.saturating_sub(1)));
            None
        }
        KeyCode::Char('/') => Some(MenuResult::TextInput),
        _ => None,
    }
}

fn ui(f: &mut Frame, commands: &[CommandItem], state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let border = Style::default().fg(Color::Cyan);

    let header = Paragraph::new(vec![
        Line::from(" sql-chat ").style(border.add_modifier(Modifier::BOLD)),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(border))
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = commands
        .iter()
        .map(|cmd| ListItem::new(format!("  {:<10} - {}", cmd.name, cmd.description)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).border_style(border))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::Black)
                .bg(Color::Cyan),
        );
    f.render_stateful_widget(list, chunks[1], state);

    let help = Paragraph::new(vec![
        Line::from(" ↑/k: Up  ↓/j: Down  Enter: Select  ESC/q: Cancel  /: Type command ")
            .style(Style::default().fg(Color::Gray)),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(border))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(help, chunks[2]);
}
