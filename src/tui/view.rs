use crate::tui::state::{AppState, Screen};
use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    match state.screen {
        Screen::Menu | Screen::UrlInput => draw_menu(f, state, v_chunks[0]),
        Screen::EventBrowser | Screen::NoteInput => draw_browser(f, state, v_chunks[0]),
    }

    // --- Footer ---
    let footer_area = v_chunks[1];
    match state.screen {
        Screen::UrlInput | Screen::NoteInput => {
            let (title, prefix, color) = match state.screen {
                Screen::UrlInput => (" Calendar URL (Enter:Save | Esc:Cancel) ", "> ", Color::Yellow),
                _ => (" Note (Enter:Save | Esc:Cancel) ", "> ", Color::Magenta),
            };
            let input = Paragraph::new(format!("{}{}", prefix, state.input_buffer))
                .style(Style::default().fg(color))
                .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(input, footer_area);
            let cursor_x =
                footer_area.x + 1 + prefix.chars().count() as u16 + state.cursor_position as u16;
            let cursor_y = footer_area.y + 1;
            f.set_cursor_position((cursor_x, cursor_y));
        }
        Screen::Menu | Screen::EventBrowser => {
            let f_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(footer_area);

            let mut message = state.message.clone();
            if state.unsaved_changes {
                message.push_str(" [unsaved]");
            }
            let status = Paragraph::new(message)
                .style(Style::default().fg(Color::Cyan))
                .block(
                    Block::default()
                        .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                        .title(" Status "),
                );

            let help_str = match state.screen {
                Screen::Menu => "1:URL | 2:Browse | 3:Save | q:Quit",
                _ => "Enter:Block/Unblock | n:Note | j/k:Move | Esc:Back",
            };
            let help = Paragraph::new(help_str)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Right)
                .block(
                    Block::default()
                        .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                        .title(" Actions "),
                );
            f.render_widget(status, f_chunks[0]);
            f.render_widget(help, f_chunks[1]);
        }
    }
}

fn draw_menu(f: &mut Frame, state: &AppState, area: Rect) {
    let url = if state.config.origin_url.is_empty() {
        "(not set)".to_string()
    } else {
        state.config.origin_url.clone()
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Calendar URL: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(url),
        ]),
        Line::from(""),
        Line::from("  1. Set calendar URL"),
        Line::from("  2. Browse upcoming events"),
        Line::from("  3. Save configuration"),
        Line::from("  q. Quit"),
        Line::from(""),
        Line::from(Span::styled(
            format!("Blocked ({}):", state.config.blocklist.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    for title in &state.config.blocklist {
        lines.push(Line::from(Span::styled(
            format!("  ✗ {}", title),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Notes ({}):", state.config.notes.len()),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (key, note) in &state.config.notes {
        lines.push(Line::from(format!("  {}: {}", key, note)));
    }

    let menu = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" unical "));
    f.render_widget(menu, area);
}

fn draw_browser(f: &mut Frame, state: &mut AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let items: Vec<ListItem> = state
        .events
        .iter()
        .map(|e| {
            let blocked = state.is_blocked(e);
            let (mark, style) = if blocked {
                ("✗", Style::default().fg(Color::DarkGray))
            } else {
                ("✓", Style::default().fg(Color::Green))
            };
            let note_str = if state.note_for(e).is_some() { " [N]" } else { "" };
            let when = e.start.with_timezone(&Local).format("%a %d/%m %H:%M");
            ListItem::new(Line::from(vec![Span::styled(
                format!("{} {}  {}{}", mark, when, e.title, note_str),
                style,
            )]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Upcoming events ({}) ", state.events.len()))
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Blue),
        );
    f.render_stateful_widget(list, chunks[0], &mut state.list_state);

    let mut details = String::new();
    if let Some(entry) = state.get_selected_event() {
        if !entry.description.is_empty() {
            details.push_str(&entry.description);
            details.push_str("\n\n");
        }
        if let Some(note) = state.note_for(entry) {
            details.push_str("[Note]: ");
            details.push_str(note);
        }
    }
    if details.is_empty() {
        details = "No details.".to_string();
    }
    let details = Paragraph::new(details)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    f.render_widget(details, chunks[1]);

    if state.events.is_empty() {
        let area = centered_rect(50, 20, chunks[0]);
        let empty = Paragraph::new("No upcoming events.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(Clear, area);
        f.render_widget(empty, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
