//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::app::{App, Focus, TextInput};
use crate::display::UrlDisplay;

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Name
            Constraint::Length(3), // URL
            Constraint::Length(1), // Buttons
            Constraint::Min(3),    // List
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    draw_title(frame, chunks[0]);
    draw_input(frame, app, &app.name_input, " Name ", Focus::Name, chunks[1]);
    draw_input(frame, app, &app.url_input, " Link ", Focus::Url, chunks[2]);
    draw_buttons(frame, app, chunks[3]);
    draw_links(frame, app, chunks[4]);
    draw_status_bar(frame, app, chunks[5]);

    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled("🌐 ", Style::default().fg(Color::Blue)),
        Span::styled("linkbook", Style::default().add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

/// Draw one of the two text fields, placing the cursor if it has focus
fn draw_input(
    frame: &mut Frame,
    app: &App,
    input: &TextInput,
    title: &str,
    focus: Focus,
    area: Rect,
) {
    let is_active = app.focus == focus;

    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let (scroll, cursor_col) = input_viewport(input, area.width.saturating_sub(2));
    let paragraph = Paragraph::new(input.value.as_str())
        .block(block)
        .scroll((0, scroll));
    frame.render_widget(paragraph, area);

    if is_active {
        let cursor_x = area.x.saturating_add(1).saturating_add(cursor_col);
        frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
    }
}

/// Horizontal scroll and cursor column for a field `width` cells wide
///
/// Both are in terminal cells, so wide characters count double. The text
/// scrolls just far enough to keep the cursor on its last cell.
fn input_viewport(input: &TextInput, width: u16) -> (u16, u16) {
    let before_cursor: String = input.value.chars().take(input.cursor).collect();
    let cursor_cells = Span::raw(before_cursor).width();
    let scroll = cursor_cells.saturating_sub(usize::from(width.saturating_sub(1)));
    let cursor_col = cursor_cells - scroll;
    (
        u16::try_from(scroll).unwrap_or(u16::MAX),
        u16::try_from(cursor_col).unwrap_or(u16::MAX),
    )
}

/// Draw the save hint and, when a deletion can be undone, the undo button
fn draw_buttons(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " [Enter] Save ",
        Style::default().fg(Color::Black).bg(Color::Green),
    )];

    if app.undo_available {
        let label = match &app.deleted_name {
            Some(name) => format!(" [u] Undo delete of '{}' ", name),
            None => " [u] Undo delete ".to_string(),
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            label,
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the sorted link list
fn draw_links(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::List;

    let items: Vec<ListItem> = app
        .links
        .iter()
        .map(|link| {
            let name = if link.name.is_empty() {
                Span::styled("(no name)", Style::default().add_modifier(Modifier::DIM))
            } else {
                Span::raw(link.name.as_str())
            };

            let url_line = match UrlDisplay::classify(&link.url) {
                UrlDisplay::Link { raw, .. } => Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        raw,
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::UNDERLINED),
                    ),
                ]),
                invalid @ UrlDisplay::Invalid(_) => Line::from(vec![
                    Span::raw("  "),
                    Span::styled(invalid.to_string(), Style::default().fg(Color::Red)),
                ]),
            };

            ListItem::new(vec![Line::from(name), url_line])
        })
        .collect();

    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(format!(" Links ({}) ", app.links.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let highlight_style = if is_active {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style);

    let mut state = ListState::default();
    if !app.links.is_empty() {
        state.select(Some(app.link_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.focus.is_input() {
        "Tab:next field  Enter:save  Esc:list  Ctrl-C:quit".to_string()
    } else {
        "j/k:move  Enter:open  d:del  u:undo  a:add  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = 46.min(area.width.saturating_sub(4));
    let popup_height = 18.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Form:"),
        Line::from("  Tab / Shift-Tab   Next / previous field"),
        Line::from("  Enter             Save link"),
        Line::from("  Esc               Go to list"),
        Line::from(""),
        Line::from("List:"),
        Line::from("  j/k, ↑/↓          Move up/down"),
        Line::from("  g / G             First / last link"),
        Line::from("  Enter             Open link in browser"),
        Line::from("  d                 Delete link"),
        Line::from("  u                 Undo last delete"),
        Line::from("  a                 Back to the form"),
        Line::from("  q                 Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkbook_core::{LinkListController, LinkStore, MemorySlots};
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_renders_valid_and_invalid_urls() {
        let mut links = LinkListController::new(LinkStore::new(MemorySlots::new()));
        links.add("Acme", "https://acme.example");
        links.add("Bee", "not a url");
        let app = App::on_startup(&mut links);

        let screen = render(&app);

        assert!(screen.contains("https://acme.example"));
        assert!(screen.contains("Invalid URL: not a url"));
        assert!(screen.contains("Links (2)"));
        assert!(!screen.contains("Undo delete"));
    }

    #[test]
    fn test_undo_button_appears_after_delete() {
        let mut links = LinkListController::new(LinkStore::new(MemorySlots::new()));
        links.add("Acme", "https://acme.example");
        let mut app = App::on_startup(&mut links);

        app.delete_selected(&mut links);
        let screen = render(&app);
        assert!(screen.contains("Undo delete of 'Acme'"));

        app.on_undo_pressed(&mut links);
        let screen = render(&app);
        assert!(!screen.contains("Undo delete"));
    }

    #[test]
    fn test_viewport_counts_cells_not_chars() {
        let input = TextInput {
            value: "日本abc".to_string(),
            cursor: 2,
        };
        assert_eq!(input_viewport(&input, 20), (0, 4));
    }

    #[test]
    fn test_viewport_scrolls_to_keep_cursor_visible() {
        let input = TextInput {
            value: "abcdefghij".to_string(),
            cursor: 10,
        };
        assert_eq!(input_viewport(&input, 4), (7, 3));

        let at_start = TextInput {
            value: "abcdefghij".to_string(),
            cursor: 0,
        };
        assert_eq!(input_viewport(&at_start, 4), (0, 0));
        assert_eq!(input_viewport(&input, 0), (10, 0));
    }

    #[test]
    fn test_very_long_input_renders_its_tail() {
        let mut links = LinkListController::new(LinkStore::new(MemorySlots::new()));
        let mut app = App::on_startup(&mut links);
        let value = format!("{}END", "x".repeat(u16::MAX as usize));
        let cursor = value.chars().count();
        app.name_input = TextInput { value, cursor };

        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let name_row: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 2)].symbol())
            .collect();
        assert!(name_row.contains("xEND"));
    }
}
