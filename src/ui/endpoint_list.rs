use crate::app::App;
use crate::models::strip_protocol;
use crate::ui::centered_rect;
use ratatui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

pub fn draw<B: Backend>(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .title("endr - Endpoint Manager");

    let list_items: Vec<ListItem> = app
        .endpoints
        .iter()
        .enumerate()
        .map(|(i, endpoint)| {
            let is_selected = i == app.selected;

            let mut text = vec![];
            text.push(Span::styled(
                if is_selected { "> " } else { "  " },
                Style::default().fg(Color::Green),
            ));
            text.push(Span::styled(
                format!("[{}] ", endpoint.id),
                Style::default().fg(Color::Yellow),
            ));
            text.push(Span::styled(
                format!("{} ({})", endpoint.name, strip_protocol(&endpoint.url)),
                Style::default().fg(if is_selected {
                    Color::Black
                } else {
                    Color::White
                }),
            ));
            text.push(Span::raw(" "));
            text.push(Span::styled(
                format!("[{}]", endpoint.kind().as_str()),
                Style::default()
                    .fg(if is_selected { Color::Black } else { Color::Gray })
                    .add_modifier(Modifier::DIM),
            ));
            if endpoint.tls_config.tls {
                text.push(Span::raw(" "));
                text.push(Span::styled(
                    "[TLS]",
                    Style::default().fg(if is_selected {
                        Color::Black
                    } else {
                        Color::Cyan
                    }),
                ));
            }

            let style = if is_selected {
                Style::default()
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(text)).style(style)
        })
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_symbol(">")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    f.render_stateful_widget(list, area, &mut app.list_state);

    if app.list_loading {
        draw_loading_overlay::<B>(f);
    }
}

fn draw_loading_overlay<B: Backend>(f: &mut Frame) {
    let area = centered_rect(40, 5, f.size());

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Endpoints")
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new("Loading endpoints...")
        .block(block)
        .alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(Color::White));

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}
