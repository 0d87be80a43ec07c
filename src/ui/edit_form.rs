use crate::app::{App, EditSession, FocusField, SubmitState};
use crate::ui::centered_rect;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

pub fn draw<B: Backend>(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(session) = &app.edit else {
        let title = if app.edit_loading {
            "Loading endpoint details..."
        } else {
            "Endpoint details unavailable — [Esc] to go back"
        };
        let paragraph = Paragraph::new(title)
            .block(Block::default().borders(Borders::ALL).title("Edit endpoint"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, area);
        return;
    };

    let title = format!(
        "Edit endpoint: {} [{}]",
        session.endpoint.name,
        session.kind.as_str()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .title(title);

    let mut lines = vec![
        text_field(session, FocusField::Name, "Name", &session.endpoint.name),
        text_field(session, FocusField::Url, "URL", &session.endpoint.url),
        text_field(
            session,
            FocusField::PublicUrl,
            "Public URL",
            session.endpoint.public_url.as_deref().unwrap_or(""),
        ),
        choice_field(
            session,
            FocusField::Group,
            "Group",
            session.selected_group_name(),
        ),
        choice_field(
            session,
            FocusField::Tls,
            "TLS",
            if session.form.tls { "enabled" } else { "disabled" },
        ),
    ];

    if session.form.tls {
        lines.push(choice_field(
            session,
            FocusField::Mode,
            "Mode",
            session.form.mode.label(),
        ));
        lines.push(cert_field(session, FocusField::CaCert, "CA certificate", &session.form.ca_cert));
        lines.push(cert_field(session, FocusField::Cert, "Certificate", &session.form.cert));
        lines.push(cert_field(session, FocusField::Key, "Key", &session.form.key));
    }

    let paragraph = Paragraph::new(lines).block(block);
    f.render_widget(paragraph, area);

    if session.submit == SubmitState::Submitting {
        draw_submitting_overlay::<B>(f, session);
    }
}

fn field_style(session: &EditSession, field: FocusField) -> Style {
    if session.focus == field {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn text_field<'a>(
    session: &'a EditSession,
    field: FocusField,
    label: &'a str,
    value: &'a str,
) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<16}", label),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(value, field_style(session, field)),
    ])
}

fn choice_field<'a>(
    session: &'a EditSession,
    field: FocusField,
    label: &'a str,
    value: &'a str,
) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<16}", label),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(format!("< {} >", value), field_style(session, field)),
    ])
}

/// Certificate blobs are shown as a size summary, not their contents.
fn cert_field<'a>(
    session: &'a EditSession,
    field: FocusField,
    label: &'a str,
    value: &str,
) -> Line<'a> {
    let summary = if value.is_empty() {
        "<empty>".to_string()
    } else {
        format!("{} byte(s)", value.len())
    };
    Line::from(vec![
        Span::styled(
            format!("{:<16}", label),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(summary, field_style(session, field)),
    ])
}

fn draw_submitting_overlay<B: Backend>(f: &mut Frame, session: &EditSession) {
    let area = centered_rect(50, 5, f.size());

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Updating endpoint")
        .border_style(Style::default().fg(Color::Yellow));

    f.render_widget(Clear, area);

    match session.upload_progress {
        Some(fraction) => {
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(Style::default().fg(Color::Green))
                .ratio(f64::from(fraction.clamp(0.0, 1.0)))
                .label(format!("Uploading certificates... {:.0}%", fraction * 100.0));
            f.render_widget(gauge, area);
        }
        None => {
            let paragraph = Paragraph::new("Applying update...")
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White));
            f.render_widget(paragraph, area);
        }
    }
}
