use crate::app::{App, Severity};
use ratatui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn draw_status_bar<B: Backend>(f: &mut Frame, app: &mut App, area: Rect) {
    if let Some(notification) = &app.notification {
        // Notifications expire after 5 seconds.
        if notification.shown_at.elapsed().as_secs() < 5 {
            let color = match notification.severity {
                Severity::Success => Color::Green,
                Severity::Info => Color::Yellow,
                Severity::Warning => Color::Magenta,
                Severity::Error => Color::Red,
            };

            let message = if notification.detail.is_empty() {
                notification.title.clone()
            } else {
                format!("{}: {}", notification.title, notification.detail)
            };

            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(color))
                .alignment(ratatui::layout::Alignment::Center);
            f.render_widget(paragraph, area);
        } else {
            app.clear_notification();
        }
    }
}
