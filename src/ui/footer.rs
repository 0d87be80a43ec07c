use crate::app::{App, SubmitState, View};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn draw_footer<B: Backend>(f: &mut Frame, app: &App, area: Rect) {
    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let submitting = app
        .edit
        .as_ref()
        .is_some_and(|s| s.submit == SubmitState::Submitting);

    let (nav_text, action_text) = match app.view {
        View::List => (
            "↑/k: Up  ↓/j: Down  [Enter] Edit",
            "[e] Open file [r] Reload [q] Quit",
        ),
        View::Edit if submitting => ("Updating endpoint...", "Please wait"),
        View::Edit => (
            "[Tab]/↓: Next field  [Shift+Tab]/↑: Previous  [Enter/Space] Toggle",
            "[Ctrl+S] Update [Esc] Back",
        ),
    };

    let nav_help = Paragraph::new(nav_text).style(Style::default().fg(if submitting {
        Color::Yellow
    } else {
        Color::Gray
    }));

    let action_help = Paragraph::new(action_text)
        .style(Style::default().fg(if submitting {
            Color::Yellow
        } else {
            Color::Gray
        }))
        .alignment(ratatui::layout::Alignment::Right);

    f.render_widget(nav_help, footer[0]);
    f.render_widget(action_help, footer[1]);
}
