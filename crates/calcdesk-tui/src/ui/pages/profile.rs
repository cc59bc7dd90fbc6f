use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use calcdesk_core::utils::format_timestamp;

use crate::app::{App, ProfileSection};
use crate::ui::styles;

use super::form_lines;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Account summary
            Constraint::Length(7), // Profile form
            Constraint::Length(7), // Password form
            Constraint::Min(3),    // Danger zone
        ])
        .split(area);

    render_summary(frame, app, chunks[0]);
    render_form_section(
        frame,
        chunks[1],
        " Edit Profile ",
        form_lines(&app.profile_form, app.profile_section == ProfileSection::Profile),
        app.profile_section == ProfileSection::Profile,
    );
    render_form_section(
        frame,
        chunks[2],
        " Change Password ",
        form_lines(&app.password_form, app.profile_section == ProfileSection::Password),
        app.profile_section == ProfileSection::Password,
    );
    render_danger_zone(frame, chunks[3]);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.current_user {
        Some(ref user) => vec![
            Line::from(vec![
                Span::styled("  Username:  ", styles::muted_style()),
                Span::styled(user.username.clone(), styles::list_item_style()),
            ]),
            Line::from(vec![
                Span::styled("  Email:     ", styles::muted_style()),
                Span::styled(user.email.clone(), styles::list_item_style()),
            ]),
            Line::from(vec![
                Span::styled("  Joined:    ", styles::muted_style()),
                Span::styled(format_timestamp(&user.created_at), styles::list_item_style()),
            ]),
        ],
        None => vec![Line::from(Span::styled("  Loading...", styles::muted_style()))],
    };

    let block = Block::default()
        .title(" Account ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_form_section(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    lines: Vec<Line<'static>>,
    active: bool,
) {
    let block = Block::default()
        .title(title)
        .title_style(if active {
            styles::title_style()
        } else {
            styles::muted_style()
        })
        .borders(Borders::ALL)
        .border_style(styles::border_style(active));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_danger_zone(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("  Press ", styles::muted_style()),
        Span::styled("Ctrl+D", styles::help_key_style()),
        Span::styled(
            " to permanently delete your account and all calculations",
            styles::muted_style(),
        ),
    ]);

    let block = Block::default()
        .title(" Danger Zone ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::error_style());

    frame.render_widget(Paragraph::new(line).block(block), area);
}
