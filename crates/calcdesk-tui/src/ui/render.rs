use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, Page};

use super::pages::{auth, calculator, history, profile};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_confirm_overlay(
            frame,
            "Are you sure you want to quit?",
            "quit",
        ),
        AppState::ConfirmingDelete(id) => {
            let question = match app.calculations.iter().find(|c| c.id == id) {
                Some(calc) => format!("Delete {}?", calc.equation()),
                None => "Delete this calculation?".to_string(),
            };
            render_confirm_overlay(frame, &question, "delete");
        }
        AppState::ConfirmingAccountDelete => render_confirm_overlay(
            frame,
            "Delete your account? This cannot be undone.",
            "delete",
        ),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  calcdesk - {}", app.page.title());
    let user = app
        .display_username()
        .map(|u| format!("{}  ", u))
        .unwrap_or_default();
    let help_hint = "[F1] Help";

    let used = title.chars().count() + user.chars().count() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs: Vec<(&str, bool)> = if app.is_authenticated() {
        vec![
            ("[F2] Calculator", app.page == Page::Calculator),
            ("[F3] History", app.page == Page::History),
            ("[F4] Profile", app.page == Page::Profile),
        ]
    } else {
        vec![
            ("Login", app.page == Page::Login),
            ("[F2] Register", app.page == Page::Register),
        ]
    };

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(*label, styles::tab_style(*selected)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.page {
        Page::Login => auth::render_login(frame, app, area),
        Page::Register => auth::render_register(frame, app, area),
        Page::Calculator => calculator::render(frame, app, area),
        Page::History => history::render(frame, app, area),
        Page::Profile => profile::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.is_authenticated() {
        "[Ctrl+L] logout | [Esc] quit"
    } else {
        "[Esc] quit"
    };

    let left = match app.toast {
        Some(ref toast) => Span::styled(format!(" {} ", toast.message), styles::toast_style(toast.kind)),
        None if app.pending_requests > 0 => Span::styled(" Working... ", styles::muted_style()),
        None => Span::styled(format!(" {} ", app.api.base_url()), styles::muted_style()),
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left.content.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        left,
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 25, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            format!("  calcdesk {}", version),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("F2/F3/F4", "Calculator / History / Profile"),
        help_line("PgUp/PgDn", "Previous / next page"),
        help_line("Tab/↓", "Next field"),
        help_line("S-Tab/↑", "Previous field"),
        help_line("Enter", "Next field or submit"),
        help_line("Esc", "Back / quit"),
        Line::from(""),
        Line::from(Span::styled(" Calculator", styles::highlight_style())),
        help_line("←/→", "Change operation"),
        help_line("+-*/^%", "Pick operation directly"),
        Line::from(""),
        Line::from(Span::styled(" History", styles::highlight_style())),
        help_line("↑/↓", "Select calculation"),
        help_line("d", "Delete selected"),
        help_line("r", "Reload"),
        Line::from(""),
        help_line("Ctrl+L", "Logout"),
        help_line("Ctrl+D", "Delete account (Profile)"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("F1", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Yes/no dialog: `[Y]` performs `action`, `[N]` cancels
fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(56, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", question),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
