use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::forms::Form;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

const BOX_WIDTH: u16 = 52;

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    render_auth_box(
        frame,
        area,
        " Login ",
        &app.login_form,
        vec![
            Span::styled("  No account? Press ", styles::muted_style()),
            Span::styled("F2", styles::help_key_style()),
            Span::styled(" to register", styles::muted_style()),
        ],
    );
}

pub fn render_register(frame: &mut Frame, app: &App, area: Rect) {
    render_auth_box(
        frame,
        area,
        " Register ",
        &app.register_form,
        vec![
            Span::styled("  Have an account? Press ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to login", styles::muted_style()),
        ],
    );
}

fn render_auth_box(frame: &mut Frame, area: Rect, title: &str, form: &Form, hint: Vec<Span<'static>>) {
    // fields + blank + button + blank + hint + top padding + borders
    let height = form.fields.len() as u16 + 7;
    let rect = centered_rect_fixed(BOX_WIDTH, height, area);
    frame.render_widget(Clear, rect);

    let mut lines = vec![Line::from("")];
    lines.extend(super::form_lines(form, true));
    lines.push(Line::from(""));
    lines.push(Line::from(hint));

    let block = Block::default()
        .title(title.to_string())
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
