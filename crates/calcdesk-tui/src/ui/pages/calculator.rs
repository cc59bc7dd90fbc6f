use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use calcdesk_core::models::Operation;
use calcdesk_core::utils::format_timestamp;

use crate::app::{App, CalcFocus};
use crate::ui::styles;

use super::{button_line, field_line};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Form
            Constraint::Min(5),     // Result
        ])
        .split(area);

    render_form(frame, app, chunks[0]);
    render_result(frame, app, chunks[1]);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let calc = &app.calculator;

    let mut lines = vec![
        Line::from(""),
        field_line(&calc.operand1, calc.focus == CalcFocus::Operand1),
        operation_line(calc.operation, calc.focus == CalcFocus::Operation),
        field_line(&calc.operand2, calc.focus == CalcFocus::Operand2),
        Line::from(""),
        button_line("Calculate", calc.focus == CalcFocus::Button),
    ];

    if calc.focus == CalcFocus::Operation {
        lines.push(Line::from(Span::styled(
            "  ←/→ to change, or type + - * / ^ %",
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" Calculator ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// The operation selector: `Operation:  ◀ × Multiplication ▶`
fn operation_line(op: Operation, focused: bool) -> Line<'static> {
    let (left, right) = if focused { ("◀ ", " ▶") } else { ("  ", "  ") };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<18}", "Operation:"), styles::muted_style()),
        Span::styled(left, styles::highlight_style()),
        Span::styled(
            format!("{} {}", op.symbol(), op.display_name()),
            styles::field_style(focused),
        ),
        Span::styled(right, styles::highlight_style()),
    ])
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.calculator.result {
        Some(ref calc) => vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Result: ", styles::muted_style()),
                Span::styled(calc.equation(), styles::result_style()),
            ]),
            Line::from(Span::styled(
                format!("  {}", calc.operation.display_name()),
                styles::list_item_style(),
            )),
            Line::from(Span::styled(
                format!("  {}", format_timestamp(&calc.created_at)),
                styles::muted_style(),
            )),
        ],
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Enter two numbers and press Enter to calculate",
                styles::muted_style(),
            )),
        ],
    };

    let block = Block::default()
        .title(" Result ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
