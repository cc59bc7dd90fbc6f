use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use calcdesk_core::utils::{format_timestamp, truncate_string};

use crate::app::App;
use crate::ui::styles;

/// Longest expression shown before truncation
const EXPRESSION_WIDTH: usize = 32;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_history_table(frame, app, chunks[0]);
    render_statistics(frame, app, chunks[1]);
}

fn render_history_table(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" History ({}) - [d]elete [r]eload ", app.calculations.len());
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if app.calculations.is_empty() {
        let message = if app.pending_requests > 0 {
            "  Loading..."
        } else {
            "  No calculations yet"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([
        Cell::from("Date"),
        Cell::from("Operation"),
        Cell::from("Expression"),
        Cell::from("Result"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .calculations
        .iter()
        .enumerate()
        .map(|(i, calc)| {
            let style = if i == app.history_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(format_timestamp(&calc.created_at)),
                Cell::from(calc.operation.display_name()),
                Cell::from(truncate_string(&calc.expression(), EXPRESSION_WIDTH)),
                Cell::from(calc.result.to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(19), // "Jan 05, 2025 14:30"
        Constraint::Length(15),
        Constraint::Fill(2),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.history_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_statistics(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];

    match app.statistics {
        Some(ref stats) => {
            lines.push(stat_line("Total", stats.total_calculations.to_string()));
            lines.push(stat_line("Average result", stats.average_display()));
            lines.push(stat_line("Most used", stats.most_used_display()));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  By operation",
                styles::highlight_style(),
            )));

            let breakdown = stats.breakdown();
            if breakdown.is_empty() {
                lines.push(Line::from(Span::styled(
                    "    No calculations yet",
                    styles::muted_style(),
                )));
            }
            for (name, count) in breakdown {
                lines.push(Line::from(vec![
                    Span::styled(format!("    {:<16}", name), styles::muted_style()),
                    Span::styled(count.to_string(), styles::list_item_style()),
                ]));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "  No statistics loaded",
                styles::muted_style(),
            )));
        }
    }

    let block = Block::default()
        .title(" Statistics ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", format!("{}:", label)), styles::muted_style()),
        Span::styled(value, styles::list_item_style()),
    ])
}
