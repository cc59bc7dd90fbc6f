//! Page-specific rendering and the form widgets they share.

pub mod auth;
pub mod calculator;
pub mod history;
pub mod profile;

use ratatui::text::{Line, Span};

use crate::forms::{Form, TextInput};
use crate::ui::styles;

/// Visible width of an input box
const FIELD_WIDTH: usize = 24;

/// Width reserved for field labels
const LABEL_WIDTH: usize = 18;

/// One labelled input line: `Username:   [alice▌          ]`
pub fn field_line(input: &TextInput, focused: bool) -> Line<'static> {
    let shown: String = {
        let text = input.display();
        let count = text.chars().count();
        // Keep the tail visible once the value outgrows the box
        if count >= FIELD_WIDTH {
            text.chars().skip(count + 1 - FIELD_WIDTH).collect()
        } else {
            text
        }
    };
    let cursor = if focused { "▌" } else { "" };
    let padded = format!("{:<width$}", format!("{}{}", shown, cursor), width = FIELD_WIDTH);

    Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{:<width$}", format!("{}:", input.label), width = LABEL_WIDTH),
            styles::muted_style(),
        ),
        Span::styled("[", styles::muted_style()),
        Span::styled(padded, styles::field_style(focused)),
        Span::styled("]", styles::muted_style()),
    ])
}

pub fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 2)),
        Span::raw("["),
        Span::styled(text, styles::field_style(focused)),
        Span::raw("]"),
    ])
}

/// All fields of a form followed by a blank line and its button.
/// `active` is false when another form on the same page has focus.
pub fn form_lines(form: &Form, active: bool) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| field_line(field, active && form.focus == i))
        .collect();
    lines.push(Line::from(""));
    lines.push(button_line(form.button, active && form.on_button()));
    lines
}
