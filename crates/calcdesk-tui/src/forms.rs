//! Text input and form focus state shared by the login, register and
//! profile pages.

/// Maximum length for most text inputs.
/// Usernames cap at 50 and passwords at 100 server-side; 100 covers both.
pub const MAX_FIELD_LENGTH: usize = 100;

/// Maximum length for operand input
pub const MAX_OPERAND_LENGTH: usize = 32;

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character should be accepted given the current length
pub fn can_add_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && is_valid_input_char(c)
}

/// Characters that can appear in a typed number (`-1.5e3`)
pub fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextInput {
    pub label: &'static str,
    pub value: String,
    pub masked: bool,
    max_len: usize,
}

impl TextInput {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
            max_len: MAX_FIELD_LENGTH,
        }
    }

    pub fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Append a character; returns false if it was rejected
    pub fn push(&mut self, c: char) -> bool {
        if can_add_char(self.value.chars().count(), self.max_len, c) {
            self.value.push(c);
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.chars().take(self.max_len).collect();
    }

    /// Text to draw: asterisks for masked inputs
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// What Enter does on the focused element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Advance,
    Submit,
}

/// A list of text inputs followed by a submit button.
/// `focus == fields.len()` means the button is focused.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub fields: Vec<TextInput>,
    pub focus: usize,
    pub button: &'static str,
}

impl Form {
    pub fn new(fields: Vec<TextInput>, button: &'static str) -> Self {
        Self {
            fields,
            focus: 0,
            button,
        }
    }

    fn slots(&self) -> usize {
        self.fields.len() + 1
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.slots();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.slots() - 1) % self.slots();
    }

    pub fn on_button(&self) -> bool {
        self.focus == self.fields.len()
    }

    pub fn focus_button(&mut self) {
        self.focus = self.fields.len();
    }

    pub fn focused_field_mut(&mut self) -> Option<&mut TextInput> {
        self.fields.get_mut(self.focus)
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.focused_field_mut() {
            field.push(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.focused_field_mut() {
            field.pop();
        }
    }

    /// Enter on the last field or the button submits; earlier fields advance.
    pub fn enter(&mut self) -> FormAction {
        if self.focus + 1 >= self.fields.len() {
            FormAction::Submit
        } else {
            self.focus_next();
            FormAction::Advance
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or_default()
    }

    pub fn set_value(&mut self, index: usize, value: &str) {
        if let Some(field) = self.fields.get_mut(index) {
            field.set(value);
        }
    }

    /// Clear every field and focus the first one
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.focus = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_form() -> Form {
        Form::new(
            vec![TextInput::new("Username"), TextInput::masked("Password")],
            "Login",
        )
    }

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char(0, 10, 'a'));
        assert!(can_add_char(9, 10, 'z'));
        assert!(!can_add_char(10, 10, 'a'));
        assert!(!can_add_char(0, 10, '\x00'));
        assert!(!can_add_char(0, 10, '\n'));
        assert!(!can_add_char(0, 10, '\t'));
    }

    #[test]
    fn test_is_number_char() {
        for c in "0123456789.-+eE".chars() {
            assert!(is_number_char(c));
        }
        assert!(!is_number_char('a'));
        assert!(!is_number_char(' '));
    }

    #[test]
    fn test_text_input_limits_and_masking() {
        let mut input = TextInput::masked("PIN").with_max_len(3);
        for c in "12345".chars() {
            input.push(c);
        }
        assert_eq!(input.value, "123");
        assert_eq!(input.display(), "***");

        input.pop();
        assert_eq!(input.value, "12");

        input.set("abcdef");
        assert_eq!(input.value, "abc");
    }

    #[test]
    fn test_focus_cycles_through_button() {
        let mut form = login_form();
        assert_eq!(form.focus, 0);
        form.focus_next();
        form.focus_next();
        assert!(form.on_button());
        form.focus_next();
        assert_eq!(form.focus, 0);
        form.focus_prev();
        assert!(form.on_button());
    }

    #[test]
    fn test_enter_advances_then_submits() {
        let mut form = login_form();
        assert_eq!(form.enter(), FormAction::Advance);
        assert_eq!(form.focus, 1);
        assert_eq!(form.enter(), FormAction::Submit);
        form.focus_button();
        assert_eq!(form.enter(), FormAction::Submit);
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = login_form();
        form.handle_char('b');
        form.handle_char('o');
        form.focus_next();
        form.handle_char('x');
        form.handle_backspace();
        form.handle_char('y');
        form.focus_button();
        form.handle_char('z');
        assert_eq!(form.value(0), "bo");
        assert_eq!(form.value(1), "y");

        form.reset();
        assert_eq!(form.value(0), "");
        assert_eq!(form.focus, 0);
    }
}
