use std::collections::BTreeMap;

use color_eyre::Result;
use profile_form::{FieldId, ProfileForm};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};
use strum::IntoEnumIterator;

use crate::{action::Action, components::Component, tui::Frame};

/// Bottom line: focused field, last message, background fetches.
#[derive(Default)]
pub struct StatusBar {
    message: Option<String>,
    pending: BTreeMap<u64, String>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn left_text(&self, form: &ProfileForm) -> Line<'static> {
        let focus = form.focus().map_or("-", FieldId::caption);
        let mut spans = vec![
            Span::styled(format!(" {focus} "), Style::new().black().on_cyan()),
            Span::raw(" "),
        ];
        if let Some(message) = self.message() {
            spans.push(Span::raw(message.to_string()));
        }
        Line::from(spans)
    }

    fn right_text(&self, form: &ProfileForm) -> Line<'static> {
        if self.pending() > 0 {
            return Line::from(Span::styled(
                format!("fetching {}… ", self.pending()),
                Style::new().yellow(),
            ));
        }
        let total = FieldId::iter().filter(|f| form.is_visible(*f)).count();
        let filled = form.summary().len();
        Line::from(Span::styled(
            format!("{filled}/{total} filled "),
            Style::new().dark_gray(),
        ))
    }
}

impl Component for StatusBar {
    fn update(&mut self, action: Action, _form: &mut ProfileForm) -> Result<Option<Action>> {
        match action {
            Action::Status(message) | Action::Error(message) => self.message = Some(message),
            Action::TaskStarted(id, label) => {
                self.pending.insert(id, label);
            }
            // Failures are logged by the form; the bundled list stays silently.
            Action::TaskFinished(id, _) => {
                self.pending.remove(&id);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, form: &ProfileForm) -> Result<()> {
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(20)]).areas(area);
        f.render_widget(Paragraph::new(self.left_text(form)), left);
        f.render_widget(
            Paragraph::new(self.right_text(form)).alignment(Alignment::Right),
            right,
        );
        Ok(())
    }
}
