use color_eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use profile_form::ProfileForm;
use ratatui::layout::Rect;

use crate::{
    action::Action,
    tui::{Event, EventResponse, Frame},
};

pub mod form_page;
pub mod section;
pub mod selector;
pub mod status_bar;

/// `Component` is a trait that represents a visual and interactive element of the user interface.
///
/// Components never own form state: every call receives the session so that
/// the form stays the single source of truth for values and candidates.
pub trait Component {
    fn init(&mut self, _form: &ProfileForm) -> Result<()> {
        Ok(())
    }

    fn handle_events(
        &mut self,
        event: Event,
        form: &mut ProfileForm,
    ) -> Result<Option<EventResponse<Action>>> {
        let r = match event {
            Event::Key(key_event) => self.handle_key_events(key_event, form)?,
            Event::Mouse(mouse_event) => self.handle_mouse_events(mouse_event, form)?,
            Event::Paste(text) => self.handle_paste(text, form)?,
            _ => None,
        };
        Ok(r)
    }

    fn handle_key_events(
        &mut self,
        _key: KeyEvent,
        _form: &mut ProfileForm,
    ) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn handle_mouse_events(
        &mut self,
        _mouse: MouseEvent,
        _form: &mut ProfileForm,
    ) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn handle_paste(
        &mut self,
        _text: String,
        _form: &mut ProfileForm,
    ) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn update(&mut self, _action: Action, _form: &mut ProfileForm) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, form: &ProfileForm) -> Result<()>;
}
