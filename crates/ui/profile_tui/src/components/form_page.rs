use color_eyre::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use profile_form::{FieldChange, FieldId, ProfileForm, Selector, SelectorEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};
use strum::IntoEnumIterator;

use super::section::{cycle_focus, Section};
use super::selector::{key_to_event, scroll_offset, Dropdown, FieldLine, CAPTION_WIDTH};
use crate::{
    action::Action,
    components::Component,
    tui::{EventResponse, Frame},
};

const HELP: &str =
    "Tab/Shift-Tab move · ↑↓ choose · Enter select · Esc cancel · Ctrl-R refresh · Ctrl-C quit";
const SOURCE_WIDTH: u16 = 10;
const MIN_DROPDOWN_WIDTH: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DropdownHit {
    field: FieldId,
    area: Rect,
    scroll: usize,
}

/// The whole form: section cards, field lines and the open dropdown.
///
/// Hit areas are recorded while drawing and used to route mouse input on
/// the next event.
#[derive(Default)]
pub struct FormPage {
    inputs: Vec<(FieldId, Rect)>,
    dropdown: Option<DropdownHit>,
    scroll_field: Option<FieldId>,
    scroll: usize,
}

impl FormPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn input_area(&self, field: FieldId) -> Option<Rect> {
        self.inputs
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, area)| *area)
    }

    fn input_at(&self, position: Position) -> Option<FieldId> {
        self.inputs
            .iter()
            .find(|(_, area)| area.contains(position))
            .map(|(field, _)| *field)
    }

    fn respond(changes: &[FieldChange], form: &ProfileForm) -> EventResponse<Action> {
        let message = changes.iter().filter_map(|c| describe(c, form)).last();
        EventResponse::Stop(message.map_or(Action::Update, Action::Status))
    }

    fn draw_section(&mut self, f: &mut Frame<'_>, section: Section, area: Rect, form: &ProfileForm) {
        let active = form
            .focus()
            .is_some_and(|focused| section.fields().contains(&focused));
        let border = if active {
            Style::new().cyan()
        } else {
            Style::new().dark_gray()
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(Span::styled(format!(" {section} "), Style::new().bold()));
        let inner = block.inner(area);
        f.render_widget(block, area);

        for (i, field) in section.visible_fields(form).into_iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.bottom() {
                break;
            }
            let row = Rect { y, height: 1, ..inner };
            let [input, source] =
                Layout::horizontal([Constraint::Min(0), Constraint::Length(SOURCE_WIDTH)])
                    .areas(row);
            let focused = form.focus() == Some(field);
            if let Some(selector) = form.selector(field) {
                f.render_widget(
                    FieldLine {
                        field,
                        selector,
                        focused,
                    },
                    input,
                );
                if focused {
                    let offset = CAPTION_WIDTH + selector.display_text().chars().count();
                    let x = input
                        .x
                        .saturating_add(offset as u16)
                        .min(input.right().saturating_sub(1));
                    f.set_cursor_position(Position::new(x, y));
                }
            }
            if let Some(origin) = form.source(field) {
                f.render_widget(
                    Paragraph::new(origin.to_string())
                        .alignment(Alignment::Right)
                        .style(Style::new().dark_gray()),
                    source,
                );
            }
            self.inputs.push((field, input));
        }
    }

    fn draw_dropdown(&mut self, f: &mut Frame<'_>, field: FieldId, bounds: Rect, form: &ProfileForm) {
        let Some(selector) = form.selector(field).filter(|s| s.is_open()) else {
            self.scroll_field = None;
            return;
        };
        let Some(input) = self.input_area(field) else {
            return;
        };
        if self.scroll_field != Some(field) {
            self.scroll_field = Some(field);
            self.scroll = 0;
        }

        let dropdown = Dropdown::new(selector.view(), 0);
        let offset = (CAPTION_WIDTH as u16).min(input.width);
        let x = input.x + offset;
        let width = input
            .width
            .saturating_sub(offset)
            .max(MIN_DROPDOWN_WIDTH)
            .min(bounds.right().saturating_sub(x));
        let wanted = dropdown.desired_height();
        let below = bounds.bottom().saturating_sub(input.bottom());
        let above = input.y.saturating_sub(bounds.y);
        let (y, height) = if wanted <= below || below >= above {
            (input.bottom(), wanted.min(below))
        } else {
            let height = wanted.min(above);
            (input.y - height, height)
        };
        if height < 3 || width < 3 {
            return;
        }
        let area = Rect::new(x, y, width, height);

        let visible_rows = usize::from(dropdown.rows_area(area).height);
        self.scroll = scroll_offset(dropdown.highlighted_row(), self.scroll, visible_rows);
        f.render_widget(dropdown.with_scroll(self.scroll), area);
        self.dropdown = Some(DropdownHit {
            field,
            area,
            scroll: self.scroll,
        });
    }
}

/// Status bar text for a field change, if it is worth reporting.
fn describe(change: &FieldChange, form: &ProfileForm) -> Option<String> {
    match change {
        FieldChange::Committed { field, .. } => {
            let label = form
                .selector(*field)
                .map(Selector::committed)
                .unwrap_or_default();
            if label.is_empty() {
                Some(format!("{} cleared", field.caption()))
            } else {
                Some(format!("{}: {label}", field.caption()))
            }
        }
        FieldChange::Rejected(field) => {
            Some(format!("{}: choose a value from the list", field.caption()))
        }
        FieldChange::Unchanged(_) | FieldChange::Idle => None,
    }
}

impl Component for FormPage {
    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        form: &mut ProfileForm,
    ) -> Result<Option<EventResponse<Action>>> {
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let changes = match key.code {
            KeyCode::Char('c') if ctrl => return Ok(Some(EventResponse::Stop(Action::Quit))),
            KeyCode::Char('r') if ctrl => return Ok(Some(EventResponse::Stop(Action::Refresh))),
            KeyCode::Char('z') if ctrl => return Ok(Some(EventResponse::Stop(Action::Suspend))),
            KeyCode::Tab | KeyCode::BackTab => {
                // Blur first: committing a country can reveal State or City.
                let from = form.focus();
                let mut changes = form.set_focus(None);
                let target = cycle_focus(form, from, key.code == KeyCode::Tab);
                changes.extend(form.set_focus(target));
                changes
            }
            _ => match form.focus() {
                None => match key.code {
                    KeyCode::Char('q') => return Ok(Some(EventResponse::Stop(Action::Quit))),
                    KeyCode::Enter | KeyCode::Down => {
                        let first = cycle_focus(form, None, true);
                        form.set_focus(first)
                    }
                    _ => return Ok(None),
                },
                Some(field) => {
                    let open = form.selector(field).is_some_and(Selector::is_open);
                    if key.code == KeyCode::Esc && !open {
                        form.set_focus(None)
                    } else {
                        let Some(event) = key_to_event(key) else {
                            return Ok(None);
                        };
                        vec![form.dispatch(field, event)]
                    }
                }
            },
        };
        Ok(Some(Self::respond(&changes, form)))
    }

    fn handle_mouse_events(
        &mut self,
        mouse: MouseEvent,
        form: &mut ProfileForm,
    ) -> Result<Option<EventResponse<Action>>> {
        let position = Position::new(mouse.column, mouse.row);
        let over_dropdown = self.dropdown.filter(|hit| hit.area.contains(position));
        match mouse.kind {
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let Some(hit) = over_dropdown else {
                    return Ok(None);
                };
                let event = if mouse.kind == MouseEventKind::ScrollDown {
                    SelectorEvent::Down
                } else {
                    SelectorEvent::Up
                };
                form.dispatch(hit.field, event);
                Ok(Some(EventResponse::Stop(Action::Update)))
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let changes = if let Some(hit) = over_dropdown {
                    let row = form.selector(hit.field).and_then(|selector| {
                        Dropdown::new(selector.view(), hit.scroll).row_at(
                            hit.area,
                            mouse.column,
                            mouse.row,
                        )
                    });
                    match row {
                        Some(row) => vec![form.dispatch(hit.field, SelectorEvent::Pick(row))],
                        None => Vec::new(),
                    }
                } else if let Some(field) = self.input_at(position) {
                    if form.focus() == Some(field) {
                        vec![form.dispatch(field, SelectorEvent::Focus)]
                    } else {
                        form.set_focus(Some(field))
                    }
                } else {
                    form.click_outside();
                    Vec::new()
                };
                Ok(Some(Self::respond(&changes, form)))
            }
            _ => Ok(None),
        }
    }

    fn handle_paste(
        &mut self,
        text: String,
        form: &mut ProfileForm,
    ) -> Result<Option<EventResponse<Action>>> {
        let Some(field) = form.focus() else {
            return Ok(None);
        };
        let query = text.lines().next().unwrap_or_default().trim().to_string();
        let change = form.dispatch(field, SelectorEvent::SetQuery(query));
        Ok(Some(Self::respond(&[change], form)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, form: &ProfileForm) -> Result<()> {
        let [title, body, help] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Profile", Style::new().bold().cyan()),
                Span::styled("  location · education · experience", Style::new().dark_gray()),
            ])),
            title,
        );

        let mut constraints: Vec<Constraint> = Section::iter()
            .map(|section| Constraint::Length(section.height(form)))
            .collect();
        constraints.push(Constraint::Min(0));
        let areas = Layout::vertical(constraints).split(body);

        self.inputs.clear();
        self.dropdown = None;
        for (section, section_area) in Section::iter().zip(areas.iter()) {
            self.draw_section(f, section, *section_area, form);
        }
        match form.focus() {
            Some(field) => self.draw_dropdown(f, field, body, form),
            None => self.scroll_field = None,
        }

        f.render_widget(
            Paragraph::new(HELP).style(Style::new().dark_gray()),
            help,
        );
        Ok(())
    }
}
