use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use profile_form::selector::ViewRow;
use profile_form::{FieldId, Selector, SelectorEvent, SelectorView};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

/// Rows shown at once in an open dropdown; the rest scrolls.
pub const DROPDOWN_ROWS: usize = 8;

/// Columns taken by the caption in front of each value.
pub const CAPTION_WIDTH: usize = 13;

/// Keys a focused selector understands.
pub fn key_to_event(key: KeyEvent) -> Option<SelectorEvent> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(SelectorEvent::Input(c)),
        KeyCode::Backspace => Some(SelectorEvent::Backspace),
        KeyCode::Up => Some(SelectorEvent::Up),
        KeyCode::Down => Some(SelectorEvent::Down),
        KeyCode::Enter => Some(SelectorEvent::Enter),
        KeyCode::Esc => Some(SelectorEvent::Escape),
        _ => None,
    }
}

/// One form line: caption, then the query/value or the placeholder.
pub struct FieldLine<'a> {
    pub field: FieldId,
    pub selector: &'a Selector,
    pub focused: bool,
}

impl FieldLine<'_> {
    fn line(&self) -> Line<'static> {
        let caption = format!(
            "{:<width$}",
            format!("{}:", self.field.caption()),
            width = CAPTION_WIDTH
        );
        let text = self.selector.display_text();
        let value = if text.is_empty() {
            Span::styled(
                self.field.placeholder().to_string(),
                Style::new().dark_gray().italic(),
            )
        } else {
            Span::raw(text.to_string())
        };
        let mut spans = vec![Span::styled(caption, Style::new().bold()), value];
        if self.focused {
            let marker = if self.selector.is_open() { " ▴" } else { " ▾" };
            spans.push(Span::styled(marker, Style::new().dark_gray()));
        }
        let line = Line::from(spans);
        if self.focused {
            line.style(Style::new().cyan())
        } else {
            line
        }
    }
}

impl Widget for FieldLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}

/// Open dropdown of a selector, drawn as an overlay.
pub struct Dropdown<'a> {
    view: SelectorView<'a>,
    scroll: usize,
}

impl<'a> Dropdown<'a> {
    pub fn new(view: SelectorView<'a>, scroll: usize) -> Self {
        Self { view, scroll }
    }

    pub fn with_scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Position of the highlighted row among the rendered rows.
    pub fn highlighted_row(&self) -> Option<usize> {
        self.rows().iter().position(|row| row.highlighted)
    }

    fn rows(&self) -> &[ViewRow<'a>] {
        match &self.view {
            SelectorView::Rows { rows, .. } => rows,
            _ => &[],
        }
    }

    /// Border, visible rows and the optional status line.
    pub fn desired_height(&self) -> u16 {
        let rows = self.rows().len().min(DROPDOWN_ROWS);
        let status = usize::from(self.view.status_line().is_some());
        (rows + status + 2) as u16
    }

    /// Area the candidate rows occupy inside `area`.
    pub fn rows_area(&self, area: Rect) -> Rect {
        let inner = Block::new().borders(Borders::ALL).inner(area);
        let status = u16::from(self.view.status_line().is_some());
        Rect {
            height: inner.height.saturating_sub(status),
            ..inner
        }
    }

    /// Row position (within the rendered rows) at a terminal cell.
    pub fn row_at(&self, area: Rect, column: u16, row: u16) -> Option<usize> {
        let rows_area = self.rows_area(area);
        let inside = column >= rows_area.x
            && column < rows_area.right()
            && row >= rows_area.y
            && row < rows_area.bottom();
        if !inside {
            return None;
        }
        let position = self.scroll + usize::from(row - rows_area.y);
        (position < self.rows().len()).then_some(position)
    }
}

impl Widget for Dropdown<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::new()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::new().dark_gray());
        let rows_area = self.rows_area(area);
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .rows()
            .iter()
            .skip(self.scroll)
            .take(usize::from(rows_area.height))
            .map(|row| {
                let line = Line::from(format!(" {}", row.label));
                if row.highlighted {
                    line.style(Style::new().black().on_cyan())
                } else {
                    line
                }
            })
            .collect();
        Paragraph::new(lines).render(rows_area, buf);

        if let Some(status) = self.view.status_line() {
            let status_area = Rect {
                y: inner.bottom().saturating_sub(1),
                height: 1.min(inner.height),
                ..inner
            };
            Paragraph::new(Line::from(Span::styled(
                format!(" {status}"),
                Style::new().dark_gray().italic(),
            )))
            .render(status_area, buf);
        }
    }
}

/// Keep the highlighted row inside a window of `height` rows.
pub fn scroll_offset(highlighted: Option<usize>, current: usize, height: usize) -> usize {
    let Some(highlighted) = highlighted else {
        return 0;
    };
    if height == 0 {
        return highlighted;
    }
    if highlighted < current {
        highlighted
    } else if highlighted >= current + height {
        highlighted + 1 - height
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pretty_assertions::assert_eq;
    use profile_form::{CandidateList, SelectorConfig};

    fn selector(items: &[&str]) -> Selector {
        let candidates: CandidateList = items.iter().map(|s| s.to_string()).collect();
        Selector::with_candidates(SelectorConfig::default(), candidates)
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn maps_editing_keys() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(
            key_to_event(key(KeyCode::Char('a'))),
            Some(SelectorEvent::Input('a'))
        );
        assert_eq!(key_to_event(key(KeyCode::Esc)), Some(SelectorEvent::Escape));
        assert_eq!(key_to_event(key(KeyCode::Tab)), None);
        let ctrl_c = KeyEvent {
            kind: KeyEventKind::Press,
            ..KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        };
        assert_eq!(key_to_event(ctrl_c), None);
    }

    #[test]
    fn field_line_shows_placeholder_then_value() {
        let mut s = selector(&["Canada"]);
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        FieldLine {
            field: FieldId::Country,
            selector: &s,
            focused: false,
        }
        .render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Select a country"));

        s.sync_value("Canada");
        let mut buf = Buffer::empty(area);
        FieldLine {
            field: FieldId::Country,
            selector: &s,
            focused: false,
        }
        .render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.starts_with("Country:"));
        assert!(text.contains("Canada"));
    }

    #[test]
    fn dropdown_renders_rows_and_overflow_line() {
        let items: Vec<String> = (0..30).map(|i| format!("City {i:02}")).collect();
        let mut s = Selector::with_candidates(
            SelectorConfig::default().max_visible(10),
            items.into_iter().collect(),
        );
        s.handle(SelectorEvent::Focus);
        let dropdown = Dropdown::new(s.view(), 0);
        assert_eq!(dropdown.desired_height(), (DROPDOWN_ROWS + 1 + 2) as u16);

        let area = Rect::new(0, 0, 30, dropdown.desired_height());
        let mut buf = Buffer::empty(area);
        dropdown.render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("City 00"));
        assert!(text.contains("City 07"));
        assert!(!text.contains("City 08"));
        assert!(text.contains("Showing 10 of 30 results"));
    }

    #[test]
    fn dropdown_prompts_for_large_lists() {
        let items: Vec<String> = (0..600).map(|i| format!("Town {i}")).collect();
        let mut s =
            Selector::with_candidates(SelectorConfig::default(), items.into_iter().collect());
        s.handle(SelectorEvent::Focus);
        let dropdown = Dropdown::new(s.view(), 0);
        assert_eq!(dropdown.desired_height(), 3);
        let area = Rect::new(0, 0, 50, 3);
        let mut buf = Buffer::empty(area);
        dropdown.render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Type 2+ characters to search 600 items"));
    }

    #[test]
    fn row_hit_testing_respects_scroll() {
        let mut s = selector(&["A", "B", "C", "D"]);
        s.handle(SelectorEvent::Focus);
        let dropdown = Dropdown::new(s.view(), 1);
        let area = Rect::new(5, 10, 20, 6);
        assert_eq!(dropdown.row_at(area, 6, 11), Some(1));
        assert_eq!(dropdown.row_at(area, 6, 13), Some(3));
        assert_eq!(dropdown.row_at(area, 6, 14), None);
        assert_eq!(dropdown.row_at(area, 5, 11), None);
    }

    #[test]
    fn scroll_follows_highlight() {
        assert_eq!(scroll_offset(None, 4, 8), 0);
        assert_eq!(scroll_offset(Some(3), 0, 8), 0);
        assert_eq!(scroll_offset(Some(9), 0, 8), 2);
        assert_eq!(scroll_offset(Some(1), 2, 8), 1);
    }
}
