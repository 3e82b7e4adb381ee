use profile_form::{FieldId, ProfileForm};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Section cards of the form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Section {
    Location,
    Education,
    Experience,
}

impl Section {
    pub fn fields(self) -> &'static [FieldId] {
        match self {
            Section::Location => &[FieldId::Country, FieldId::State, FieldId::City],
            Section::Education => &[FieldId::Degree, FieldId::Institution],
            Section::Experience => &[FieldId::Role, FieldId::Company],
        }
    }

    pub fn visible_fields(self, form: &ProfileForm) -> Vec<FieldId> {
        self.fields()
            .iter()
            .copied()
            .filter(|f| form.is_visible(*f))
            .collect()
    }

    /// Border plus one line per visible field.
    pub fn height(self, form: &ProfileForm) -> u16 {
        self.visible_fields(form).len() as u16 + 2
    }
}

/// Visible fields in focus order.
pub fn focus_order(form: &ProfileForm) -> Vec<FieldId> {
    Section::iter().flat_map(|s| s.visible_fields(form)).collect()
}

/// Next (or previous) focus target after `from`, wrapping around.
/// Reads visibility as it is now, so blur the old field first.
pub fn cycle_focus(
    form: &ProfileForm,
    from: Option<FieldId>,
    forward: bool,
) -> Option<FieldId> {
    let order = focus_order(form);
    if order.is_empty() {
        return None;
    }
    let position = from.and_then(|current| order.iter().position(|f| *f == current));
    let next = match (position, forward) {
        (None, true) => 0,
        (None, false) => order.len() - 1,
        (Some(i), true) => (i + 1) % order.len(),
        (Some(i), false) => (i + order.len() - 1) % order.len(),
    };
    Some(order[next])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use profile_form::{FallbackCatalog, FormSettings, GeoDataset, SelectorEvent};
    use std::sync::Arc;

    fn form() -> ProfileForm {
        let geo = GeoDataset::embedded().expect("embedded geo");
        let catalog = FallbackCatalog::embedded().expect("embedded catalog");
        ProfileForm::new(Arc::new(geo), catalog, FormSettings::default())
    }

    #[test]
    fn every_field_belongs_to_one_section() {
        let all: Vec<FieldId> = Section::iter().flat_map(|s| s.fields().iter().copied()).collect();
        assert_eq!(all, FieldId::iter().collect::<Vec<_>>());
    }

    #[test]
    fn focus_order_skips_hidden_fields() {
        let form = form();
        assert_eq!(
            focus_order(&form),
            [
                FieldId::Country,
                FieldId::Degree,
                FieldId::Institution,
                FieldId::Role,
                FieldId::Company
            ]
        );
        assert_eq!(Section::Location.height(&form), 3);
    }

    #[test]
    fn focus_wraps_both_ways() {
        let form = form();
        assert_eq!(cycle_focus(&form, None, true), Some(FieldId::Country));
        assert_eq!(cycle_focus(&form, None, false), Some(FieldId::Company));
        assert_eq!(
            cycle_focus(&form, Some(FieldId::Company), true),
            Some(FieldId::Country)
        );
        assert_eq!(
            cycle_focus(&form, Some(FieldId::Degree), false),
            Some(FieldId::Country)
        );
    }

    #[test]
    fn city_joins_focus_order_for_stateless_country() {
        let mut form = form();
        form.dispatch(FieldId::Country, SelectorEvent::SetQuery("Singapore".into()));
        form.dispatch(FieldId::Country, SelectorEvent::Enter);
        assert_eq!(
            Section::Location.visible_fields(&form),
            [FieldId::Country, FieldId::City]
        );
        assert_eq!(
            cycle_focus(&form, Some(FieldId::Country), true),
            Some(FieldId::City)
        );
    }
}
