//! Placeholder tokens of the getpass template and the substitution map built
//! for one date and one visitor list.

use super::dates::ResolvedDate;
use super::models::Person;

pub const WEEKDAY: &str = "(اليوم)";
pub const HIJRI_DAY: &str = "[D]";
pub const HIJRI_MONTH: &str = "[M]";
pub const HIJRI_YEAR: &str = "[Y]";
pub const GREGORIAN_DAY: &str = "[d]";
pub const GREGORIAN_MONTH: &str = "[m]";
pub const GREGORIAN_YEAR: &str = "[yyyy]";
pub const COUNT_LABEL: &str = "الموضح هوياتهم بالبيان المرفق وعددهم (ع)";
pub const VISITOR1_NAME: &str = "(الزائر1)";
pub const VISITOR1_ID: &str = "(الهويه1)";
pub const VISITOR1_NATIONALITY: &str = "(الجنسيه1)";
pub const VISITOR2_NAME: &str = "(الزائر2)";
pub const VISITOR2_ID: &str = "(الهويه2)";
pub const VISITOR2_NATIONALITY: &str = "(الجنسيه2)";
pub const FIRST_VISITOR: &str = "(اولهم)";
pub const LAST_VISITOR: &str = "(اخرهم)";

/// Visitors that still fit the two named slots of the form.
pub const NAMED_SLOTS: usize = 2;

/// Count label with the two-digit visitor count and a ticked box.
pub fn count_label(count: usize) -> String {
    format!("الموضح هوياتهم بالبيان المرفق وعددهم ({count:02}) ☒")
}

/// Token to replacement text, applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(&'static str, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a token; an existing token keeps its position.
    pub fn set(&mut self, token: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == token) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Replaces every occurrence of every token present in `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (token, value) in self.iter() {
            if result.contains(token) {
                result = result.replace(token, value);
            }
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlaceholders {
    pub map: PlaceholderMap,
    /// Set when the visitors are listed in the overflow table.
    pub overflow: bool,
}

/// Builds the substitution map for one date. `people` must not be empty.
pub fn resolve(date: &ResolvedDate, people: &[Person]) -> ResolvedPlaceholders {
    let mut map = PlaceholderMap::new();
    map.set(WEEKDAY, date.weekday_name.as_str());
    map.set(HIJRI_DAY, date.hijri_day.as_str());
    map.set(HIJRI_MONTH, date.hijri_month.as_str());
    map.set(HIJRI_YEAR, date.hijri_year.as_str());
    map.set(GREGORIAN_DAY, date.gregorian_day.as_str());
    map.set(GREGORIAN_MONTH, date.gregorian_month.as_str());
    map.set(GREGORIAN_YEAR, date.gregorian_year.as_str());
    map.set(COUNT_LABEL, count_label(people.len()));

    let overflow = people.len() > NAMED_SLOTS;
    let slot = |index: usize| if overflow { None } else { people.get(index) };
    fill_slot(&mut map, [VISITOR1_NAME, VISITOR1_ID, VISITOR1_NATIONALITY], slot(0));
    fill_slot(&mut map, [VISITOR2_NAME, VISITOR2_ID, VISITOR2_NATIONALITY], slot(1));

    let (first, last) = match (overflow, people.first(), people.last()) {
        (true, Some(first), Some(last)) => (first.name.as_str(), last.name.as_str()),
        _ => ("", ""),
    };
    map.set(FIRST_VISITOR, first);
    map.set(LAST_VISITOR, last);

    ResolvedPlaceholders { map, overflow }
}

fn fill_slot(map: &mut PlaceholderMap, tokens: [&'static str; 3], person: Option<&Person>) {
    let [name, id, nationality] = tokens;
    match person {
        Some(person) => {
            map.set(name, person.name.as_str());
            map.set(id, person.id_number.as_str());
            map.set(nationality, person.nationality.as_str());
        }
        None => {
            map.set(name, "");
            map.set(id, "");
            map.set(nationality, "");
        }
    }
}
