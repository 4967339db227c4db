use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{validate_non_empty, validate_required, ValidationErrors};

/// A visitor listed on the getpass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Person {
    #[schema(example = "محمد أحمد")]
    pub name: String,
    #[schema(example = "سعودي")]
    pub nationality: String,
    #[schema(example = "1234567890")]
    pub id_number: String,
}

/// One visit date; every date produces its own document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateEntry {
    /// ISO-8601 date or date-time, e.g. `2024-01-01` or `2024-01-01T09:30:00Z`.
    #[schema(example = "2024-01-01")]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GetPassRequest {
    pub people: Vec<Person>,
    pub dates: Vec<DateEntry>,
}

impl GetPassRequest {
    /// Checks the shape of the request; date parsing happens later.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = ValidationErrors::new();
        validate_non_empty(&self.people, "people", "person", &mut errors);
        validate_non_empty(&self.dates, "dates", "date", &mut errors);

        for (i, person) in self.people.iter().enumerate() {
            validate_required(&person.name, &format!("people[{i}].name"), "name", &mut errors);
            validate_required(
                &person.nationality,
                &format!("people[{i}].nationality"),
                "nationality",
                &mut errors,
            );
            validate_required(
                &person.id_number,
                &format!("people[{i}].id_number"),
                "id number",
                &mut errors,
            );
        }
        for (i, entry) in self.dates.iter().enumerate() {
            validate_required(&entry.date, &format!("dates[{i}].date"), "date", &mut errors);
        }

        errors.into_result()
    }
}
