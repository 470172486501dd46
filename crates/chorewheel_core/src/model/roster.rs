//! Roster domain model.
//!
//! # Responsibility
//! - Hold the ordered list of known people and their availability.
//! - Reject identities that would make assignment maps ambiguous.
//!
//! # Invariants
//! - Person names are trimmed, non-empty and unique within a roster.
//! - People are never removed; availability is toggled instead.
//! - Roster order is the original row order and is preserved on round trips.
//! - Sheet columns the rotation does not use are carried as per-person
//!   attributes, in the column order they were imported with.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One person who can be assigned chores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Identity key. Stored trimmed.
    pub name: String,
    /// `false` when the person is flagged "out" for the coming cycle.
    pub available: bool,
    /// Extra sheet cells keyed by column name; empty cells are absent.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Person {
    /// Creates an available person.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            available: true,
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a person with an explicit availability flag.
    pub fn with_availability(name: impl Into<String>, available: bool) -> Self {
        Self {
            available,
            ..Self::new(name)
        }
    }
}

/// Roster validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Name is blank after trim.
    EmptyName,
    /// Name already present in the roster.
    DuplicateName(String),
    /// Name does not exist in the roster.
    UnknownPerson(String),
    /// Blank or repeated name in the sheet column layout.
    InvalidColumn(String),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "person name must not be blank"),
            Self::DuplicateName(name) => write!(f, "person already on roster: {name}"),
            Self::UnknownPerson(name) => write!(f, "person not on roster: {name}"),
            Self::InvalidColumn(column) => write!(f, "invalid roster column `{column}`"),
        }
    }
}

impl Error for RosterError {}

/// Ordered set of people.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    people: Vec<Person>,
    /// Non-period sheet columns in import order; empty means the default layout.
    #[serde(default)]
    columns: Vec<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from people in row order.
    ///
    /// # Errors
    /// - `EmptyName` / `DuplicateName` on the first offending row.
    pub fn from_people(people: impl IntoIterator<Item = Person>) -> Result<Self, RosterError> {
        let mut roster = Self::new();
        for person in people {
            roster.add_person(person)?;
        }
        Ok(roster)
    }

    /// Appends a person at the end of the roster.
    pub fn add_person(&mut self, person: Person) -> Result<(), RosterError> {
        let name = person.name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if self.contains(name) {
            return Err(RosterError::DuplicateName(name.to_string()));
        }
        self.people.push(Person {
            name: name.to_string(),
            ..person
        });
        Ok(())
    }

    /// Sheet columns other than period columns, in import order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Replaces the sheet column layout.
    ///
    /// # Errors
    /// - `InvalidColumn` for a blank or repeated column name.
    pub fn set_columns(&mut self, columns: Vec<String>) -> Result<(), RosterError> {
        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.trim().is_empty() || !seen.insert(column.as_str()) {
                return Err(RosterError::InvalidColumn(column.clone()));
            }
        }
        self.columns = columns;
        Ok(())
    }

    /// Flags a person as available (`true`) or out (`false`).
    pub fn set_available(&mut self, name: &str, available: bool) -> Result<(), RosterError> {
        let name = name.trim();
        let person = self
            .people
            .iter_mut()
            .find(|person| person.name == name)
            .ok_or_else(|| RosterError::UnknownPerson(name.to_string()))?;
        person.available = available;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Person> {
        let name = name.trim();
        self.people.iter().find(|person| person.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// People in roster order.
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Names of available people in roster order.
    pub fn available_people(&self) -> Vec<String> {
        self.people
            .iter()
            .filter(|person| person.available)
            .map(|person| person.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
