use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{GroupingError, Result};

pub type StudentId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse a gender code. Only the first character counts and case is ignored,
    /// so "F", "female" and "f" are all accepted.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('m') => Ok(Gender::Male),
            Some('f') => Ok(Gender::Female),
            _ => Err(GroupingError::InvalidAttribute {
                value: value.to_string(),
            }),
        }
    }

    pub fn code(self) -> char {
        match self {
            Gender::Male => 'm',
            Gender::Female => 'f',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
}

impl Student {
    /// An empty or whitespace-only gender is treated as absent.
    pub fn new(
        id: impl Into<StudentId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        gender: Option<&str>,
    ) -> Result<Self> {
        let gender = match gender.map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(Gender::parse(code)?),
        };
        Ok(Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender,
        })
    }

    /// "J. Smith", the form used in group listings.
    pub fn short_name(&self) -> String {
        match self.first_name.chars().next() {
            Some(initial) => format!("{initial}. {}", self.last_name),
            None => self.last_name.clone(),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.first_name, self.last_name, self.id)?;
        if let Some(gender) = self.gender {
            write!(f, " [{}]", gender.code())?;
        }
        Ok(())
    }
}

/// Every student eligible for grouping in a run, in file order.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Result<Self> {
        let mut seen = HashSet::new();
        for student in &students {
            if !seen.insert(student.id.as_str()) {
                return Err(GroupingError::DuplicateStudent(student.id.clone()));
            }
        }
        Ok(Self { students })
    }

    /// Parse comma separated `id, first name, last name[, gender]` lines.
    /// Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let mut students = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let (id, first, last, gender) = match fields.as_slice() {
                [id, first, last] => (*id, *first, *last, None),
                [id, first, last, gender] => (*id, *first, *last, Some(*gender)),
                _ => {
                    return Err(GroupingError::MalformedRoster {
                        line: idx + 1,
                        reason: format!("expected 3 or 4 fields, found {}", fields.len()),
                    });
                }
            };
            if id.is_empty() {
                return Err(GroupingError::MalformedRoster {
                    line: idx + 1,
                    reason: "empty student id".to_string(),
                });
            }
            students.push(Student::new(id, first, last, gender)?);
        }
        Self::new(students)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster {}", path.display()))?;
        let roster =
            Self::parse(&content).with_context(|| format!("Invalid roster {}", path.display()))?;
        tracing::info!(path = %path.display(), students = roster.len(), "roster loaded");
        Ok(roster)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.students.iter().map(|s| s.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
