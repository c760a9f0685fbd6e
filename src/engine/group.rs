use crate::roster::Student;

/// Students working together for one session. Borrows from the roster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group<'a> {
    members: Vec<&'a Student>,
}

impl<'a> Group<'a> {
    pub fn new(members: Vec<&'a Student>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[&'a Student] {
        &self.members
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.members.iter().map(|s| s.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One complete partition of the roster into groups.
#[derive(Clone, Debug, Default)]
pub struct Session<'a> {
    groups: Vec<Group<'a>>,
    attempts: usize,
}

impl<'a> Session<'a> {
    pub fn new(groups: Vec<Group<'a>>, attempts: usize) -> Self {
        Self { groups, attempts }
    }

    pub fn groups(&self) -> &[Group<'a>] {
        &self.groups
    }

    /// Number of whole-session attempts it took to find these groups.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn students(&self) -> impl Iterator<Item = &'a Student> + '_ {
        self.groups.iter().flat_map(|g| g.members().iter().copied())
    }

    pub fn student_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    pub fn group_of(&self, id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(id))
    }
}
