use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::engine::group::Session;
use crate::roster::StudentId;

const GROUP_COLUMN: usize = 5;
const MEMBER_COLUMN: usize = 18;

/// Markdown listing of a session: one row per group, one column per member,
/// with the roles as column headings.
pub fn render_groups(session: &Session<'_>, roles: &[String], created_at: NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# Groups created on {} #",
        created_at.format("%Y-%m-%d %H:%M:%S")
    );
    out.push('\n');

    let mut header = format!("{:<width$}", "Group", width = GROUP_COLUMN);
    let mut dashes = "-".repeat(GROUP_COLUMN);
    for role in roles {
        let _ = write!(header, " {role:<width$}", width = MEMBER_COLUMN);
        let _ = write!(dashes, " {}", "-".repeat(MEMBER_COLUMN));
    }
    let _ = writeln!(out, "{}", header.trim_end());
    let _ = writeln!(out, "{dashes}");

    for (i, group) in session.groups().iter().enumerate() {
        let mut row = format!("{:^width$}", i + 1, width = GROUP_COLUMN);
        for student in group.members() {
            let _ = write!(row, " {:<width$}", student.short_name(), width = MEMBER_COLUMN);
        }
        let _ = writeln!(out, "{}", row.trim_end());
    }
    out.push('\n');
    out
}

/// `times = pairs`, one line per pairing count, ascending.
pub fn render_histogram(histogram: &BTreeMap<u32, usize>) -> String {
    let mut out = String::from("Histogram of Pairing Frequency\n");
    for (times, pairs) in histogram {
        let _ = writeln!(out, "{times} = {pairs}");
    }
    out
}

pub fn render_repeat_pairings(pairs: &[(StudentId, StudentId, u32)], min_count: u32) -> String {
    let mut out = format!("Pairs grouped together at least {min_count} times\n");
    if pairs.is_empty() {
        out.push_str("(none)\n");
    }
    for (a, b, count) in pairs {
        let _ = writeln!(out, "{a} {b} {count}");
    }
    out
}
