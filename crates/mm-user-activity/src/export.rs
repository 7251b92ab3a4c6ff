use std::io::{self, BufWriter, Write};

use mattermost_ox::{Timestamp, User};

/// Output columns, in file order.
pub const COLUMNS: [&str; 13] = [
    "id",
    "create_at",
    "update_at",
    "delete_at",
    "username",
    "email",
    "roles",
    "nickname",
    "auth_service",
    "first_name",
    "last_name",
    "position",
    "last_activity_at",
];

pub const DELIMITER: &str = ", ";

/// One user projected onto [`COLUMNS`], every cell already sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow(Vec<String>);

impl OutputRow {
    #[must_use]
    pub fn from_user(user: &User, null_marker: &str) -> Self {
        let text = |value: &Option<String>| value.as_deref().unwrap_or(null_marker).to_string();
        let date = |value: &Option<Timestamp>| {
            value.map_or_else(|| null_marker.to_string(), |ts| ts.to_local_string())
        };

        let cells = [
            text(&user.id),
            date(&user.create_at),
            date(&user.update_at),
            date(&user.delete_at),
            text(&user.username),
            text(&user.email),
            text(&user.roles),
            text(&user.nickname),
            text(&user.auth_service),
            text(&user.first_name),
            text(&user.last_name),
            text(&user.position),
            date(&user.last_activity_at),
        ];

        Self(cells.iter().map(|cell| sanitize(cell)).collect())
    }

    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn to_line(&self) -> String {
        self.0.join(DELIMITER)
    }
}

/// Replace anything that would split a cell or a record with a space.
#[must_use]
pub fn sanitize(value: &str) -> String {
    value.replace([',', '\r', '\n'], " ")
}

#[must_use]
pub fn header_line() -> String {
    COLUMNS.join(DELIMITER)
}

/// Write the header and one line per user. Returns the number of user rows.
pub fn write_report<W: Write>(writer: W, users: &[User], null_marker: &str) -> io::Result<usize> {
    let mut out = BufWriter::new(writer);
    writeln!(out, "{}", header_line())?;
    for user in users {
        writeln!(out, "{}", OutputRow::from_user(user, null_marker).to_line())?;
    }
    out.flush()?;
    Ok(users.len())
}
