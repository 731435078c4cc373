use std::path::Path;

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Serialize;

use crate::level::Level;

/// Where a log call was made: source file, line and enclosing function.
///
/// Built at compile time by [`call_site!`](crate::call_site) rather than by
/// walking the stack at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    function: &'static str,
}

impl CallSite {
    /// # Arguments
    /// * `file` - Source path, usually `file!()`; only the file name is kept
    /// * `line` - Source line, usually `line!()`
    /// * `function` - Function name or fully qualified path; only the last
    ///   named segment is kept
    pub fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file: file_name(file),
            line,
            function: function_name(function),
        }
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn function(&self) -> &'static str {
        self.function
    }

    /// `file.rs:line`, the form stored in the `file` column.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

fn file_name(path: &'static str) -> &'static str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

fn function_name(path: &'static str) -> &'static str {
    let mut path = path
        .strip_suffix(crate::macros::CALL_SITE_MARKER)
        .unwrap_or(path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}

/// A single audit record.
///
/// Created on every call that passes the level filter and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    /// `file.rs:line` of the call site
    pub file: String,
    pub function: String,
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    /// Render the entry the way it is written to the console.
    ///
    /// A `[user:..]` suffix is added when the entry is attributed, preferring
    /// the email over the numeric id.
    pub fn console_line(&self) -> String {
        let user = match (&self.user_email, self.user_id) {
            (Some(email), _) if !email.is_empty() => format!(" [user:{}]", email),
            (_, Some(id)) => format!(" [user:{}]", id),
            _ => String::new(),
        };

        format!(
            "{} [{}] [{}] [{}] {}{}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.level,
            self.file,
            self.function,
            self.message,
            user
        )
    }
}
