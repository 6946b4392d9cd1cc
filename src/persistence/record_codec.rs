//! Text encoding of a task list as a single DM message.
//!
//! Every record begins with one of the markers in [`RecordKind`]. Markers
//! are permanently reserved: messages written by any earlier release must
//! keep decoding, so a new record shape is added as a new variant and no
//! existing marker string is ever changed or dropped.
//!
//! Decoding is deliberately lenient. Any line shaped `<digits>. <text>` is
//! a task; everything else (header, sentinel, removal note, blank lines) is
//! discarded. Unrecognized input decodes to an empty list, never an error.

use std::sync::LazyLock;

use regex::Regex;

/// Header preceding the numbered lines of a non-empty list.
pub const LISTING_HEADER: &str = "Remaining tasks:";

/// Body written when the list is empty.
pub const ALL_DONE_SENTINEL: &str = "🎉 All tasks completed!";

/// Leading marker of a record that documents a removal.
pub const REMOVAL_MARKER: &str = "✅ Removed:";

#[allow(clippy::expect_used)] // Static pattern, covered by unit tests.
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("numbered line pattern compiles"));

/// Recognized record shapes, keyed by the marker each one starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `Remaining tasks:` followed by numbered lines.
    Listing,
    /// The empty-list sentinel.
    AllDone,
    /// A removal note followed by a listing or the sentinel.
    Removal,
}

impl RecordKind {
    /// Every reserved marker, in detection order.
    pub const ALL: [Self; 3] = [Self::Removal, Self::Listing, Self::AllDone];

    /// The reserved marker string for this kind.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Listing => LISTING_HEADER,
            Self::AllDone => ALL_DONE_SENTINEL,
            Self::Removal => REMOVAL_MARKER,
        }
    }

    /// Classify a message body, or `None` if it is not a task record.
    #[must_use]
    pub fn detect(body: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| body.starts_with(kind.marker()))
    }
}

/// Encode `tasks` as a record body, optionally noting a removed task.
#[must_use]
pub fn encode(tasks: &[String], removed: Option<&str>) -> String {
    let body = if tasks.is_empty() {
        ALL_DONE_SENTINEL.to_owned()
    } else {
        let lines = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| format!("{}. {task}", index + 1))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{LISTING_HEADER}\n{lines}")
    };

    match removed {
        Some(task) => format!("{REMOVAL_MARKER} {task}\n\n{body}"),
        None => body,
    }
}

/// Decode the ordered task list from any record body.
///
/// Never fails: a foreign or malformed body yields an empty list.
#[must_use]
pub fn decode(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter_map(|line| {
            NUMBERED_LINE
                .find(line)
                .map(|prefix| line[prefix.end()..].to_owned())
        })
        .collect()
}

/// Decode `body` only if it carries a reserved marker.
#[must_use]
pub fn decode_record(body: &str) -> Option<(RecordKind, Vec<String>)> {
    RecordKind::detect(body).map(|kind| (kind, decode(body)))
}
