use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::date_parser::parse_header_date;

/// Outcome of a clemency petition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Granted,
    Denied,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Granted => "granted",
            Status::Denied => "denied",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "granted" => Some(Status::Granted),
            "denied" => Some(Status::Denied),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clemency action for one person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub name: String,
    pub official: String,
    pub status: Status,
}

/// Turn one reshaped table into records, or `None` when its header is not a date.
pub fn normalize(
    header_cell: &str,
    names: &[String],
    official: &str,
    status: Status,
) -> Option<Vec<NormalizedRecord>> {
    let date = parse_header_date(header_cell)?;
    Some(
        names
            .iter()
            .map(|name| NormalizedRecord {
                date,
                name: name.clone(),
                official: official.to_string(),
                status,
            })
            .collect(),
    )
}
