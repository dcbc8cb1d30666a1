//! Translation between the dashboard's status vocabulary and the upstream one.
//!
//! Several caller tokens collapse onto one upstream token, so the reverse
//! direction is lossy: it returns one canonical caller token per upstream token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusToken {
    Submitted,
    Completed,
    Rejected,
    Done,
    NeedsRevision,
    Rated,
    Finished,
    RevisionNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamStatus {
    NotRated,
    Accepted,
    Declined,
    Revise,
}

/// Rating verdict accepted by the upstream rate endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Rating {
    #[serde(rename = "OK")]
    Accept,
    #[serde(rename = "NOK")]
    Decline,
    #[serde(rename = "REVISE")]
    Revise,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized status token '{0}'")]
pub struct UnrecognizedToken(pub String);

impl StatusToken {
    pub const ALL: [StatusToken; 8] = [
        Self::Submitted,
        Self::Completed,
        Self::Rejected,
        Self::Done,
        Self::NeedsRevision,
        Self::Rated,
        Self::Finished,
        Self::RevisionNeeded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
            Self::Done => "DONE",
            Self::NeedsRevision => "NEEDS_REVISION",
            Self::Rated => "RATED",
            Self::Finished => "FINISHED",
            Self::RevisionNeeded => "REVISION_NEEDED",
        }
    }

    pub fn upstream(self) -> UpstreamStatus {
        match self {
            Self::Submitted | Self::Completed => UpstreamStatus::NotRated,
            Self::Done | Self::Rated | Self::Finished => UpstreamStatus::Accepted,
            Self::Rejected => UpstreamStatus::Declined,
            Self::NeedsRevision | Self::RevisionNeeded => UpstreamStatus::Revise,
        }
    }
}

impl UpstreamStatus {
    pub const ALL: [UpstreamStatus; 4] = [
        Self::NotRated,
        Self::Accepted,
        Self::Declined,
        Self::Revise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotRated => "NOTRATED",
            Self::Accepted => "OK",
            Self::Declined => "NOK",
            Self::Revise => "REVISE",
        }
    }

    pub fn caller(self) -> StatusToken {
        match self {
            Self::NotRated => StatusToken::Submitted,
            Self::Accepted => StatusToken::Done,
            Self::Declined => StatusToken::Rejected,
            Self::Revise => StatusToken::NeedsRevision,
        }
    }
}

impl Rating {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "OK",
            Self::Decline => "NOK",
            Self::Revise => "REVISE",
        }
    }
}

impl fmt::Display for StatusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusToken {
    type Err = UnrecognizedToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|token| token.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnrecognizedToken(s.to_string()))
    }
}

impl FromStr for UpstreamStatus {
    type Err = UnrecognizedToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|token| token.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnrecognizedToken(s.to_string()))
    }
}

impl FromStr for Rating {
    type Err = UnrecognizedToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OK" => Ok(Self::Accept),
            "NOK" => Ok(Self::Decline),
            "REVISE" => Ok(Self::Revise),
            _ => Err(UnrecognizedToken(s.to_string())),
        }
    }
}

/// Translate a caller status filter into the upstream vocabulary.
///
/// Never fails: unrecognized input (including tokens that are already
/// upstream tokens) is returned exactly as given.
pub fn to_upstream(token: &str) -> &str {
    match token.parse::<StatusToken>() {
        Ok(known) => known.upstream().as_str(),
        Err(_) => token,
    }
}

/// Canonical caller token for an upstream status, if it is one.
pub fn from_upstream(token: &str) -> Option<StatusToken> {
    token.parse::<UpstreamStatus>().ok().map(UpstreamStatus::caller)
}
