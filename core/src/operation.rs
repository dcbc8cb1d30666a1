use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ResolveError;

/// Caller-facing action, independent of the upstream endpoint that implements it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LogicalOperation {
    ListTasks,
    GetTaskDetail,
    RateTask,
    PauseCampaign,
    ResumeCampaign,
    StopCampaign,
    RestartCampaign,
    UpdateCampaign,
}

impl LogicalOperation {
    pub const ALL: [LogicalOperation; 8] = [
        Self::ListTasks,
        Self::GetTaskDetail,
        Self::RateTask,
        Self::PauseCampaign,
        Self::ResumeCampaign,
        Self::StopCampaign,
        Self::RestartCampaign,
        Self::UpdateCampaign,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListTasks => "list-tasks",
            Self::GetTaskDetail => "get-task-detail",
            Self::RateTask => "rate-task",
            Self::PauseCampaign => "pause-campaign",
            Self::ResumeCampaign => "resume-campaign",
            Self::StopCampaign => "stop-campaign",
            Self::RestartCampaign => "restart-campaign",
            Self::UpdateCampaign => "update-campaign",
        }
    }

    /// Reads degrade to an empty result when every candidate is exhausted;
    /// writes never do.
    pub fn is_read(self) -> bool {
        matches!(self, Self::ListTasks | Self::GetTaskDetail)
    }

    /// Only task rating widens its candidates over both identifier forms.
    pub fn expands_task_identifiers(self) -> bool {
        matches!(self, Self::RateTask)
    }

    /// Map a campaign action segment (`pause`, `resume`, `stop`, `restart`).
    pub fn from_campaign_action(action: &str) -> Result<Self, ResolveError> {
        match action.trim().to_ascii_lowercase().as_str() {
            "pause" => Ok(Self::PauseCampaign),
            "resume" => Ok(Self::ResumeCampaign),
            "stop" => Ok(Self::StopCampaign),
            "restart" => Ok(Self::RestartCampaign),
            _ => Err(ResolveError::UnknownOperation(action.to_string())),
        }
    }
}

impl fmt::Display for LogicalOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalOperation {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == wanted)
            .ok_or_else(|| ResolveError::UnknownOperation(s.to_string()))
    }
}
