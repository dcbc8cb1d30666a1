use clap::Subcommand;
use serde_json::json;

use crowdgate_core::Rating;

use crate::util::{ProxyTarget, api_request, segment};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List the tasks of a campaign
    List {
        #[arg(long)]
        campaign_id: String,
        /// Status filter (SUBMITTED, COMPLETED, REJECTED, NEEDS_REVISION, ...)
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page_size: Option<u32>,
        /// Token from a previous page's nextPageToken
        #[arg(long)]
        page_token: Option<String>,
    },
    /// Show one task
    Get {
        /// Slot id or composite task id
        task_id: String,
        /// Needed unless the task id is composite
        #[arg(long)]
        campaign_id: Option<String>,
    },
    /// Rate a submitted task
    Rate {
        /// Slot id or composite task id
        task_id: String,
        /// OK, NOK or REVISE
        #[arg(long)]
        rating: Rating,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        campaign_id: Option<String>,
    },
}

pub async fn run(target: &ProxyTarget, command: TaskCommands) -> i32 {
    match command {
        TaskCommands::List {
            campaign_id,
            status,
            page_size,
            page_token,
        } => {
            let query = [
                ("campaignId", campaign_id),
                ("status", status.unwrap_or_default()),
                ("pageSize", page_size.map(|n| n.to_string()).unwrap_or_default()),
                ("pageToken", page_token.unwrap_or_default()),
            ];
            api_request(target, reqwest::Method::GET, "/tasks", &query, None).await
        }
        TaskCommands::Get {
            task_id,
            campaign_id,
        } => {
            let path = format!("/tasks/{}", segment(&task_id));
            let query = [("campaignId", campaign_id.unwrap_or_default())];
            api_request(target, reqwest::Method::GET, &path, &query, None).await
        }
        TaskCommands::Rate {
            task_id,
            rating,
            comment,
            campaign_id,
        } => {
            let path = format!("/tasks/{}/rate", segment(&task_id));
            let query = [("campaignId", campaign_id.unwrap_or_default())];
            api_request(
                target,
                reqwest::Method::PUT,
                &path,
                &query,
                Some(rate_body(rating, comment)),
            )
            .await
        }
    }
}

fn rate_body(rating: Rating, comment: Option<String>) -> serde_json::Value {
    let mut body = json!({ "rating": rating });
    if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
        body["comment"] = json!(comment);
    }
    body
}
