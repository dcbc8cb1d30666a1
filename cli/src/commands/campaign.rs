use clap::{Args, Subcommand};

use crate::util::{ProxyTarget, api_request, exit_error, read_json_from_file, segment};

#[derive(Subcommand)]
pub enum CampaignCommands {
    /// Pause a running campaign
    Pause { campaign_id: String },
    /// Resume a paused campaign
    Resume { campaign_id: String },
    /// Stop a campaign
    Stop { campaign_id: String },
    /// Restart a stopped campaign
    Restart { campaign_id: String },
    /// Update campaign fields
    Update(UpdateArgs),
}

#[derive(Args)]
pub struct UpdateArgs {
    pub campaign_id: String,

    /// Fields as a JSON object
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Read the JSON object from file (use '-' for stdin)
    #[arg(long, short = 'f', conflicts_with = "data")]
    pub data_file: Option<String>,
}

pub async fn run(target: &ProxyTarget, command: CampaignCommands) -> i32 {
    let (campaign_id, action) = match command {
        CampaignCommands::Pause { campaign_id } => (campaign_id, "pause"),
        CampaignCommands::Resume { campaign_id } => (campaign_id, "resume"),
        CampaignCommands::Stop { campaign_id } => (campaign_id, "stop"),
        CampaignCommands::Restart { campaign_id } => (campaign_id, "restart"),
        CampaignCommands::Update(args) => return update(target, args).await,
    };

    let path = format!("/campaigns/{}/{action}", segment(&campaign_id));
    api_request(target, reqwest::Method::PUT, &path, &[], None).await
}

async fn update(target: &ProxyTarget, args: UpdateArgs) -> i32 {
    let body = match update_body(args.data.as_deref(), args.data_file.as_deref()) {
        Ok(body) => body,
        Err(message) => exit_error(
            &message,
            Some("Pass the fields as --data '{\"title\":\"...\"}' or --data-file update.json"),
        ),
    };

    let path = format!("/campaigns/{}", segment(&args.campaign_id));
    api_request(target, reqwest::Method::PUT, &path, &[], Some(body)).await
}

fn update_body(data: Option<&str>, data_file: Option<&str>) -> Result<serde_json::Value, String> {
    let body = match (data, data_file) {
        (Some(raw), _) => {
            serde_json::from_str(raw).map_err(|e| format!("Invalid JSON in --data: {e}"))?
        }
        (None, Some(path)) => read_json_from_file(path)?,
        (None, None) => return Err("campaign update needs --data or --data-file".to_string()),
    };
    if !body.is_object() {
        return Err("campaign update must be a JSON object".to_string());
    }
    Ok(body)
}
