use crate::report::RankingScheme;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "build-status")]
#[command(about = "Summarize step statuses of Cloud Build builds", long_about = None)]
pub struct Cli {
    /// Build ids to report on, queried in order
    #[arg(required = true, value_name = "BUILD_ID")]
    pub build_ids: Vec<String>,

    /// Project id owning the builds (required by the gcloud and api sources)
    #[arg(long)]
    pub project: Option<String>,

    /// Where build descriptions come from
    #[arg(long, value_enum, default_value_t = SourceKind::Gcloud)]
    pub source: SourceKind,

    /// Directory of saved `<BUILD_ID>.json` descriptions (dir source)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    #[arg(long, default_value = "gcloud")]
    pub gcloud_bin: String,

    #[arg(long, default_value = "https://cloudbuild.googleapis.com/v1")]
    pub api_base: String,

    /// OAuth access token for the api source
    #[arg(long)]
    pub access_token: Option<String>,

    /// HTTP timeout in seconds (api source); no timeout when unset
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, value_enum, default_value_t = RankingScheme::Detailed)]
    pub ranking: RankingScheme,

    /// Exit with code 1 when any step is not SUCCESS
    #[arg(long, value_enum, default_value_t = Toggle::On)]
    pub exit_code: Toggle,

    /// Step environment key holding the tag
    #[arg(long, default_value = crate::tag::DEFAULT_TAG_KEY)]
    pub tag_key: String,

    /// Minimum width of the step name column
    #[arg(long, default_value_t = 24)]
    pub name_width: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// `gcloud builds describe`
    Gcloud,
    /// Cloud Build REST API
    Api,
    /// Saved JSON files
    Dir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}
