use crate::structures::BuildDescription;
use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Anything able to describe a build by its id. One attempt per call.
pub trait BuildSource {
    fn describe(&self, build_id: &str) -> Result<BuildDescription>;
}

fn parse_description(raw: &[u8], build_id: &str) -> Result<BuildDescription> {
    let mut build: BuildDescription =
        serde_json::from_slice(raw).context("Failed to parse build description")?;
    if build.id.is_empty() {
        build.id = build_id.to_string();
    }
    Ok(build)
}

// Error lines on stdout stay single-line; the rest goes to the debug log.
fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
}

/// Shells out to `gcloud builds describe`.
pub struct GcloudSource {
    pub program: String,
    pub project: String,
}

impl BuildSource for GcloudSource {
    fn describe(&self, build_id: &str) -> Result<BuildDescription> {
        debug!(program=%self.program, build_id, project=%self.project, "running gcloud");
        let output = Command::new(&self.program)
            .args(["builds", "describe", build_id, "--format", "json", "--project"])
            .arg(&self.project)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(program=%self.program, build_id, stderr=%stderr.trim(), "gcloud failed");
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                first_line(&stderr)
            );
        }
        parse_description(&output.stdout, build_id)
    }
}

/// Queries the Cloud Build REST API directly.
pub struct ApiSource {
    client: Client,
    base_url: String,
    project: String,
    token: String,
}

impl ApiSource {
    /// `timeout` of `None` disables reqwest's default request timeout.
    pub fn new(
        base_url: &str,
        project: &str,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
            token: token.to_string(),
        })
    }

    fn build_url(&self, build_id: &str) -> String {
        format!("{}/projects/{}/builds/{}", self.base_url, self.project, build_id)
    }
}

impl BuildSource for ApiSource {
    fn describe(&self, build_id: &str) -> Result<BuildDescription> {
        let url = self.build_url(build_id);
        debug!(%url, "fetching build");
        let response = self.client.get(&url).bearer_auth(&self.token).send()?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Failed to fetch {}: Status {}",
                url,
                response.status()
            ));
        }
        let body = response.bytes()?;
        parse_description(&body, build_id)
    }
}

/// Reads `<dir>/<build_id>.json`, for offline replay of saved descriptions.
pub struct DirSource {
    pub dir: PathBuf,
}

impl BuildSource for DirSource {
    fn describe(&self, build_id: &str) -> Result<BuildDescription> {
        let path = self.dir.join(format!("{}.json", build_id));
        let raw = fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
        parse_description(&raw, build_id)
    }
}
