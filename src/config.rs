use crate::cli::{Cli, ColorChoice, OutputFormat, SourceKind, Toggle};
use crate::report::RankingScheme;
use crate::source::{ApiSource, BuildSource, DirSource, GcloudSource};
use anyhow::{anyhow, bail, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

/// Backend-specific settings, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Gcloud {
        program: String,
        project: String,
    },
    Api {
        base_url: String,
        project: String,
        token: String,
        timeout: Option<Duration>,
    },
    Dir {
        dir: PathBuf,
    },
}

/// Everything one run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub build_ids: Vec<String>,
    pub source: SourceConfig,
    pub ranking: RankingScheme,
    pub exit_on_failure: bool,
    pub tag_key: String,
    pub name_width: usize,
    pub format: OutputFormat,
    pub color: bool,
}

fn require_project(project: Option<&str>) -> Result<String> {
    match project.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        _ => bail!("need project ID (--project)"),
    }
}

impl ReportConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let source = match cli.source {
            SourceKind::Gcloud => SourceConfig::Gcloud {
                program: cli.gcloud_bin,
                project: require_project(cli.project.as_deref())?,
            },
            SourceKind::Api => {
                let project = require_project(cli.project.as_deref())?;
                let token = cli
                    .access_token
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| anyhow!("need access token (--access-token) for the api source"))?;
                SourceConfig::Api {
                    base_url: cli.api_base,
                    project,
                    token,
                    timeout: cli.timeout_secs.map(Duration::from_secs),
                }
            }
            SourceKind::Dir => SourceConfig::Dir {
                dir: cli
                    .dir
                    .ok_or_else(|| anyhow!("need a directory (--dir) for the dir source"))?,
            },
        };

        let color = match cli.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stdout().is_terminal(),
        };

        Ok(Self {
            build_ids: cli.build_ids,
            source,
            ranking: cli.ranking,
            exit_on_failure: cli.exit_code == Toggle::On,
            tag_key: cli.tag_key,
            name_width: cli.name_width,
            format: cli.format,
            color,
        })
    }

    pub fn open_source(&self) -> Result<Box<dyn BuildSource>> {
        let source: Box<dyn BuildSource> = match &self.source {
            SourceConfig::Gcloud { program, project } => Box::new(GcloudSource {
                program: program.clone(),
                project: project.clone(),
            }),
            SourceConfig::Api {
                base_url,
                project,
                token,
                timeout,
            } => Box::new(ApiSource::new(base_url, project, token, *timeout)?),
            SourceConfig::Dir { dir } => Box::new(DirSource { dir: dir.clone() }),
        };
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<ReportConfig> {
        let mut argv = vec!["build-status"];
        argv.extend_from_slice(args);
        ReportConfig::from_cli(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn gcloud_source_requires_project() {
        let err = parse(&["b-1"]).unwrap_err();
        assert!(err.to_string().contains("need project ID"));

        let err = parse(&["--project", "  ", "b-1"]).unwrap_err();
        assert!(err.to_string().contains("need project ID"));
    }

    #[test]
    fn defaults_follow_detailed_variant() {
        let config = parse(&["--project", "demo", "b-1", "b-2"]).unwrap();
        assert_eq!(config.build_ids, vec!["b-1", "b-2"]);
        assert_eq!(
            config.source,
            SourceConfig::Gcloud {
                program: "gcloud".to_string(),
                project: "demo".to_string(),
            }
        );
        assert_eq!(config.ranking, RankingScheme::Detailed);
        assert!(config.exit_on_failure);
        assert_eq!(config.tag_key, "REMOTE_TAG_NAME");
        assert_eq!(config.name_width, 24);
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn legacy_variant_is_selectable() {
        let config = parse(&[
            "--project",
            "demo",
            "--ranking",
            "coarse",
            "--exit-code",
            "off",
            "--color",
            "never",
            "b-1",
        ])
        .unwrap();
        assert_eq!(config.ranking, RankingScheme::Coarse);
        assert!(!config.exit_on_failure);
        assert!(!config.color);
    }

    #[test]
    fn dir_source_needs_no_project_but_a_dir() {
        let config = parse(&["--source", "dir", "--dir", "/tmp/builds", "b-1"]).unwrap();
        assert_eq!(
            config.source,
            SourceConfig::Dir {
                dir: PathBuf::from("/tmp/builds")
            }
        );
        assert!(parse(&["--source", "dir", "b-1"]).is_err());
    }

    #[test]
    fn api_source_needs_token() {
        let err = parse(&["--source", "api", "--project", "demo", "b-1"]).unwrap_err();
        assert!(err.to_string().contains("access token"));

        let config = parse(&[
            "--source",
            "api",
            "--project",
            "demo",
            "--access-token",
            "tok",
            "b-1",
        ])
        .unwrap();
        assert!(matches!(
            config.source,
            SourceConfig::Api { timeout: None, .. }
        ));

        let config = parse(&[
            "--source",
            "api",
            "--project",
            "demo",
            "--access-token",
            "tok",
            "--timeout-secs",
            "10",
            "b-1",
        ])
        .unwrap();
        assert!(matches!(
            config.source,
            SourceConfig::Api { timeout: Some(t), .. } if t == Duration::from_secs(10)
        ));
    }

    #[test]
    fn build_ids_are_required() {
        assert!(Cli::try_parse_from(["build-status", "--project", "demo"]).is_err());
    }
}
