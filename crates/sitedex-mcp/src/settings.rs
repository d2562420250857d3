//! Startup settings: defaults, then the config file, then environment, then flags.

use std::path::PathBuf;

use sitedex_core::config::sample_origin;
use sitedex_core::{ContentSource, Error, FileConfig, Result, SiteConfig};

use crate::cli::{Cli, DEFAULT_PORT, DEFAULT_TOOL_NAME};

/// How the server talks to its client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout
    Stdio,
    /// Streamable HTTP on `127.0.0.1:<port>`
    Http {
        /// Listen port
        port: u16,
    },
}

/// Everything the server needs, validated once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Index and content source settings
    pub site: SiteConfig,
    /// Name of the search tool
    pub tool_name: String,
    /// Publish result pages as resources
    pub resources: bool,
    /// Transport to serve on
    pub transport: Transport,
}

/// Environment values that feed into [`Settings`]
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `SITEDEX_CACHE_DIR`
    pub cache_dir: Option<PathBuf>,
    /// `HTTPS_PROXY` / `https_proxy`
    pub https_proxy: Option<String>,
}

impl Environment {
    /// Read the process environment.
    pub fn from_process() -> Self {
        Self {
            cache_dir: SiteConfig::cache_root_from_env(),
            https_proxy: SiteConfig::proxy_from_env(),
        }
    }
}

impl Settings {
    /// Merge every layer and validate the result.
    pub fn resolve(cli: &Cli, file: FileConfig, env: Environment) -> Result<Self> {
        let source = if let Some(host) = &cli.host {
            ContentSource::Mirror { host: host.clone() }
        } else if !cli.page.is_empty() {
            ContentSource::Pages {
                pages: cli.page.clone(),
            }
        } else {
            file.source.unwrap_or_default()
        };

        let cache_root = cli
            .cache_dir
            .clone()
            .or(env.cache_dir)
            .or(file.cache_dir)
            .unwrap_or_else(SiteConfig::default_cache_root);

        let http = file.http.unwrap_or_default();
        let transport = if cli.http || cli.port.is_some() || http.enabled.unwrap_or(false) {
            Transport::Http {
                port: cli.port.or(http.port).unwrap_or(DEFAULT_PORT),
            }
        } else {
            Transport::Stdio
        };

        // Sample pages are served by this process, so their origin follows the port.
        let origin = cli.origin.clone().or(file.origin).or_else(|| {
            (source == ContentSource::Sample).then(|| match transport {
                Transport::Http { port } => sample_origin(port),
                Transport::Stdio => sample_origin(DEFAULT_PORT),
            })
        });
        let site = SiteConfig::new(source, origin, cache_root, env.https_proxy)?;

        let tool_name = cli
            .tool_name
            .clone()
            .or(file.tool_name)
            .unwrap_or_else(|| DEFAULT_TOOL_NAME.to_string());
        validate_tool_name(&tool_name)?;

        let resources = !cli.no_resources && file.resources.unwrap_or(true);


        Ok(Self {
            site,
            tool_name,
            resources,
            transport,
        })
    }
}

fn validate_tool_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "invalid tool name '{name}': use 1-64 letters, digits, '_', '-' or '.'"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use sitedex_core::HttpFileConfig;
    use sitedex_core::config::DEFAULT_SAMPLE_ORIGIN;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["sitedex-mcp"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn env() -> Environment {
        Environment {
            cache_dir: Some(PathBuf::from("/tmp/sitedex-env")),
            https_proxy: None,
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&cli(&[]), FileConfig::default(), env()).unwrap();
        assert_eq!(settings.site.source, ContentSource::Sample);
        assert_eq!(settings.site.origin, DEFAULT_SAMPLE_ORIGIN);
        assert_eq!(settings.tool_name, "search_site");
        assert!(settings.resources);
        assert_eq!(settings.transport, Transport::Stdio);
        assert_eq!(settings.site.cache_root, PathBuf::from("/tmp/sitedex-env"));
    }

    #[test]
    fn test_port_implies_http() {
        let settings = Settings::resolve(&cli(&["9000"]), FileConfig::default(), env()).unwrap();
        assert_eq!(settings.transport, Transport::Http { port: 9000 });

        let settings = Settings::resolve(&cli(&["--http"]), FileConfig::default(), env()).unwrap();
        assert_eq!(settings.transport, Transport::Http { port: 8848 });
    }

    #[test]
    fn test_sample_origin_follows_port() {
        let settings = Settings::resolve(&cli(&["9000"]), FileConfig::default(), env()).unwrap();
        assert_eq!(settings.site.origin, "http://localhost:9000");

        let file = FileConfig {
            http: Some(HttpFileConfig {
                enabled: Some(true),
                port: Some(7000),
            }),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&cli(&[]), file, env()).unwrap();
        assert_eq!(settings.site.origin, "http://localhost:7000");

        let settings = Settings::resolve(
            &cli(&["9000", "--origin", "https://site.example"]),
            FileConfig::default(),
            env(),
        )
        .unwrap();
        assert_eq!(settings.site.origin, "https://site.example");
    }

    #[test]
    fn test_pages_origin_ignores_port() {
        let settings = Settings::resolve(
            &cli(&["9000", "--page", "https://news.example/issues/a"]),
            FileConfig::default(),
            env(),
        )
        .unwrap();
        assert_eq!(settings.site.origin, "https://news.example");
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            tool_name: Some("from_file".into()),
            resources: Some(true),
            cache_dir: Some(PathBuf::from("/tmp/from-file")),
            http: Some(HttpFileConfig {
                enabled: Some(true),
                port: Some(7000),
            }),
            ..FileConfig::default()
        };

        let settings = Settings::resolve(
            &cli(&["--tool-name=from_cli", "--no-resources", "--cache-dir", "/tmp/from-cli"]),
            file,
            env(),
        )
        .unwrap();

        assert_eq!(settings.tool_name, "from_cli");
        assert!(!settings.resources);
        assert_eq!(settings.site.cache_root, PathBuf::from("/tmp/from-cli"));
        assert_eq!(settings.transport, Transport::Http { port: 7000 });
    }

    #[test]
    fn test_env_overrides_file_cache_dir() {
        let file = FileConfig {
            cache_dir: Some(PathBuf::from("/tmp/from-file")),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&cli(&[]), file, env()).unwrap();
        assert_eq!(settings.site.cache_root, PathBuf::from("/tmp/sitedex-env"));
    }

    #[test]
    fn test_host_selects_mirror() {
        let settings = Settings::resolve(
            &cli(&["--host", "http://localhost:8848/"]),
            FileConfig::default(),
            env(),
        )
        .unwrap();
        assert_eq!(
            settings.site.source,
            ContentSource::Mirror {
                host: "http://localhost:8848".into()
            }
        );
    }

    #[test]
    fn test_empty_host_fails() {
        let result = Settings::resolve(&cli(&["--host", ""]), FileConfig::default(), env());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_tool_name() {
        let result = Settings::resolve(
            &cli(&["--tool-name=has space"]),
            FileConfig::default(),
            env(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
