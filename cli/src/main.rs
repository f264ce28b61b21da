//! CLI for jelease.
//!
//! Runs the webhook service that turns newreleases.io notifications into
//! Jira update issues.

use clap::builder::BoolishValueParser;
use clap::Parser;
use jelease::{Config, ConfigError, ConfigFile, Server, ServerError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// jelease - Keep one Jira update issue per project in sync with newreleases.io.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file. Flags and environment variables override it.
    #[arg(long, env = "JELEASE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on [default: 8080].
    #[arg(long, env = "JELEASE_PORT")]
    port: Option<u16>,

    /// Base URL of the Jira server.
    #[arg(long, env = "JELEASE_JIRA_URL")]
    jira_url: Option<String>,

    /// Jira user name or e-mail.
    #[arg(long, env = "JELEASE_JIRA_USER")]
    jira_user: Option<String>,

    /// Jira API token.
    #[arg(long, env = "JELEASE_JIRA_TOKEN", hide_env_values = true)]
    jira_token: Option<String>,

    /// Key of the Jira project to file issues in.
    #[arg(long, env = "JELEASE_PROJECT")]
    project: Option<String>,

    /// Status new issues start in; existing issues are searched by it.
    #[arg(long, env = "JELEASE_DEFAULT_STATUS")]
    default_status: Option<String>,

    /// Comma separated labels added to every created issue.
    #[arg(long, env = "JELEASE_ADD_LABELS", value_delimiter = ',')]
    add_labels: Option<Vec<String>>,

    /// Issue type of created issues [default: Task].
    #[arg(long, env = "JELEASE_ISSUE_TYPE")]
    issue_type: Option<String>,

    /// Handlebars template for issue descriptions.
    #[arg(long, env = "JELEASE_DESCRIPTION_TEMPLATE")]
    description_template: Option<String>,

    /// Log intended changes without creating or updating issues.
    #[arg(
        long,
        env = "JELEASE_DRY_RUN",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    dry_run: Option<bool>,

    /// Numeric id of a custom field holding the project name, used instead of labels.
    #[arg(long, env = "JELEASE_PROJECT_CUSTOM_FIELD")]
    project_custom_field: Option<u64>,

    /// Handle webhooks for the same project one at a time.
    #[arg(
        long,
        env = "JELEASE_SERIALIZE_PER_PROJECT",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    serialize_per_project: Option<bool>,
}

impl Args {
    /// Returns the options given as flags or environment variables.
    fn to_layer(&self) -> ConfigFile {
        ConfigFile {
            port: self.port,
            jira_url: self.jira_url.clone(),
            jira_user: self.jira_user.clone(),
            jira_token: self.jira_token.clone(),
            project: self.project.clone(),
            default_status: self.default_status.clone(),
            add_labels: self.add_labels.clone(),
            issue_type: self.issue_type.clone(),
            description_template: self.description_template.clone(),
            dry_run: self.dry_run,
            project_custom_field: self.project_custom_field,
            serialize_per_project: self.serialize_per_project,
        }
    }

    /// Merges the config file, if any, with flags and environment variables.
    fn into_config(self) -> Result<Config, ConfigError> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        file.merge(self.to_layer()).into_config()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Read `.env` before clap looks at the environment
    load_env_file(None);

    // Parse arguments
    let args = Args::parse();

    // Run the main logic
    match run(args).await {
        Ok(()) => ExitCode::from(0),
        Err(e) if e.is_startup() => {
            error!(error = %e, "Startup failure");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "Server failure");
            ExitCode::from(1)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Loads variables from a `.env` file, from the working directory or its
/// parents unless `path` is given. Variables already set in the environment
/// are left untouched.
fn load_env_file(path: Option<&Path>) {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match result {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Failed to load .env file"),
    }
}

/// Main execution logic.
async fn run(args: Args) -> Result<(), ServerError> {
    let config = args.into_config()?;
    let server = Server::new(config)?;
    server.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const REQUIRED_FLAGS: [&str; 11] = [
        "jelease",
        "--jira-url",
        "https://jira.example.com",
        "--jira-user",
        "bot",
        "--jira-token",
        "secret",
        "--project",
        "OPS",
        "--default-status",
        "To Do",
    ];

    /// Every environment variable the CLI reads, unset.
    fn clean_env() -> Vec<(&'static str, Option<String>)> {
        [
            "JELEASE_CONFIG",
            "JELEASE_PORT",
            "JELEASE_JIRA_URL",
            "JELEASE_JIRA_USER",
            "JELEASE_JIRA_TOKEN",
            "JELEASE_PROJECT",
            "JELEASE_DEFAULT_STATUS",
            "JELEASE_ADD_LABELS",
            "JELEASE_ISSUE_TYPE",
            "JELEASE_DESCRIPTION_TEMPLATE",
            "JELEASE_DRY_RUN",
            "JELEASE_PROJECT_CUSTOM_FIELD",
            "JELEASE_SERIALIZE_PER_PROJECT",
        ]
        .into_iter()
        .map(|name| (name, None))
        .collect()
    }

    fn with_env(vars: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        let mut env = clean_env();
        for &(name, value) in vars {
            env.retain(|(n, _)| *n != name);
            env.push((name, Some(value.to_string())));
        }
        env
    }

    #[test]
    fn can_configure_with_flags() {
        temp_env::with_vars(clean_env(), || {
            let mut argv = REQUIRED_FLAGS.to_vec();
            argv.extend([
                "--port",
                "9000",
                "--add-labels",
                "dependencies,jelease",
                "--dry-run",
                "--project-custom-field",
                "10100",
            ]);

            let config = Args::try_parse_from(argv).unwrap().into_config().unwrap();

            assert_eq!(config.port(), 9000);
            assert_eq!(config.issues().project_key(), "OPS");
            assert_eq!(config.issues().labels(), ["dependencies", "jelease"]);
            assert!(config.issues().dry_run());
            assert_eq!(config.issues().project_custom_field(), Some(10100));
            assert!(!config.serialize_per_project());
        });
    }

    #[test]
    fn can_configure_with_env() {
        temp_env::with_vars(
            with_env(&[
                ("JELEASE_JIRA_URL", "https://jira.example.com"),
                ("JELEASE_JIRA_USER", "bot"),
                ("JELEASE_JIRA_TOKEN", "secret"),
                ("JELEASE_PROJECT", "OPS"),
                ("JELEASE_DEFAULT_STATUS", "Backlog"),
                ("JELEASE_ADD_LABELS", "a,b"),
                ("JELEASE_DRY_RUN", "1"),
                ("JELEASE_SERIALIZE_PER_PROJECT", "yes"),
            ]),
            || {
                let config = Args::try_parse_from(["jelease"])
                    .unwrap()
                    .into_config()
                    .unwrap();

                assert_eq!(config.issues().default_status(), "Backlog");
                assert_eq!(config.issues().labels(), ["a", "b"]);
                assert!(config.issues().dry_run());
                assert!(config.serialize_per_project());
            },
        );
    }

    #[test]
    fn flags_override_env_and_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jelease.toml");
        fs::write(
            &path,
            r#"
jira-url = "https://jira.example.com"
jira-user = "bot"
jira-token = "secret"
project = "FILE"
default-status = "File Status"
issue-type = "Story"
port = 7000
"#,
        )
        .unwrap();
        let path = path.display().to_string();

        temp_env::with_vars(
            with_env(&[
                ("JELEASE_CONFIG", path.as_str()),
                ("JELEASE_PROJECT", "ENV"),
                ("JELEASE_DEFAULT_STATUS", "Env Status"),
            ]),
            || {
                let config = Args::try_parse_from(["jelease", "--project", "FLAG"])
                    .unwrap()
                    .into_config()
                    .unwrap();

                assert_eq!(config.issues().project_key(), "FLAG");
                assert_eq!(config.issues().default_status(), "Env Status");
                assert_eq!(config.issues().issue_type(), "Story");
                assert_eq!(config.port(), 7000);
            },
        );
    }

    #[test]
    fn env_file_fills_unset_variables_only() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        fs::write(
            &path,
            "JELEASE_JIRA_URL=https://jira.example.com\n\
             JELEASE_JIRA_USER=bot\n\
             JELEASE_JIRA_TOKEN=secret\n\
             JELEASE_PROJECT=DOTENV\n\
             JELEASE_DEFAULT_STATUS=\"To Do\"\n",
        )
        .unwrap();

        temp_env::with_vars(with_env(&[("JELEASE_PROJECT", "REAL")]), || {
            load_env_file(Some(&path));

            let config = Args::try_parse_from(["jelease"])
                .unwrap()
                .into_config()
                .unwrap();

            assert_eq!(config.issues().project_key(), "REAL");
            assert_eq!(config.jira().user(), "bot");
            assert_eq!(config.issues().default_status(), "To Do");
        });
    }

    #[test]
    fn missing_env_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        temp_env::with_vars(clean_env(), || {
            load_env_file(Some(&temp.path().join(".env")));
            assert!(std::env::var("JELEASE_PROJECT").is_err());
        });
    }

    #[test]
    fn dry_run_accepts_explicit_false() {
        temp_env::with_vars(with_env(&[("JELEASE_DRY_RUN", "true")]), || {
            let mut argv = REQUIRED_FLAGS.to_vec();
            argv.extend(["--dry-run", "false"]);

            let config = Args::try_parse_from(argv).unwrap().into_config().unwrap();

            assert!(!config.issues().dry_run());
        });
    }

    #[test]
    fn missing_required_option_is_reported() {
        temp_env::with_vars(clean_env(), || {
            let result = Args::try_parse_from(["jelease", "--project", "OPS"])
                .unwrap()
                .into_config();

            assert!(matches!(
                result,
                Err(ConfigError::MissingOption { option: "jira-url" })
            ));
        });
    }

    #[test]
    fn invalid_template_is_reported() {
        temp_env::with_vars(clean_env(), || {
            let mut argv = REQUIRED_FLAGS.to_vec();
            argv.extend(["--description-template", "{{unknown}}"]);

            let result = Args::try_parse_from(argv).unwrap().into_config();

            assert!(matches!(result, Err(ConfigError::InvalidTemplate(_))));
        });
    }
}
