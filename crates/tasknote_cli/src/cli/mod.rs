use clap::{Parser, Subcommand};
use tasknote_core::config::{ConfigOverrides, canonicalize_key};
use tasknote_core::model::TaskId;

#[derive(Parser, Debug)]
#[command(author, version, about = "Notes and tasks client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    ///
    /// Example: tasknote register alice alice@example.com password123
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Log in and keep the access token
    ///
    /// Example: tasknote login alice password123
    Login { username: String, password: String },
    /// Forget the stored access token
    Logout,
    /// Show whether a token is stored and which backend is configured
    Status,
    /// List notes for a filter: all, today, overdue, upcoming or upcoming:N
    ///
    /// Example: tasknote list overdue
    List { filter: Option<String> },
    /// Show completion statistics
    Stats,
    /// Add a note
    ///
    /// Example: tasknote add "Buy milk" -d "2 litres" --due 2026-10-20
    /// Example: tasknote add --draft "call the dentist tomorrow"
    Add {
        title: Option<String>,
        #[arg(short = 'd', long = "description", value_name = "TEXT")]
        description: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,
        /// Let the assistant fill in the fields from free text
        #[arg(long, value_name = "TEXT")]
        draft: Option<String>,
    },
    /// Edit a note's title, description or due date
    ///
    /// Example: tasknote edit 3 "Buy oat milk" --due 2026-10-21
    Edit {
        id: TaskId,
        title: String,
        #[arg(short = 'd', long = "description", value_name = "TEXT")]
        description: Option<String>,
        /// New due date; pass an empty value (--due "") to clear it
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,
    },
    /// Mark a note as completed
    ///
    /// Example: tasknote done 3
    Done { id: TaskId },
    /// Mark a completed note as pending again
    Reopen { id: TaskId },
    /// Delete a note
    ///
    /// Example: tasknote delete 3 --yes
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Chat with the assistant (type /reset to clear, exit to leave)
    Assistant,
    /// Ask the assistant for a summary of your notes
    Summary,
    /// Ask the assistant for a plan for today
    Plan,
    /// Ask the assistant which notes to tackle first
    Priorities,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    ApiUrl,
    Theme,
    UpcomingDays,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonicalize_key(key_raw);
    let target = match key.as_str() {
        "" => return Err("override key cannot be empty".to_string()),
        "api_url" | "url" => ConfigOverrideTarget::ApiUrl,
        "theme" => ConfigOverrideTarget::Theme,
        "upcoming_days" => ConfigOverrideTarget::UpcomingDays,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

/// Folds every `--config-override` into one set; later values win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::ApiUrl => overrides.api_url = Some(parsed.value),
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::UpcomingDays => {
                let days = parsed
                    .value
                    .parse::<u32>()
                    .map_err(|_| format!("upcoming_days must be a number: {}", parsed.value))?;
                overrides.upcoming_days = Some(days);
            }
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ConfigOverrideTarget, collect_overrides, parse_config_override};
    use clap::Parser;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" API-URL = http://localhost:9000 ").unwrap();

        assert_eq!(parsed.target, ConfigOverrideTarget::ApiUrl);
        assert_eq!(parsed.value, "http://localhost:9000");
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("aliases.ls=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("theme").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn collect_overrides_keeps_last_value() {
        let overrides = collect_overrides(&[
            "theme=noir".to_string(),
            "upcoming_days=3".to_string(),
            "theme=solarized".to_string(),
        ])
        .unwrap();

        assert_eq!(overrides.theme.as_deref(), Some("solarized"));
        assert_eq!(overrides.upcoming_days, Some(3));
        assert_eq!(overrides.api_url, None);
    }

    #[test]
    fn collect_overrides_rejects_non_numeric_days() {
        let err = collect_overrides(&["upcoming_days=soon".to_string()]).unwrap_err();
        assert!(err.contains("must be a number"));
    }

    #[test]
    fn add_accepts_description_and_due_flags() {
        let cli = Cli::try_parse_from([
            "tasknote", "add", "Buy milk", "-d", "2 litres", "--due", "2026-10-20", "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Add {
                title,
                description,
                due,
                draft,
            } => {
                assert_eq!(title.as_deref(), Some("Buy milk"));
                assert_eq!(description.as_deref(), Some("2 litres"));
                assert_eq!(due.as_deref(), Some("2026-10-20"));
                assert!(draft.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn delete_requires_numeric_id() {
        assert!(Cli::try_parse_from(["tasknote", "delete", "abc"]).is_err());
        assert!(Cli::try_parse_from(["tasknote", "delete", "4", "--yes"]).is_ok());
    }
}
