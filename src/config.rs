// Process configuration, loaded once from the environment at startup.
// Missing or malformed required values abort the process.

use anyhow::{bail, Context, Result};
use std::str::FromStr;

/// Which of the two cooperating processes this invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Watch source channels, relay posts into the moderation chat.
    Relay,
    /// Fan posts out to approvers and execute their decisions.
    Moderator,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relay" => Ok(Mode::Relay),
            "moderator" => Ok(Mode::Moderator),
            other => bail!("unknown mode {:?}, expected \"relay\" or \"moderator\"", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token for this process's own bot.
    pub bot_token: String,
    /// Identities allowed to approve/reject pending posts.
    pub approver_ids: Vec<i64>,
    /// Destination channels, in publish order.
    pub target_channels: Vec<String>,
    /// Channels the relay watches.
    pub source_channel_ids: Vec<i64>,
    /// Numeric identity of the counterpart relay process.
    pub relay_bot_id: i64,
    /// The moderation endpoint both processes meet at.
    pub moderation_chat_id: i64,
}

impl Config {
    pub fn from_env(mode: Mode) -> Result<Self> {
        let bot_token = match mode {
            Mode::Relay => required_var("RELAY_BOT_TOKEN")?,
            Mode::Moderator => required_var("BOT_TOKEN")?,
        };

        let moderation_chat_id = required_var("MODERATION_CHAT_ID")?
            .parse()
            .context("MODERATION_CHAT_ID must be a numeric chat id")?;

        let mut config = Self {
            bot_token,
            approver_ids: Vec::new(),
            target_channels: Vec::new(),
            source_channel_ids: Vec::new(),
            relay_bot_id: 0,
            moderation_chat_id,
        };

        match mode {
            Mode::Relay => {
                config.source_channel_ids = parse_id_list(&required_var("SOURCE_CHANNEL_IDS")?)
                    .context("SOURCE_CHANNEL_IDS must be a comma-separated list of chat ids")?;
                if config.source_channel_ids.is_empty() {
                    bail!("SOURCE_CHANNEL_IDS must name at least one channel");
                }
            }
            Mode::Moderator => {
                config.approver_ids = parse_id_list(&required_var("ADMIN_IDS")?)
                    .context("ADMIN_IDS must be a comma-separated list of user ids")?;
                if config.approver_ids.is_empty() {
                    bail!("ADMIN_IDS must name at least one approver");
                }
                config.target_channels =
                    parse_channel_list(&required_var("TARGET_CHANNEL_USERNAMES")?);
                if config.target_channels.is_empty() {
                    bail!("TARGET_CHANNEL_USERNAMES must name at least one channel");
                }
                config.relay_bot_id = required_var("RELAY_BOT_ID")?
                    .parse()
                    .context("RELAY_BOT_ID must be a numeric user id")?;
            }
        }

        Ok(config)
    }
}

fn required_var(key: &str) -> Result<String> {
    let value =
        std::env::var(key).with_context(|| format!("missing required environment variable {}", key))?;
    if value.trim().is_empty() {
        bail!("environment variable {} is empty", key);
    }
    Ok(value)
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .with_context(|| format!("invalid id {:?}", part))
        })
        .collect()
}

fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_parses_with_whitespace() {
        let ids = parse_id_list(" 1, -1002, 3 ").unwrap();
        assert_eq!(ids, vec![1, -1002, 3]);
    }

    #[test]
    fn id_list_rejects_garbage() {
        assert!(parse_id_list("1,abc").is_err());
    }

    #[test]
    fn channel_list_trims_and_drops_empties() {
        let channels = parse_channel_list("@a, ,@b,");
        assert_eq!(channels, vec!["@a".to_string(), "@b".to_string()]);
    }

    #[test]
    fn mode_parses_known_values_only() {
        assert_eq!("relay".parse::<Mode>().unwrap(), Mode::Relay);
        assert_eq!("moderator".parse::<Mode>().unwrap(), Mode::Moderator);
        assert!("both".parse::<Mode>().is_err());
    }
}
