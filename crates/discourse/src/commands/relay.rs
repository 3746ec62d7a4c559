//! Relay command - receive webhook deliveries.

use std::net::SocketAddr;

use anyhow::Result;
use clap::Args;
use discourse_webhook::{ALL_EVENT, WebhookConfig, WebhookDispatcher, WebhookServer};

use super::Context;

/// Arguments for the relay command.
#[derive(Args, Debug)]
pub struct RelayArgs {
    /// Address to listen on
    #[arg(long, env = "DISCOURSE_WEBHOOK_BIND", default_value = "0.0.0.0:80")]
    pub bind: SocketAddr,

    /// Path that accepts deliveries (repeatable, default /webhook)
    #[arg(long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// Allow cross-origin requests
    #[arg(long)]
    pub cors: bool,
}

impl RelayArgs {
    fn config(&self) -> WebhookConfig {
        let mut config = WebhookConfig::new(self.bind).with_cors(self.cors);
        if !self.paths.is_empty() {
            config = config.with_paths(self.paths.iter().cloned());
        }
        config
    }
}

/// Run the relay command.
pub async fn run(args: RelayArgs, _ctx: &Context) -> Result<()> {
    let dispatcher = WebhookDispatcher::new();
    dispatcher.on(ALL_EVENT, |payload, _res| {
        let events: Vec<&str> = payload
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default();
        tracing::info!(events = ?events, "Webhook delivery");
        Ok(())
    });

    let server = WebhookServer::new(args.config(), dispatcher);
    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_args() {
        let args = RelayArgs {
            bind: "127.0.0.1:9000".parse().unwrap(),
            paths: vec![],
            cors: false,
        };
        let config = args.config();
        assert_eq!(config.paths, vec!["/webhook".to_string()]);
        assert_eq!(config.bind_addr.port(), 9000);

        let args = RelayArgs {
            bind: "127.0.0.1:9000".parse().unwrap(),
            paths: vec!["/a".into(), "/b".into()],
            cors: true,
        };
        let config = args.config();
        assert_eq!(config.paths, vec!["/a".to_string(), "/b".to_string()]);
        assert!(config.enable_cors);
    }
}
