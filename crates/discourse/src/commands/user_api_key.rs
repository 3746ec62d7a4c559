//! User API key command - generate, decrypt and revoke delegated keys.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use console::Style;
use discourse_client::{DecryptedUserApiKey, UserApiKeyLink, UserApiKeyParams};
use serde_json::json;

use super::Context;

/// Arguments for the user-api-key command.
#[derive(Args, Debug)]
pub struct UserApiKeyArgs {
    #[command(subcommand)]
    pub command: UserApiKeyCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserApiKeyCommand {
    /// Build an authorization URL (and a keypair unless one is given)
    Generate(GenerateArgs),

    /// Decrypt the payload returned after authorization
    Decrypt(DecryptArgs),

    /// Interactive handshake: print the URL, read the payload, print the key
    Login(RequestArgs),

    /// Revoke a user API key (defaults to the configured one)
    Revoke {
        /// Key to revoke
        key: Option<String>,
    },
}

/// Parameters of the authorization request.
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Application name shown to the user
    #[arg(long)]
    pub application_name: Option<String>,

    /// Comma-separated scopes (default: read)
    #[arg(long)]
    pub scopes: Option<String>,

    /// Client id the key is issued to
    #[arg(long)]
    pub client_id: Option<String>,

    /// URL the site redirects to with the payload
    #[arg(long)]
    pub auth_redirect: Option<String>,

    /// URL for push notifications
    #[arg(long)]
    pub push_url: Option<String>,
}

impl RequestArgs {
    fn params(&self) -> UserApiKeyParams {
        UserApiKeyParams {
            application_name: self.application_name.clone(),
            scopes: self.scopes.clone(),
            client_id: self.client_id.clone(),
            public_key: None,
            auth_redirect: self.auth_redirect.clone(),
            push_url: self.push_url.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Use this PEM public key instead of generating a keypair
    #[arg(long)]
    pub public_key_file: Option<PathBuf>,

    /// Write the generated private key here instead of printing it
    #[arg(long)]
    pub private_key_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// PEM private key matching the public key in the authorization URL
    #[arg(long)]
    pub private_key_file: PathBuf,

    /// Refuse the payload unless it carries this nonce
    #[arg(long)]
    pub nonce: Option<String>,

    /// Base64 payload (read from stdin when omitted)
    pub payload: Option<String>,
}

/// Run the user-api-key command.
pub async fn run(args: UserApiKeyArgs, ctx: &Context) -> Result<()> {
    match args.command {
        UserApiKeyCommand::Generate(args) => cmd_generate(args, ctx).await,
        UserApiKeyCommand::Decrypt(args) => cmd_decrypt(args, ctx),
        UserApiKeyCommand::Login(args) => cmd_login(args, ctx).await,
        UserApiKeyCommand::Revoke { key } => cmd_revoke(key, ctx).await,
    }
}

async fn cmd_generate(args: GenerateArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    let mut params = args.request.params();
    if let Some(path) = &args.public_key_file {
        let pem = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read public key {}", path.display()))?;
        params.public_key = Some(pem);
    }

    let mut link = client.generate_user_api_key_async(params).await?;

    if let (Some(path), Some(private_key)) = (&args.private_key_out, &link.private_key) {
        std::fs::write(path, private_key)
            .with_context(|| format!("Failed to write private key {}", path.display()))?;
        link.private_key = None;
        if !ctx.json_output {
            eprintln!("Private key written to {}", path.display());
        }
    }

    print_link(&link, ctx.json_output)
}

fn print_link(link: &UserApiKeyLink, json_output: bool) -> Result<()> {
    if json_output {
        let output = json!({
            "url": link.url,
            "nonce": link.nonce,
            "public_key": link.public_key,
            "private_key": link.private_key,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", dim.apply_to("Authorization URL:"));
    println!("  {}", link.url);
    println!();
    println!("{} {}", dim.apply_to("Nonce:"), link.nonce);
    if let Some(private_key) = &link.private_key {
        println!();
        println!("{}", dim.apply_to("Private key (keep it secret):"));
        print!("{}", private_key);
    }
    Ok(())
}

fn cmd_decrypt(args: DecryptArgs, ctx: &Context) -> Result<()> {
    let private_key = std::fs::read_to_string(&args.private_key_file).with_context(|| {
        format!(
            "Failed to read private key {}",
            args.private_key_file.display()
        )
    })?;

    let payload = match args.payload {
        Some(payload) => payload,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let decrypted = discourse_client::decrypt_user_api_key(&private_key, &extract_payload(&payload))?;
    if let Some(nonce) = &args.nonce {
        check_nonce(&decrypted, nonce)?;
    }

    print_decrypted(&decrypted, ctx.json_output)
}

async fn cmd_login(args: RequestArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let link = client.generate_user_api_key_async(args.params()).await?;
    let private_key = link
        .private_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No private key was generated"))?;

    println!("Discourse User API Key");
    println!("======================");
    println!();
    println!("Open this URL in your browser and approve the request:");
    println!();
    println!("  {}", link.url);
    println!();
    println!("Paste the payload (or the full redirect URL) here:");
    println!();

    print!("payload> ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        println!("No input provided, aborting.");
        return Ok(());
    }

    let decrypted = client.decrypt_user_api_key(private_key, &extract_payload(input))?;
    check_nonce(&decrypted, &link.nonce)?;

    println!();
    print_decrypted(&decrypted, ctx.json_output)?;
    if !ctx.json_output {
        println!();
        println!("Use it with:");
        println!("  export DISCOURSE_USER_API_KEY={}", decrypted.key);
    }
    Ok(())
}

async fn cmd_revoke(key: Option<String>, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let response = client.revoke_user_api_key(key.as_deref()).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("User API key revoked.");
    }
    Ok(())
}

fn check_nonce(decrypted: &DecryptedUserApiKey, nonce: &str) -> Result<()> {
    if !decrypted.nonce_matches(nonce) {
        bail!("Nonce mismatch: the payload does not answer this authorization request");
    }
    Ok(())
}

fn print_decrypted(decrypted: &DecryptedUserApiKey, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(decrypted)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{} {}", dim.apply_to("Key:"), decrypted.key);
    println!("{} {}", dim.apply_to("Nonce:"), decrypted.nonce);
    println!("{} {}", dim.apply_to("Push:"), decrypted.push);
    if let Some(api) = &decrypted.api {
        println!("{} {}", dim.apply_to("API:"), serde_json::to_string(api)?);
    }
    Ok(())
}

/// Accept either the bare payload or a redirect URL carrying `payload=`.
fn extract_payload(input: &str) -> String {
    let input = input.trim();
    if let Ok(url) = url::Url::parse(input)
        && let Some((_, payload)) = url.query_pairs().find(|(k, _)| k == "payload")
    {
        return payload.into_owned();
    }
    input.to_string()
}
