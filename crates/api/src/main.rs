//! Inkstat - terminal login driver
//!
//! Prints the authorize URL, then reads the redirect URL the browser was
//! sent to (the `npf...://auth#...` address) from stdin and runs the token
//! exchange. `inkstat logout` signs out, `inkstat status` shows the account.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use inkstat_app::{commands, AppContext};
use inkstat_infra::{config, init_tracing};
use tokio::io::{AsyncBufReadExt, BufReader};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load().context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    let ctx = Arc::new(AppContext::new_with_config(config).await?);

    match std::env::args().nth(1).as_deref() {
        None | Some("login") => login(&ctx).await,
        Some("logout") => {
            let was_signed_in = commands::logout(&ctx).await?;
            tracing::info!(was_signed_in, "signed out");
            Ok(())
        }
        Some("status") => {
            let status = commands::current_account(&ctx);
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Some(other) => bail!("unknown command '{other}' (expected login, logout or status)"),
    }
}

async fn login(ctx: &Arc<AppContext>) -> anyhow::Result<()> {
    let url = commands::start_login(ctx)?;
    println!("Open this URL and sign in:\n\n{url}\n");
    println!("Then paste the address the browser was redirected to:");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut started = false;
    while let Some(line) = lines.next_line().await? {
        let response = commands::handle_navigation(ctx, line.trim())?;
        if response.exchange_started {
            started = true;
            break;
        }
        if response.cancel_navigation {
            bail!("redirect did not contain a session_token_code");
        }
        println!("Not the redirect address, try again:");
    }
    if !started {
        commands::cancel_login(ctx);
        bail!("no redirect address received");
    }

    let status = commands::wait_for_login(ctx, LOGIN_TIMEOUT).await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    if let Some(key) = status.message_key {
        bail!("login failed ({key})");
    }
    Ok(())
}
