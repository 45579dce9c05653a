//! Bookline - session tooling
//!
//! Inspects the persisted session from the command line:
//! - `bookline status`: restore the session from stored tokens
//! - `bookline authorize-url`: issue an OAuth state and print the provider URL
//! - `bookline server-session <cookie>`: resolve a session from a cookie header

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use bookline_common::PersistentStore;
use bookline_core::{ClientBootstrapper, SessionBootstrapper, SessionStore, StateGuard, TokenStore};
use bookline_infra::{config, ApiGateway, AuthApi, FileStore};
use bookline_lib::{bootstrap_server_session, init_tracing, LogFormat};

const DEFAULT_STORE_PATH: &str = ".bookline/session.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = std::env::var("BOOKLINE_LOG_FORMAT")
        .ok()
        .and_then(|raw| raw.parse::<LogFormat>().ok())
        .unwrap_or_default();
    init_tracing(format);

    let config = config::load_or_default();
    let store_path = std::env::var("BOOKLINE_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH));

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "status".to_string());

    match command.as_str() {
        "status" => {
            let store = open_store(&store_path)?;
            let tokens = TokenStore::new(store);
            let session = SessionStore::new();
            let gateway = ApiGateway::new(&config.api, tokens.clone(), Arc::new(session.clone()))?;
            let auth = Arc::new(AuthApi::new(gateway));

            let restored = ClientBootstrapper::new(tokens, auth, session).bootstrap().await;
            println!("{}", serde_json::to_string_pretty(&restored)?);
        }
        "authorize-url" => {
            let guard = StateGuard::new(open_store(&store_path)?);
            println!("{}", guard.authorization_url(&config)?);
        }
        "server-session" => {
            let cookie = args.next();
            let session = bootstrap_server_session(&config, cookie.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        other => bail!("unknown command: {other} (expected status, authorize-url or server-session)"),
    }

    Ok(())
}

fn open_store(path: &Path) -> anyhow::Result<Arc<dyn PersistentStore>> {
    let store = FileStore::open(path)
        .with_context(|| format!("failed to open session store at {}", path.display()))?;
    Ok(Arc::new(store))
}
