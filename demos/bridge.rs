// SPDX-License-Identifier: MPL-2.0

//! Bridge demo.
//!
//! Loads a platform config, exposes every lock of the account and prints
//! accessory events until interrupted.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example bridge -- <config.json> [lock|unlock <lock_id>]
//! ```
//!
//! The config file holds the platform block of the host config:
//!
//! ```json
//! {
//!     "name": "August",
//!     "credentials": {
//!         "augustId": "me@example.com",
//!         "password": "secret",
//!         "installId": "7c9e2a3f-0000-4000-8000-000000000000",
//!         "accessToken": "..."
//!     },
//!     "options": {"refreshRate": 1800, "logging": "debug"}
//! }
//! ```
//!
//! Per-lock verbosity follows the `logging` option; the subscriber itself
//! prints everything at `debug` and above.

use std::env;
use std::sync::Arc;

use august_bridge::config::PlatformConfig;
use august_bridge::event::AccessoryEvent;
use august_bridge::platform::Platform;
use august_bridge::protocol::{ApiConfig, HttpClient};
use august_bridge::types::{LockId, LockTargetState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let command = match (args.get(2).map(String::as_str), args.get(3)) {
        (None, _) => None,
        (Some("lock"), Some(id)) => Some((LockId::new(id.as_str()), LockTargetState::Secured)),
        (Some("unlock"), Some(id)) => Some((LockId::new(id.as_str()), LockTargetState::Unsecured)),
        _ => {
            print_usage(&args[0]);
            std::process::exit(1);
        }
    };

    let raw = std::fs::read_to_string(&args[1])?;
    let config: PlatformConfig = serde_json::from_str(&raw)?;
    let verified = config.verify()?;
    let credentials = &verified.credentials;

    let mut api_config = ApiConfig::new();
    if let Some(key) = &credentials.api_key {
        api_config = api_config.with_api_key(key);
    }
    if let Some(key) = &credentials.pn_sub_key {
        api_config = api_config.with_pubnub_subscribe_key(key);
    }
    if let Some(token) = &credentials.access_token {
        api_config = api_config.with_access_token(token);
    }
    let api = HttpClient::new(api_config)?;

    if credentials.access_token.is_none() {
        let install_id = credentials
            .install_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        println!("Opening session with install ID {install_id}");
        api.start_session(
            &install_id,
            credentials.august_id.as_deref().unwrap_or_default(),
            credentials.password.as_deref().unwrap_or_default(),
        )
        .await?;
    }

    let platform = Platform::new(config, Arc::new(api))?;
    let mut events = platform.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            print_event(&event);
        }
    });

    let count = platform.discover_devices().await?;
    println!("{count} lock(s) exposed");

    if let Some((lock_id, target)) = command {
        match platform.accessory(&lock_id).await {
            Some(accessory) => accessory.set_lock_target_state(target)?,
            None => eprintln!("No accessory for lock {lock_id}"),
        }
    }

    tokio::signal::ctrl_c().await?;
    for cached in platform.cache_snapshot().await {
        println!("{}", serde_json::to_string(&cached)?);
    }
    platform.shutdown().await;
    Ok(())
}

fn print_event(event: &AccessoryEvent) {
    match event {
        AccessoryEvent::AccessoryAdded {
            lock_id,
            name,
            external,
        } => println!("+ {name} ({lock_id}) external={external}"),
        AccessoryEvent::AccessoryRestored { lock_id, name } => {
            println!("~ {name} ({lock_id}) restored");
        }
        AccessoryEvent::AccessoryRemoved { lock_id, name } => {
            println!("- {name} ({lock_id}) removed");
        }
        AccessoryEvent::StateChanged {
            lock_id, new_state, ..
        } => println!(
            "{lock_id}: current={} target={} contact={} battery={}%",
            new_state.lock_current().hap_value(),
            new_state.lock_target().hap_value(),
            new_state.contact().hap_value(),
            new_state.battery().value()
        ),
        AccessoryEvent::TransitionLogged { name, verb, .. } => println!("{name} was {verb}"),
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {program} <config.json> [lock|unlock <lock_id>]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} august.json");
    eprintln!("  {program} august.json unlock 7EDFD6A4");
}
