//! Mock-data mode commands.
//!
//! These mirror the test hooks the dashboard exposes: flip a mock-data
//! flag plus a fake confirmed identity in a local state file. No
//! server interaction.

use cf_domain::config::Config;
use cf_store::mock::{KEY_AUTH_CONFIRMED, KEY_AUTH_TIMESTAMP, KEY_USER_EMAIL};
use cf_store::MockDataStore;

use super::MockCommand;

pub fn run(config: &Config, command: MockCommand) -> anyhow::Result<()> {
    let store = MockDataStore::new(&config.mock.state_path);

    match command {
        MockCommand::Enable { email } => {
            store.enable(&email)?;
            println!("Mock data mode enabled for {email}");
        }
        MockCommand::Disable => {
            store.disable()?;
            println!("Mock data mode disabled");
        }
        MockCommand::Show => {
            println!("path: {}", store.path().display());
            println!("enabled: {}", store.is_enabled());
            for key in [KEY_AUTH_CONFIRMED, KEY_USER_EMAIL, KEY_AUTH_TIMESTAMP] {
                if let Some(value) = store.get(key) {
                    println!("{key}: {value}");
                }
            }
        }
    }

    Ok(())
}
