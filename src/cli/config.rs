use anyhow::Result;

use photo_relay::config::Config;

pub fn run() -> Result<()> {
    match Config::from_env() {
        Ok(config) => {
            println!("Configuration OK");
            for (key, value) in config.redacted_summary() {
                println!("  {:<32} {}", key, value);
            }
            Ok(())
        }
        Err(e) => {
            for key in e.missing_keys() {
                println!("  {:<32} (missing)", key);
            }
            Err(e.into())
        }
    }
}
