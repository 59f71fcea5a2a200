use crate::{
    cli::ConfigCmd,
    types::{Config, KNOWN_KEYS, OutputFmt, emit},
};
use anyhow::Result;
use colored::Colorize;

pub fn handle(cmd: ConfigCmd, fmt: OutputFmt) -> Result<()> {
    let config_path = Config::default_path()?;
    let mut cfg = Config::load(&config_path)?;

    match cmd {
        ConfigCmd::List => {
            emit(fmt, &cfg, || {
                if cfg.map.is_empty() {
                    println!("{}", "(no config set)".dimmed());
                } else {
                    println!("{}", "Config:".cyan().bold());
                    for (k, v) in &cfg.map {
                        println!("  {} = {}", k.green(), v);
                    }
                }
            })?;
        }

        ConfigCmd::Get { key } => match cfg.map.get(&key) {
            Some(val) => println!("{}", val),
            None => println!("{} key `{}` not found", "warning:".yellow().bold(), key),
        },

        ConfigCmd::Set { key, val } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                println!(
                    "{} `{}` is not a recognised key ({})",
                    "warning:".yellow().bold(),
                    key,
                    KNOWN_KEYS.join(", ")
                );
            }

            cfg.map.insert(key.clone(), val.clone());
            // Refuse values the session loader would choke on later.
            if let Err(e) = cfg.session_defaults() {
                println!("{} {:#}", "error:".red().bold(), e);
                return Ok(());
            }

            cfg.save(&config_path)?;
            println!("{} set `{}` = `{}`", "info:".blue().bold(), key.green(), val);
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(&config_path)?;
                println!("{} removed `{}`", "info:".blue().bold(), key.green());
            } else {
                println!("{} key `{}` not found", "warning:".yellow().bold(), key);
            }
        }
    }

    Ok(())
}
