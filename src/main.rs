use anyhow::Result;
use clap::Parser;
use speedrun::{
    cli::{Cli, Commands},
    commands,
    types::{Config, OutputFmt},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let fmt = OutputFmt::from_flag(cli.json);

    match cli.cmd {
        Commands::Config(cmd) => commands::config::handle(cmd, fmt)?,
        Commands::Template(cmd) => {
            let cfg = Config::load(&Config::default_path()?)?;
            let catalog = commands::catalog(&cfg, cli.templates.as_deref())?;
            commands::template::handle(cmd, &catalog, fmt)?
        }
        Commands::Workout { template, rest } => {
            let cfg = Config::load(&Config::default_path()?)?;
            let catalog = commands::catalog(&cfg, cli.templates.as_deref())?;
            commands::workout::handle(template, rest, &catalog, cfg.session_defaults()?, fmt).await?
        }
    }

    Ok(())
}
