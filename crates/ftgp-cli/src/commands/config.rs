use anyhow::{Result, bail};
use colored::Colorize;
use ftgp_core::config::FtgpConfig;
use ftgp_infrastructure::ConfigService;

pub fn show(service: &ConfigService) -> Result<()> {
    let config = service.get_config()?;
    println!(
        "{}",
        format!("# {}", service.path().display()).bright_black()
    );
    print!("{}", config.to_toml_string()?);
    Ok(())
}

pub fn init(service: &ConfigService, force: bool) -> Result<()> {
    if service.path().exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            service.path().display()
        );
    }
    service.save(&FtgpConfig::default())?;
    println!(
        "{}",
        format!("Wrote default config to {}", service.path().display()).bright_green()
    );
    Ok(())
}
