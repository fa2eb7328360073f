use msig::config::Config;

pub async fn new_config(config_path: &str) -> anyhow::Result<()> {
    Config::default().save(config_path).await?;
    log::info!("wrote default config to {config_path}");
    Ok(())
}
