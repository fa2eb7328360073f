use {
    anyhow::{Context, Result},
    std::str::FromStr,
    tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter, Layer},
};

pub struct LogOpts {
    pub level: String,
    /// json formatted copy of the logs goes here when non-empty
    pub file: String,
}

/// initializes logging with file+line which sourced the log and log-level filtration,
/// mirroring everything as json into `opts.file` when one is given
pub fn init_log(opts: LogOpts) -> Result<()> {
    let level = tracing::Level::from_str(&opts.level)
        .with_context(|| format!("invalid log level {}", opts.level))?;
    let level_filter = LevelFilter::from_level(level);
    let mut layers = Vec::with_capacity(2);

    layers.push(
        tracing_subscriber::fmt::layer()
            .with_level(true)
            .with_line_number(true)
            .with_file(true)
            .with_filter(EnvFilter::from_default_env().add_directive(level_filter.into()))
            .boxed(),
    );
    if !opts.file.is_empty() {
        let log_file = std::fs::File::options()
            .create(true)
            .append(true)
            .open(&opts.file)
            .with_context(|| format!("failed to open log file {}", opts.file))?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(log_file)
                .with_filter(EnvFilter::from_default_env().add_directive(level_filter.into()))
                .boxed(),
        );
    }
    if let Err(err) = tracing_subscriber::registry().with(layers).try_init() {
        log::warn!("global subscriber already registered {err:#?}");
    }
    Ok(())
}

/// only preserve the log file of the single most recent execution
pub async fn rotate_log_file(log_file: &str) {
    if log_file.is_empty() {
        return;
    }
    if let Ok(true) = tokio::fs::try_exists(log_file).await {
        if let Err(err) = tokio::fs::rename(log_file, format!("{log_file}.old")).await {
            log::error!("failed to rotate log file {err:#?}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_init_log_rejects_bad_level() {
        assert!(init_log(LogOpts {
            level: "loud".to_string(),
            file: String::new(),
        })
        .is_err());
    }

    #[tokio::test]
    async fn test_rotate_log_file() {
        let dir = std::env::temp_dir().join(format!("msig-log-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let file = dir.join("msig.log");
        let file = file.to_str().unwrap();
        tokio::fs::write(file, "previous run").await.unwrap();

        rotate_log_file(file).await;
        assert!(!tokio::fs::try_exists(file).await.unwrap());
        assert_eq!(
            tokio::fs::read_to_string(format!("{file}.old")).await.unwrap(),
            "previous run"
        );
        // nothing to rotate is not an error
        rotate_log_file(file).await;
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
