use {
    anyhow::{anyhow, Context, Result},
    solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey},
    std::str::FromStr,
};

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub rpc_url: String,
    /// `~` expands to $HOME
    pub keypair_path: String,
    /// cluster name used for explorer links
    pub cluster: String,
    pub program_id: String,
    pub commitment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            keypair_path: "~/.config/solana/id.json".to_string(),
            cluster: "devnet".to_string(),
            program_id: multisig_sdk::ID.to_string(),
            commitment: "confirmed".to_string(),
        }
    }
}

impl Config {
    pub async fn load(path: &str) -> Result<Self> {
        serde_yaml::from_str(
            &tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read config {path}"))?,
        )
        .with_context(|| "failed to deserialize config")
    }

    pub async fn save(&self, path: &str) -> Result<()> {
        tokio::fs::write(
            path,
            serde_yaml::to_string(self).with_context(|| "failed to serialize config")?,
        )
        .await
        .with_context(|| "failed to write config")
    }

    /// applies the --url and --keypair flags
    pub fn with_overrides(mut self, url: Option<String>, keypair: Option<String>) -> Self {
        if let Some(url) = url {
            self.rpc_url = url;
        }
        if let Some(keypair) = keypair {
            self.keypair_path = keypair;
        }
        self
    }

    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.program_id)
            .with_context(|| format!("invalid program id {}", self.program_id))
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|err| anyhow!("invalid commitment {}: {err}", self.commitment))
    }

    pub fn keypair_path(&self) -> String {
        match (self.keypair_path.strip_prefix("~/"), std::env::var("HOME")) {
            (Some(rest), Ok(home)) => format!("{home}/{rest}"),
            _ => self.keypair_path.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_save_load() {
        let path = std::env::temp_dir().join(format!("msig-config-{}.yaml", std::process::id()));
        let path = path.to_str().unwrap();
        let cfg = Config {
            cluster: "mainnet-beta".to_string(),
            ..Default::default()
        };
        cfg.save(path).await.unwrap();
        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded, cfg);
        tokio::fs::remove_file(path).await.unwrap();

        assert!(Config::load(path).await.is_err());
    }

    #[test]
    fn test_defaults_parse() {
        let cfg = Config::default();
        assert_eq!(cfg.program_id().unwrap(), multisig_sdk::ID);
        assert_eq!(cfg.commitment().unwrap(), CommitmentConfig::confirmed());
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::default().with_overrides(Some("http://localhost:8899".to_string()), None);
        assert_eq!(cfg.rpc_url, "http://localhost:8899");
        assert_eq!(cfg.keypair_path, Config::default().keypair_path);

        let cfg = cfg.with_overrides(None, Some("/tmp/id.json".to_string()));
        assert_eq!(cfg.keypair_path(), "/tmp/id.json");
    }

    #[test]
    fn test_invalid_fields() {
        let cfg = Config {
            program_id: "not a key".to_string(),
            commitment: "eventually".to_string(),
            ..Default::default()
        };
        assert!(cfg.program_id().is_err());
        assert!(cfg.commitment().is_err());
    }
}
