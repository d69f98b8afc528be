use std::path::Path;

use config::{Config, File, FileFormat};
use eyre::{Context, Result, eyre};

use crate::config::models::ExplorerConfig;

/// Read an [`ExplorerConfig`]; the format follows the file extension and
/// defaults to TOML.
pub async fn load_config(config_path: &str) -> Result<ExplorerConfig> {
    load_config_sync(config_path)
}

pub fn load_config_sync(config_path: &str) -> Result<ExplorerConfig> {
    let path = Path::new(config_path);
    let name = path
        .to_str()
        .ok_or_else(|| eyre!("Config path is not UTF-8: {}", path.display()))?;

    Config::builder()
        .add_source(File::new(name, format_of(path)))
        .build()
        .and_then(Config::try_deserialize::<ExplorerConfig>)
        .wrap_err_with(|| format!("Cannot load explorer config from {}", path.display()))
}

fn format_of(path: &Path) -> FileFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        _ => FileFormat::Toml,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[tokio::test]
    async fn test_load_toml_config() {
        let toml_content = r#"
listen_addr = "0.0.0.0:8899"
access_list_path = "/etc/explorer/acl.txt"
whitelist = ["10.0.0.1"]

[amount]
decimal_places = 6

[upstream]
url = "http://127.0.0.1:10000"
timeout_secs = 5
"#;

        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8899");
        assert_eq!(
            config.access_list_path.as_deref(),
            Some(Path::new("/etc/explorer/acl.txt"))
        );
        assert_eq!(config.whitelist, vec!["10.0.0.1".to_string()]);
        assert_eq!(config.amount.decimal_places, 6);
        assert_eq!(config.native_asset.label, "Beam");
        assert_eq!(config.upstream.unwrap().timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_load_yaml_config() {
        let yaml_content = r#"
listen_addr: "127.0.0.1:3000"
native_asset:
  id: 0
  label: "Groth"
logging:
  level: debug
  json: true
"#;

        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.native_asset.label, "Groth");
        assert!(config.logging.json);
        assert_eq!(config.restart_interval_ms, 1000);
    }

    #[tokio::test]
    async fn test_load_json_config() {
        let json_content = r#"
{
  "listen_addr": "127.0.0.1:3000",
  "acl_refresh_interval_ms": 250
}
"#;

        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, "{}", json_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.acl_refresh_interval_ms, 250);
        assert!(config.access_list_path.is_none());
    }

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(format_of(Path::new("a.yml")), FileFormat::Yaml);
        assert_eq!(format_of(Path::new("a.json")), FileFormat::Json);
        assert_eq!(format_of(Path::new("a.toml")), FileFormat::Toml);
        assert_eq!(format_of(Path::new("explorer")), FileFormat::Toml);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        assert!(load_config("/nonexistent/explorer.toml").await.is_err());
    }
}
