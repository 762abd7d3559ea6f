use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use outpost_config::DestinationConfig;

/// Default location of a destination's config inside the data directory.
pub fn config_path(data_dir: &Path, slug: &str) -> PathBuf {
  data_dir.join("destinations").join(format!("{slug}.json"))
}

/// Load a destination config.
///
/// An explicit `--config` file wins; otherwise the config is looked up by
/// destination slug under `<data-dir>/destinations/`.
pub async fn load_config(
  file: Option<&Path>,
  destination: Option<&str>,
  data_dir: &Path,
) -> Result<DestinationConfig> {
  let path = match (file, destination) {
    (Some(file), _) => file.to_path_buf(),
    (None, Some(slug)) => config_path(data_dir, slug),
    (None, None) => bail!("either --config or --destination is required"),
  };

  let content = tokio::fs::read_to_string(&path)
    .await
    .with_context(|| format!("failed to read config file: {}", path.display()))?;

  let config: DestinationConfig = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))?;

  if let Some(slug) = destination
    && slug != config.destination
  {
    bail!(
      "config file {} is for '{}', not '{}'",
      path.display(),
      config.destination,
      slug
    );
  }

  Ok(config)
}
