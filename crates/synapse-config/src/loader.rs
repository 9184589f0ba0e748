use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let mut config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;
        config.normalize();

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the vision backend settings are unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_vision_backend()?;
        self.validate_filter_rules()?;
        self.validate_health()?;
        Ok(())
    }

    fn validate_vision_backend(&self) -> anyhow::Result<()> {
        let vision = &self.vision;

        if vision.model.trim().is_empty() {
            anyhow::bail!("vision.model must not be empty");
        }

        if !matches!(vision.base_url.scheme(), "http" | "https") {
            anyhow::bail!("vision.base_url must use http or https, got '{}'", vision.base_url.scheme());
        }

        if vision.timeout.is_zero() {
            anyhow::bail!("vision.timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_filter_rules(&self) -> anyhow::Result<()> {
        let vision = &self.vision;

        for ext in &vision.allowed_image_extensions {
            if ext.len() < 2 || !ext.starts_with('.') {
                anyhow::bail!("vision.allowed_image_extensions entry '{ext}' must start with '.'");
            }
        }

        if vision.pipelines.is_empty() {
            anyhow::bail!("vision.pipelines must list at least one model id or \"*\"");
        }

        Ok(())
    }

    fn validate_health(&self) -> anyhow::Result<()> {
        let health = &self.server.health;
        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }
        Ok(())
    }

    /// Lowercase image extensions so detection can compare against a lowercased URL
    fn normalize(&mut self) {
        for ext in &mut self.vision.allowed_image_extensions {
            *ext = ext.to_lowercase();
        }
    }
}
