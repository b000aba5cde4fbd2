//! Deployment configuration for the game and its collaborators.
//!
//! The canonical configuration lives in `investor-config.yaml` at the
//! project root. Currency values in the file are whole tokens; they are
//! scaled to base units by `10^currency.decimals` when the game rules are
//! built. Every field has a default, so an empty file is a valid
//! configuration.
//!
//! Unknown top-level sections (such as the simulation driver's
//! `simulation` block) are ignored here.

use std::path::Path;

use serde::Deserialize;

use investor_ledger::{CredentialMetadata, CurrencyMetadata};
use investor_types::{Amount, MAX_DECIMALS, PropertyType, to_base_units};

use crate::catalog::{CatalogError, PropertyCatalog, PropertyTerms};
use crate::game::GameRules;

/// Environment variable that replaces `credential.base_uri`.
pub const BASE_URI_ENV: &str = "INVESTOR_CREDENTIAL_BASE_URI";

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The property table is unusable.
    #[error("invalid property catalog: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },

    /// A value is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level deployment configuration.
///
/// Mirrors the structure of `investor-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Fungible currency parameters.
    #[serde(default)]
    pub currency: CurrencyConfig,

    /// Credential collection parameters.
    #[serde(default)]
    pub credential: CredentialConfig,

    /// Registration and accrual rules.
    #[serde(default)]
    pub game: RulesConfig,

    /// Per-type property terms.
    #[serde(default)]
    pub properties: PropertiesConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `INVESTOR_CREDENTIAL_BASE_URI` overrides `credential.base_uri`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.credential.apply_env_overrides();
        Ok(config)
    }

    /// Check every value that could make deployment fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] or [`ConfigError::Catalog`]
    /// describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let supply = self.initial_supply()?;
        if supply == 0 {
            return Err(invalid("currency.initial_supply must be positive"));
        }
        let rules = self.rules()?;
        if rules.welcome_grant > supply {
            return Err(invalid("game.welcome_grant exceeds currency.initial_supply"));
        }
        Ok(())
    }

    /// Total currency supply in base units.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the supply cannot be scaled.
    pub fn initial_supply(&self) -> Result<Amount, ConfigError> {
        self.scale(self.currency.initial_supply, "currency.initial_supply")
    }

    /// Build the game rules, scaling whole-token values to base units.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value cannot be scaled, or
    /// [`ConfigError::Catalog`] if the property table is unusable.
    pub fn rules(&self) -> Result<GameRules, ConfigError> {
        let mut entries = Vec::new();
        for (property, terms) in self.properties.iter() {
            entries.push((
                property,
                PropertyTerms::new(
                    self.scale(terms.unit_cost, "properties.unit_cost")?,
                    self.scale(terms.yield_rate, "properties.yield_rate")?,
                ),
            ));
        }
        let catalog = PropertyCatalog::new(self.game.rate_period_secs, entries)?;

        Ok(GameRules {
            catalog,
            welcome_grant: self.scale(self.game.welcome_grant, "game.welcome_grant")?,
        })
    }

    /// Currency metadata for the ledger.
    pub fn currency_metadata(&self) -> CurrencyMetadata {
        CurrencyMetadata::new(
            &self.currency.name,
            &self.currency.symbol,
            self.currency.decimals,
        )
    }

    /// Credential metadata for the registry.
    pub fn credential_metadata(&self) -> CredentialMetadata {
        CredentialMetadata::new(
            &self.credential.name,
            &self.credential.symbol,
            &self.credential.base_uri,
        )
    }

    fn scale(&self, whole: u64, field: &str) -> Result<Amount, ConfigError> {
        let decimals = self.currency.decimals;
        if decimals > MAX_DECIMALS {
            return Err(invalid(&format!(
                "currency.decimals is {decimals}, at most {MAX_DECIMALS} supported"
            )));
        }
        to_base_units(whole, decimals)
            .ok_or_else(|| invalid(&format!("{field} overflows at {decimals} decimals")))
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Fungible currency configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyConfig {
    /// Display name.
    #[serde(default = "default_currency_name")]
    pub name: String,

    /// Ticker symbol.
    #[serde(default = "default_currency_symbol")]
    pub symbol: String,

    /// Base-unit decimals per whole token.
    #[serde(default = "default_decimals")]
    pub decimals: u32,

    /// Whole tokens minted at genesis.
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            name: default_currency_name(),
            symbol: default_currency_symbol(),
            decimals: default_decimals(),
            initial_supply: default_initial_supply(),
        }
    }
}

/// Credential collection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialConfig {
    /// Collection name.
    #[serde(default = "default_credential_name")]
    pub name: String,

    /// Collection symbol.
    #[serde(default = "default_credential_symbol")]
    pub symbol: String,

    /// Token URI prefix.
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
}

impl CredentialConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.override_base_uri(std::env::var(BASE_URI_ENV).ok());
    }

    fn override_base_uri(&mut self, value: Option<String>) {
        if let Some(uri) = value.filter(|v| !v.is_empty()) {
            self.base_uri = uri;
        }
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            name: default_credential_name(),
            symbol: default_credential_symbol(),
            base_uri: default_base_uri(),
        }
    }
}

/// Registration and accrual rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// Whole tokens paid to each player on joining.
    #[serde(default = "default_welcome_grant")]
    pub welcome_grant: u64,

    /// Seconds over which property yield is expressed.
    #[serde(default = "default_rate_period_secs")]
    pub rate_period_secs: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            welcome_grant: default_welcome_grant(),
            rate_period_secs: default_rate_period_secs(),
        }
    }
}

/// Terms of one property type, in whole tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PropertyTermsConfig {
    /// Price of one unit.
    pub unit_cost: u64,
    /// Reward per unit per rate period.
    pub yield_rate: u64,
}

/// The property table. Setting a type to `null` removes it from sale.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PropertiesConfig {
    /// Basic property terms.
    #[serde(default = "default_basic")]
    pub basic: Option<PropertyTermsConfig>,

    /// Medium property terms.
    #[serde(default = "default_medium")]
    pub medium: Option<PropertyTermsConfig>,

    /// Premium property terms.
    #[serde(default = "default_premium")]
    pub premium: Option<PropertyTermsConfig>,
}

impl PropertiesConfig {
    /// Configured types with their terms, in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyType, PropertyTermsConfig)> + '_ {
        PropertyType::ALL
            .into_iter()
            .filter_map(move |property| self.get(property).map(|terms| (property, terms)))
    }

    /// Terms configured for `property`.
    pub const fn get(&self, property: PropertyType) -> Option<PropertyTermsConfig> {
        match property {
            PropertyType::Basic => self.basic,
            PropertyType::Medium => self.medium,
            PropertyType::Premium => self.premium,
        }
    }
}

impl Default for PropertiesConfig {
    fn default() -> Self {
        Self {
            basic: default_basic(),
            medium: default_medium(),
            premium: default_premium(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_currency_name() -> String {
    "Investor Token".to_owned()
}

fn default_currency_symbol() -> String {
    "INV".to_owned()
}

const fn default_decimals() -> u32 {
    18
}

const fn default_initial_supply() -> u64 {
    1_000_000
}

fn default_credential_name() -> String {
    "Investor Credential".to_owned()
}

fn default_credential_symbol() -> String {
    "INVC".to_owned()
}

fn default_base_uri() -> String {
    "https://api.idle-investor.com/metadata/".to_owned()
}

const fn default_welcome_grant() -> u64 {
    100
}

const fn default_rate_period_secs() -> u64 {
    86_400
}

const fn default_basic() -> Option<PropertyTermsConfig> {
    Some(PropertyTermsConfig {
        unit_cost: 50,
        yield_rate: 1,
    })
}

const fn default_medium() -> Option<PropertyTermsConfig> {
    Some(PropertyTermsConfig {
        unit_cost: 200,
        yield_rate: 5,
    })
}

const fn default_premium() -> Option<PropertyTermsConfig> {
    Some(PropertyTermsConfig {
        unit_cost: 1_000,
        yield_rate: 30,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.currency.decimals, 18);
        assert_eq!(config.game.welcome_grant, 100);
        assert_eq!(config.game.rate_period_secs, 86_400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_rules_scale_to_base_units() {
        let rules = GameConfig::default().rules().ok();
        let grant = rules.as_ref().map(|r| r.welcome_grant);
        assert_eq!(grant, Some(100_000_000_000_000_000_000));

        let basic = rules.and_then(|r| r.catalog.terms(PropertyType::Basic).ok());
        assert_eq!(
            basic,
            Some(PropertyTerms::new(50_000_000_000_000_000_000, 1_000_000_000_000_000_000))
        );
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
currency:
  name: "Test Token"
  symbol: "TST"
  decimals: 0
  initial_supply: 5000

credential:
  name: "Test Credential"
  symbol: "TSTC"
  base_uri: "https://api.example.com/"

game:
  welcome_grant: 100
  rate_period_secs: 3600

properties:
  basic: { unit_cost: 10, yield_rate: 2 }
  medium: { unit_cost: 40, yield_rate: 9 }
  premium: null

simulation:
  players: 3
"#;

        let config = GameConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.currency.symbol, "TST");
        assert_eq!(config.currency.initial_supply, 5_000);
        assert_eq!(config.game.rate_period_secs, 3_600);
        assert_eq!(config.properties.premium, None);

        let catalog = config.rules().ok().map(|r| r.catalog);
        assert!(matches!(
            catalog.as_ref().map(|c| c.terms(PropertyType::Premium)),
            Some(Err(GameError::UnknownPropertyType { tag: 2 }))
        ));
        assert_eq!(
            catalog.and_then(|c| c.terms(PropertyType::Medium).ok()),
            Some(PropertyTerms::new(40, 9))
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = GameConfig::parse("game:\n  welcome_grant: 7\n");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.game.welcome_grant, 7);
        assert_eq!(config.currency.initial_supply, 1_000_000);
        assert!(config.properties.basic.is_some());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(GameConfig::parse("").is_ok());
    }

    #[test]
    fn malformed_yaml_rejected() {
        let result = GameConfig::parse("currency: [1, 2");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn zero_rate_period_rejected() {
        let mut config = GameConfig::default();
        config.game.rate_period_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Catalog {
                source: CatalogError::ZeroRatePeriod
            })
        ));
    }

    #[test]
    fn free_property_rejected() {
        let mut config = GameConfig::default();
        config.properties.medium = Some(PropertyTermsConfig {
            unit_cost: 0,
            yield_rate: 5,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Catalog { .. })));
    }

    #[test]
    fn excessive_decimals_rejected() {
        let mut config = GameConfig::default();
        config.currency.decimals = 29;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn grant_larger_than_supply_rejected() {
        let mut config = GameConfig::default();
        config.currency.initial_supply = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn base_uri_override_ignores_empty_values() {
        let mut credential = CredentialConfig::default();
        credential.override_base_uri(Some(String::new()));
        assert_eq!(credential.base_uri, default_base_uri());

        credential.override_base_uri(Some("https://cdn.example.com/".to_owned()));
        assert_eq!(credential.base_uri, "https://cdn.example.com/");
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("investor-config.yaml");
        if path.exists() {
            let config = GameConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.ok().is_some_and(|c| c.validate().is_ok()));
        }
    }
}
