//! Configuration infrastructure
//!
//! Contains configuration loading and management for catalog harvesting.
//!
//! Configuration is organized into:
//! 1. Transport settings (`http`)
//! 2. Run settings (`run`): courtesy delay, output paths, image cap
//! 3. Logging settings (`logging`)
//! 4. Static catalog data (`mappings`) and per-storefront `profiles`
//!
//! Every section uses `serde(default)`, so a partial file only overrides
//! the keys it names.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use url::Url;

use crate::domain::catalog_mapping::CategoryMapping;
use crate::infrastructure::parsing::config::ExtractionSelectors;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub run: RunConfig,
    pub logging: LoggingConfig,
    pub mappings: CategoryMapping,

    /// Storefront profiles, matched by host in declaration order
    pub profiles: Vec<PlatformProfile>,

    /// Profile used when no entry in `profiles` matches the URL host
    pub default_profile: PlatformProfile,
}

/// Built-in configuration: generic static storefront plus Colcci
///
/// A partial file that omits `profiles` keeps the built-in ones.
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
            mappings: CategoryMapping::default(),
            profiles: vec![PlatformProfile::colcci()],
            default_profile: PlatformProfile::default(),
        }
    }
}

impl AppConfig {
    /// Index into `profiles` of the first entry matching the URL host
    ///
    /// `None` means the URL is handled by `default_profile`.
    pub fn profile_index(&self, url: &Url) -> Option<usize> {
        let host = url.host_str()?;
        self.profiles
            .iter()
            .position(|profile| profile.matches_host(host))
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,

    /// Timeout for plain product page fetches
    pub page_timeout_seconds: u64,

    /// Timeout for each image download
    pub image_timeout_seconds: u64,

    /// Total attempts per request (first try included)
    pub max_retries: u32,

    /// Backoff base; attempt n waits `base * 2^(n-1)`
    pub backoff_base_ms: u64,

    /// Statuses that trigger a retry
    pub retry_statuses: Vec<u16>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            accept: defaults::ACCEPT.to_string(),
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            page_timeout_seconds: defaults::PAGE_TIMEOUT_SECONDS,
            image_timeout_seconds: defaults::IMAGE_TIMEOUT_SECONDS,
            max_retries: defaults::MAX_RETRIES,
            backoff_base_ms: defaults::BACKOFF_BASE_MS,
            retry_statuses: defaults::RETRY_STATUSES.to_vec(),
        }
    }
}

/// Settings for one harvesting run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Minimum spacing between successive product page fetches
    pub courtesy_delay_ms: u64,

    /// Maximum images kept per product
    pub max_images: usize,

    /// Column of the input table holding product URLs
    pub input_column: String,

    pub output_csv: PathBuf,
    pub images_dir: PathBuf,

    /// chrono format for the launch date column
    pub launch_date_format: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            courtesy_delay_ms: defaults::COURTESY_DELAY_MS,
            max_images: defaults::MAX_IMAGES,
            input_column: defaults::INPUT_COLUMN.to_string(),
            output_csv: PathBuf::from(defaults::OUTPUT_CSV),
            images_dir: PathBuf::from(defaults::IMAGES_DIR),
            launch_date_format: defaults::LAUNCH_DATE_FORMAT.to_string(),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs in the log file
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    pub file_name: String,

    /// Fixed UTC offset used for timestamps
    pub utc_offset_hours: i32,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: true,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            utc_offset_hours: defaults::LOG_UTC_OFFSET_HOURS,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "warn".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "error".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters.insert("chromiumoxide".to_string(), "warn".to_string());
                filters.insert("tungstenite".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

/// How downloaded image files are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageNaming {
    /// `images-{prefix}-{sku}-{name-slug}_{i}.jpg`
    BaseSlug,
    /// `{sku}_{i}.jpg`
    SkuIndex,
}

/// Image naming and download verification policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagePolicy {
    pub naming: ImageNaming,

    /// Prefix segment for [`ImageNaming::BaseSlug`]
    pub base_prefix: String,

    /// Reject responses whose content-type is not `image/*`
    pub verify_content_type: bool,

    /// Reject (and delete) files smaller than this many bytes
    pub min_bytes: Option<u64>,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            naming: ImageNaming::BaseSlug,
            base_prefix: defaults::IMAGE_BASE_PREFIX.to_string(),
            verify_content_type: false,
            min_bytes: None,
        }
    }
}

/// Headless rendering settings for client-rendered storefronts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub enabled: bool,

    /// Any one of these attaching ends the wait
    pub wait_selectors: Vec<String>,

    pub timeout_ms: u64,

    /// Timeout of the plain fetch used when rendering fails
    pub fallback_timeout_seconds: u64,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            wait_selectors: Vec::new(),
            timeout_ms: defaults::RENDER_TIMEOUT_MS,
            fallback_timeout_seconds: defaults::RENDER_FALLBACK_TIMEOUT_SECONDS,
        }
    }
}

/// Name keyword → department/category rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Any keyword contained in the lowercased name triggers the rule
    pub keywords: Vec<String>,
    pub department: String,
    pub category: String,
}

impl KeywordRule {
    fn new(keywords: &[&str], department: &str, category: &str) -> Self {
        Self {
            keywords: strings(keywords),
            department: department.to_string(),
            category: category.to_string(),
        }
    }
}

/// Per-storefront extraction profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformProfile {
    pub name: String,

    /// Host suffixes served by this profile (e.g. "colcci.com.br")
    pub domains: Vec<String>,

    pub rendering: RenderingConfig,
    pub selectors: ExtractionSelectors,

    /// Label phrases whose enclosing container holds the description
    pub description_labels: Vec<String>,

    /// Tags accepted as the enclosing container of a description label
    pub description_containers: Vec<String>,

    /// Label preceding the brand in attribute tables ("Marca")
    pub brand_label: String,

    /// Brand vocabulary searched inside the product name
    pub known_brands: Vec<String>,

    pub category_rules: Vec<KeywordRule>,

    /// Breadcrumb entries that are navigation noise, compared lowercased
    pub breadcrumb_ignore: Vec<String>,

    pub default_department: String,
    pub default_category: String,
    pub default_brand: String,

    /// Name used when every name strategy fails
    pub name_placeholder: String,

    /// Currency symbol preceding prices in page text
    pub currency_symbol: String,

    /// Try the "Ref."/"Referência" label before structured SKU sources
    pub sku_label_first: bool,

    /// Look for size/color/voltage variants on the page
    pub detect_variants: bool,

    /// Labels introducing a size list in page text
    pub size_labels: Vec<String>,

    /// Size vocabulary accepted after a size label
    pub size_tokens: Vec<String>,

    /// Option texts that are prompts rather than variants, compared lowercased
    pub variant_placeholders: Vec<String>,

    pub images: ImagePolicy,
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            domains: Vec::new(),
            rendering: RenderingConfig::default(),
            selectors: ExtractionSelectors::default(),
            description_labels: strings(&["Aplicável ao(s) veículo(s)"]),
            description_containers: strings(&["div", "section", "article"]),
            brand_label: "Marca".to_string(),
            known_brands: strings(defaults::KNOWN_AUTO_BRANDS),
            category_rules: vec![
                KeywordRule::new(&["pneu"], "Auto Peças", "Pneus"),
                KeywordRule::new(&["óleo", "oleo"], "Auto Peças", "Óleos"),
                KeywordRule::new(&["filtro"], "Auto Peças", "Filtros"),
                KeywordRule::new(&["freio", "embreagem"], "Auto Peças", "Freios"),
                KeywordRule::new(&["chave", "ferramenta"], "Acessórios", "Ferramentas"),
                KeywordRule::new(&["alto-falante", "som"], "Acessórios", "Som"),
            ],
            breadcrumb_ignore: strings(&[
                "início",
                "inicio",
                "home",
                "página inicial",
                "você está em:",
                "you are in:",
            ]),
            default_department: "Auto Peças".to_string(),
            default_category: "Outros".to_string(),
            default_brand: String::new(),
            name_placeholder: defaults::NAME_PLACEHOLDER.to_string(),
            currency_symbol: "R$".to_string(),
            sku_label_first: false,
            detect_variants: false,
            size_labels: strings(&["Tamanho", "Size"]),
            size_tokens: strings(&[
                "PP", "P", "M", "G", "GG", "XG", "XGG", "XS", "S", "L", "XL", "XXL", "U",
            ]),
            variant_placeholders: strings(&[
                "selecione",
                "select",
                "escolha",
                "tamanho",
                "size",
                "cor",
                "color",
                "voltagem",
                "-",
            ]),
            images: ImagePolicy::default(),
        }
    }
}

impl PlatformProfile {
    /// Client-rendered fashion storefront with size grids
    pub fn colcci() -> Self {
        Self {
            name: "colcci".to_string(),
            domains: strings(&["colcci.com.br"]),
            rendering: RenderingConfig {
                enabled: true,
                wait_selectors: strings(&[
                    "h1",
                    "[class*='breadcrumb'] a",
                    "[class*='price'], [class*='preco'], [class*='valor']",
                ]),
                timeout_ms: defaults::RENDER_TIMEOUT_MS,
                fallback_timeout_seconds: defaults::RENDER_FALLBACK_TIMEOUT_SECONDS,
            },
            description_labels: strings(&[
                "Composição",
                "Composicao",
                "Descrição",
                "Descricao",
                "Detalhes",
            ]),
            description_containers: strings(&[
                "div", "section", "article", "li", "p", "dt", "h2", "h3",
            ]),
            known_brands: strings(&["colcci"]),
            category_rules: vec![
                KeywordRule::new(&["camiseta", "t-shirt", "regata"], "Vestuário", "Camisetas"),
                KeywordRule::new(&["camisa"], "Vestuário", "Camisas"),
                KeywordRule::new(&["calça", "calca", "jeans"], "Vestuário", "Calças"),
                KeywordRule::new(&["vestido"], "Vestuário", "Vestidos"),
                KeywordRule::new(&["jaqueta", "casaco", "blazer"], "Vestuário", "Casacos"),
                KeywordRule::new(&["bolsa", "cinto", "óculos"], "Acessórios", "Acessórios"),
            ],
            default_department: "Vestuário".to_string(),
            default_category: "Outros".to_string(),
            default_brand: "Colcci".to_string(),
            sku_label_first: true,
            detect_variants: true,
            images: ImagePolicy {
                naming: ImageNaming::SkuIndex,
                base_prefix: defaults::IMAGE_BASE_PREFIX.to_string(),
                verify_content_type: true,
                min_bytes: Some(defaults::MIN_IMAGE_BYTES),
            },
            ..Self::default()
        }
    }

    /// Host equals a configured domain or is a subdomain of it
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            let domain = domain.to_ascii_lowercase();
            host == domain || host.ends_with(&format!(".{domain}"))
        })
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("catalog-harvester");

        Ok(config_dir)
    }

    /// Manager for the per-user configuration file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join("config.json");
        Ok(Self { config_path })
    }

    /// Manager for an explicit configuration file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load configuration from file, creating a default one if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!(
                "Configuration file not found, creating default: {:?}",
                self.config_path
            );
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration parse error: {}", parse_error);
                warn!("⚠️  Falling back to default configuration");

                // Keep the unreadable file around for inspection
                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    pub const ACCEPT: &str =
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
    pub const ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en;q=0.8";

    pub const PAGE_TIMEOUT_SECONDS: u64 = 15;
    pub const IMAGE_TIMEOUT_SECONDS: u64 = 20;
    pub const MAX_RETRIES: u32 = 3;
    pub const BACKOFF_BASE_MS: u64 = 500;
    pub const RETRY_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

    pub const RENDER_TIMEOUT_MS: u64 = 20_000;
    pub const RENDER_FALLBACK_TIMEOUT_SECONDS: u64 = 20;

    /// Courtesy pause between product pages to avoid 429s
    pub const COURTESY_DELAY_MS: u64 = 500;
    pub const MAX_IMAGES: usize = 5;
    pub const INPUT_COLUMN: &str = "url";
    pub const OUTPUT_CSV: &str = "data/exports/produtos_vtex.csv";
    pub const IMAGES_DIR: &str = "data/exports/imagens_produtos";
    pub const LAUNCH_DATE_FORMAT: &str = "%d/%m/%Y";

    pub const NAME_PLACEHOLDER: &str = "Sem Nome";
    pub const IMAGE_BASE_PREFIX: &str = "leadPOC";
    pub const MIN_IMAGE_BYTES: u64 = 1024;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FILE_NAME: &str = "catalog-harvester.log";
    /// Brasília time
    pub const LOG_UTC_OFFSET_HOURS: i32 = -3;

    pub const KNOWN_AUTO_BRANDS: &[&str] = &[
        "pirelli",
        "michelin",
        "bridgestone",
        "shell",
        "mobil",
        "castrol",
        "bosch",
        "ngk",
        "valeo",
        "continental",
        "skf",
        "trw",
        "varga",
        "lng",
        "rochepecas",
        "vannucci",
        "wega",
        "aje",
        "bravox",
        "kraucher",
        "waft",
        "mecarm",
        "nytron",
        "cummins",
        "ford",
        "mercedes",
        "volvo",
        "renault",
        "fiat",
        "iveco",
        "volkswagen",
        "hyundai",
        "alfa romeo",
    ];
}
