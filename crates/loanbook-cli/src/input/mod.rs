pub mod file;
pub mod stdin;

use loanbook_core::PricingConfig;

/// Pricing configuration from `--config`, or the defaults.
pub fn load_config(path: Option<&str>) -> Result<PricingConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) => file::read_structured::<PricingConfig>(p)?,
        None => PricingConfig::default(),
    };
    config.validate()?;
    log::debug!("pricing config: {config:?}");
    Ok(config)
}
