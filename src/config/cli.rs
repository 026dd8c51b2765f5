use crate::domain::model::{RawAttributes, SiteId};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "site-directory")]
#[command(about = "Render a multisite network directory as a list or a map")]
pub struct CliConfig {
    #[arg(long, default_value = "network.toml", help = "Network description (TOML)")]
    pub network: String,

    #[arg(long, default_value = "1", help = "Site the page is rendered for")]
    pub current_site: SiteId,

    #[arg(long = "attr", value_name = "KEY=VALUE", help = "Shortcode attribute; a bare KEY is a flag")]
    pub attrs: Vec<String>,

    #[arg(long, help = "Content between the opening and closing tags")]
    pub content: Option<String>,

    #[arg(long, conflicts_with_all = ["attrs", "content"], help = "Page template containing shortcodes")]
    pub page: Option<String>,

    #[arg(long, help = "Also print the page's style and script tags")]
    pub with_assets: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn raw_attributes(&self) -> RawAttributes {
        let mut raw = RawAttributes::new();
        for attr in &self.attrs {
            match attr.split_once('=') {
                Some((key, value)) => raw.named.push((key.trim().to_lowercase(), value.to_string())),
                None => raw.positional.push(attr.trim().to_string()),
            }
        }
        raw
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("network", &self.network)?;
        validate_positive_number("current_site", self.current_site, 1)?;
        if let Some(page) = &self.page {
            validate_non_empty_string("page", page)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_attributes_from_flags() {
        let config = CliConfig::parse_from([
            "site-directory",
            "--attr",
            "display=list",
            "--attr",
            "show_site_logo",
            "--attr",
            "Style=a=b",
        ]);
        let raw = config.raw_attributes();
        assert_eq!(
            raw.named,
            vec![
                ("display".to_string(), "list".to_string()),
                ("style".to_string(), "a=b".to_string()),
            ]
        );
        assert_eq!(raw.positional, vec!["show_site_logo".to_string()]);
    }

    #[test]
    fn test_validate_rejects_site_zero() {
        let config = CliConfig::parse_from(["site-directory", "--current-site", "0"]);
        assert!(config.validate().is_err());
    }
}
