use crate::domain::model::{DisplayMode, LogoSize, QueryArgs, RawAttributes, TaxClause};
use crate::utils::error::{DirectoryError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

const DISPLAY: &str = "display";
const STYLE: &str = "style";
const SHOW_SITE_LOGO: &str = "show_site_logo";
const LOGO_SIZE: &str = "logo_size";
const QUERY_ARGS: &str = "query_args";
const SITE_CATEGORY_IN: &str = "site_category_in";

/// Normalised options for one shortcode invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShortcodeOptions {
    pub display: DisplayMode,
    pub style: String,
    pub show_site_logo: bool,
    pub logo_size: LogoSize,
    pub query_args: QueryArgs,
    pub site_category_in: Vec<String>,
    /// Slug restriction for the category list, set only when `site_category_in`
    /// created the `tax_query` rather than extending one.
    pub query_terms: Option<Vec<String>>,
}

/// Decode a complex attribute value.
///
/// The value is URL-decoded (`+` counts as a space) and then parsed as JSON.
/// When either step fails the original string is returned untouched.
pub fn parse_json_attribute(raw: &str) -> Value {
    let plus_decoded = raw.replace('+', " ");
    let decoded = match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded,
        Err(_) => return Value::String(raw.to_string()),
    };

    match serde_json::from_str::<Value>(&decoded) {
        Ok(parsed) => parsed,
        Err(_) => Value::String(raw.to_string()),
    }
}

impl ShortcodeOptions {
    pub fn from_attributes(raw: &RawAttributes) -> Result<Self> {
        // 後出現的同名屬性覆蓋前者
        let mut decoded: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in &raw.named {
            decoded.insert(key.to_lowercase(), parse_json_attribute(value));
        }
        let bare_logo_flag = raw
            .positional
            .iter()
            .any(|flag| flag.eq_ignore_ascii_case(SHOW_SITE_LOGO));

        let mut options = Self::default();

        if let Some(value) = decoded.get(DISPLAY) {
            options.display = DisplayMode::parse(&scalar_text(value));
        }
        if let Some(value) = decoded.get(STYLE) {
            options.style = scalar_text(value);
        }
        options.show_site_logo = bare_logo_flag || decoded.get(SHOW_SITE_LOGO).is_some_and(is_truthy);
        if let Some(value) = decoded.get(LOGO_SIZE) {
            options.logo_size = decode_logo_size(value);
        }
        if let Some(value) = decoded.get(QUERY_ARGS) {
            options.query_args = decode_query_args(value)?;
        }
        if let Some(value) = decoded.get(SITE_CATEGORY_IN) {
            options.site_category_in = scalar_text(value)
                .split(',')
                .map(str::trim)
                .filter(|slug| !slug.is_empty())
                .map(str::to_string)
                .collect();
        }

        options.merge_category_filter()?;

        tracing::debug!(
            "Parsed site directory options: display={:?}, logo={}, categories={:?}",
            options.display,
            options.show_site_logo,
            options.site_category_in
        );

        Ok(options)
    }

    /// Fold `site_category_in` into `query_args.tax_query`.
    fn merge_category_filter(&mut self) -> Result<()> {
        if self.site_category_in.is_empty() {
            return Ok(());
        }

        let clause = TaxClause::slugs_in(&self.site_category_in).to_value();
        match self.query_args.get_mut("tax_query") {
            Some(Value::Array(clauses)) => clauses.push(clause),
            // 物件形式：以下一個數字鍵加入
            Some(Value::Object(clauses)) => {
                let next = clauses
                    .keys()
                    .filter_map(|key| key.parse::<u64>().ok())
                    .max()
                    .map_or(0, |max| max + 1);
                clauses.insert(next.to_string(), clause);
            }
            Some(other) => {
                return Err(DirectoryError::invalid_input(format!(
                    "tax_query must be of type array, was {}",
                    json_type_name(other)
                )))
            }
            None => {
                self.query_args
                    .insert("tax_query".to_string(), Value::Array(vec![clause]));
                self.query_terms = Some(self.site_category_in.clone());
            }
        }
        Ok(())
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Unusable sizes fall back to the default `[72, 72]`.
fn decode_logo_size(value: &Value) -> LogoSize {
    match value {
        Value::String(name) if name.trim().is_empty() => LogoSize::default(),
        Value::String(name) => LogoSize::Named(name.trim().to_string()),
        Value::Array(items) if items.len() == 2 => {
            let dimension = |v: &Value| {
                v.as_u64()
                    .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
                    .and_then(|n| u32::try_from(n).ok())
            };
            match (dimension(&items[0]), dimension(&items[1])) {
                (Some(w), Some(h)) => LogoSize::Dimensions(w, h),
                _ => {
                    tracing::warn!("Ignoring logo_size with unusable dimensions: {}", value);
                    LogoSize::default()
                }
            }
        }
        Value::Null => LogoSize::default(),
        other => {
            tracing::warn!("Ignoring logo_size {}: expected a size name or [width, height]", other);
            LogoSize::default()
        }
    }
}

fn decode_query_args(value: &Value) -> Result<QueryArgs> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(QueryArgs::new()),
        Value::String(s) if s.is_empty() => Ok(QueryArgs::new()),
        Value::String(s) if s.contains('=') => Ok(parse_query_string(s)),
        Value::Array(items) if items.is_empty() => Ok(QueryArgs::new()),
        other => Err(DirectoryError::invalid_input(format!(
            "query_args must be a JSON object, was {}",
            json_type_name(other)
        ))),
    }
}

/// `key=value&key[]=a&key[]=b` form of `query_args`.
fn parse_query_string(text: &str) -> QueryArgs {
    let decode = |part: &str| {
        let spaced = part.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(|decoded| decoded.into_owned())
            .unwrap_or(spaced)
    };

    let mut args = QueryArgs::new();
    for pair in text.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let (key, value) = (decode(key), Value::String(decode(value)));
        match key.strip_suffix("[]") {
            Some(list_key) => match args
                .entry(list_key.to_string())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => items.push(value),
                slot => *slot = Value::Array(vec![value]),
            },
            None => {
                args.insert(key, value);
            }
        }
    }
    args
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DIRECTORY_TAXONOMY;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ShortcodeOptions::from_attributes(&RawAttributes::new()).unwrap();
        assert_eq!(options.display, DisplayMode::Map);
        assert_eq!(options.style, "");
        assert!(!options.show_site_logo);
        assert_eq!(options.logo_size, LogoSize::Dimensions(72, 72));
        assert!(options.query_args.is_empty());
        assert!(options.site_category_in.is_empty());
        assert_eq!(options.query_terms, None);
    }

    #[test]
    fn test_non_json_values_are_kept_verbatim() {
        assert_eq!(parse_json_attribute("map"), json!("map"));
        assert_eq!(parse_json_attribute("color: red; width: 100%"), json!("color: red; width: 100%"));
        assert_eq!(parse_json_attribute("{broken"), json!("{broken"));
        assert_eq!(parse_json_attribute("%E0%A4%A"), json!("%E0%A4%A"));
        assert_eq!(parse_json_attribute(""), json!(""));
    }

    #[test]
    fn test_url_encoded_json_is_decoded() {
        let raw = "%7B%22numberposts%22%3A3%2C%22order%22%3A%22DESC%22%7D";
        assert_eq!(parse_json_attribute(raw), json!({"numberposts": 3, "order": "DESC"}));
        assert_eq!(parse_json_attribute("[100,+100]"), json!([100, 100]));
        assert_eq!(parse_json_attribute("72"), json!(72));
    }

    #[test]
    fn test_style_survives_decoding() {
        let raw = RawAttributes::new().with("style", "height: 400px;");
        let options = ShortcodeOptions::from_attributes(&raw).unwrap();
        assert_eq!(options.style, "height: 400px;");
    }

    #[test]
    fn test_category_filter_initializes_tax_query() {
        let raw = RawAttributes::new().with("site_category_in", "news,sports");
        let options = ShortcodeOptions::from_attributes(&raw).unwrap();

        let clauses = options.query_args["tax_query"].as_array().unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0],
            json!({
                "taxonomy": DIRECTORY_TAXONOMY,
                "field": "slug",
                "terms": ["news", "sports"],
                "operator": "IN",
            })
        );
        assert_eq!(
            options.query_terms,
            Some(vec!["news".to_string(), "sports".to_string()])
        );
    }

    #[test]
    fn test_category_filter_appends_to_existing_tax_query() {
        let query_args = urlencoding::encode(r#"{"tax_query":[{"field":"slug","terms":["local"]}]}"#).into_owned();
        let raw = RawAttributes::new()
            .with("query_args", query_args)
            .with("site_category_in", "news");
        let options = ShortcodeOptions::from_attributes(&raw).unwrap();

        let clauses = options.query_args["tax_query"].as_array().unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[1]["terms"], json!(["news"]));
        assert_eq!(options.query_terms, None);
    }

    #[test]
    fn test_category_filter_joins_keyed_tax_query() {
        let raw = RawAttributes::new()
            .with(
                "query_args",
                r#"{"tax_query":{"relation":"OR","0":{"field":"slug","terms":["local"]}}}"#,
            )
            .with("site_category_in", "news");
        let options = ShortcodeOptions::from_attributes(&raw).unwrap();

        let clauses = options.query_args["tax_query"].as_object().unwrap();
        assert_eq!(clauses["relation"], json!("OR"));
        assert_eq!(clauses["1"]["terms"], json!(["news"]));
        assert_eq!(options.query_terms, None);
    }

    #[test]
    fn test_category_filter_joins_relation_only_tax_query() {
        let raw = RawAttributes::new()
            .with("query_args", r#"{"tax_query":{"relation":"OR"}}"#)
            .with("site_category_in", "news");
        let options = ShortcodeOptions::from_attributes(&raw).unwrap();
        assert_eq!(options.query_args["tax_query"]["0"]["terms"], json!(["news"]));
    }

    #[test]
    fn test_non_array_tax_query_is_rejected() {
        let raw = RawAttributes::new()
            .with("query_args", r#"{"tax_query":"news"}"#)
            .with("site_category_in", "news");
        let result = ShortcodeOptions::from_attributes(&raw);
        assert!(matches!(result, Err(DirectoryError::InvalidInput { .. })));
    }

    #[test]
    fn test_show_site_logo_truthiness() {
        let on = |raw: RawAttributes| ShortcodeOptions::from_attributes(&raw).unwrap().show_site_logo;
        assert!(on(RawAttributes::new().with_flag("show_site_logo")));
        assert!(on(RawAttributes::new().with("show_site_logo", "1")));
        assert!(on(RawAttributes::new().with("show_site_logo", "yes")));
        assert!(!on(RawAttributes::new().with("show_site_logo", "0")));
        assert!(!on(RawAttributes::new().with("show_site_logo", "false")));
        assert!(!on(RawAttributes::new().with("show_site_logo", "")));
    }

    #[test]
    fn test_logo_size_forms() {
        let size = |v: &str| {
            ShortcodeOptions::from_attributes(&RawAttributes::new().with("logo_size", v))
                .map(|o| o.logo_size)
        };
        assert_eq!(size("thumbnail").unwrap(), LogoSize::Named("thumbnail".into()));
        assert_eq!(size("[100,50]").unwrap(), LogoSize::Dimensions(100, 50));
        assert_eq!(size("42").unwrap(), LogoSize::default());
        assert_eq!(size("[0.5,1]").unwrap(), LogoSize::default());
        assert_eq!(size("[-1,10]").unwrap(), LogoSize::default());
    }

    #[test]
    fn test_query_args_must_be_object() {
        let raw = RawAttributes::new().with("query_args", "not json");
        assert!(ShortcodeOptions::from_attributes(&raw).is_err());
        let raw = RawAttributes::new().with("query_args", "[1,2]");
        assert!(ShortcodeOptions::from_attributes(&raw).is_err());
    }

    #[test]
    fn test_query_args_query_string() {
        let raw = RawAttributes::new().with("query_args", "orderby=slug&order=DESC&slug[]=news&slug[]=sports+club");
        let options = ShortcodeOptions::from_attributes(&raw).unwrap();
        assert_eq!(
            Value::Object(options.query_args),
            json!({"orderby": "slug", "order": "DESC", "slug": ["news", "sports club"]})
        );
    }

    #[test]
    fn test_unknown_display_is_kept() {
        let raw = RawAttributes::new().with("DISPLAY", "grid");
        let options = ShortcodeOptions::from_attributes(&raw).unwrap();
        assert_eq!(options.display, DisplayMode::Other("grid".into()));
    }
}
