use crate::core::context::RenderContext;
use crate::domain::model::RawAttributes;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

type Handler<'a> = Box<dyn Fn(&mut RenderContext, &RawAttributes, Option<&str>) -> String + 'a>;

fn open_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[(?P<tag>[\w-]+)(?P<attrs>(?:\s[^\]]*?)?)\s*(?P<selfclose>/)?\]")
            .expect("shortcode tag pattern is valid")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r#"([\w-]+)\s*=\s*"([^"]*)"(?:\s|$)"#,
            r#"|([\w-]+)\s*=\s*'([^']*)'(?:\s|$)"#,
            r#"|([\w-]+)\s*=\s*([^\s'"]+)(?:\s|$)"#,
            r#"|"([^"]*)"(?:\s|$)"#,
            r#"|'([^']*)'(?:\s|$)"#,
            r#"|(\S+)(?:\s|$)"#,
        ))
        .expect("shortcode attribute pattern is valid")
    })
}

/// Split the attribute part of a tag into named and positional attributes.
/// Names are lower-cased.
pub fn parse_attributes(text: &str) -> RawAttributes {
    let mut attrs = RawAttributes::new();
    for caps in attribute_regex().captures_iter(text) {
        let named = [(1, 2), (3, 4), (5, 6)]
            .into_iter()
            .find_map(|(k, v)| Some((caps.get(k)?, caps.get(v)?)));
        if let Some((key, value)) = named {
            attrs
                .named
                .push((key.as_str().to_lowercase(), value.as_str().to_string()));
        } else if let Some(value) = caps.get(7).or_else(|| caps.get(8)).or_else(|| caps.get(9)) {
            attrs.positional.push(value.as_str().to_string());
        }
    }
    attrs
}

/// Shortcode tag → handler table.
#[derive(Default)]
pub struct ShortcodeRegistry<'a> {
    handlers: BTreeMap<String, Handler<'a>>,
}

impl<'a> ShortcodeRegistry<'a> {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    pub fn add<F>(&mut self, tag: &str, handler: F)
    where
        F: Fn(&mut RenderContext, &RawAttributes, Option<&str>) -> String + 'a,
    {
        if self.handlers.insert(tag.to_string(), Box::new(handler)).is_some() {
            tracing::warn!("Shortcode [{}] was registered twice; keeping the latest handler", tag);
        }
    }

    pub fn has(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn invoke(
        &self,
        tag: &str,
        ctx: &mut RenderContext,
        attrs: &RawAttributes,
        content: Option<&str>,
    ) -> Option<String> {
        self.handlers.get(tag).map(|handler| handler(ctx, attrs, content))
    }

    /// Replace registered shortcodes in `text` with their output.
    ///
    /// Handles `[tag attrs]`, `[tag attrs /]` and `[tag attrs]content[/tag]`.
    /// `[[tag]]` is printed literally as `[tag]`. Unregistered tags are left as is.
    pub fn expand(&self, ctx: &mut RenderContext, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;

        while let Some(caps) = open_tag_regex().captures_at(text, pos) {
            let Some(whole) = caps.get(0) else { break };
            let tag = &caps["tag"];
            let start = whole.start();
            let open_end = whole.end();

            let Some(handler) = self.handlers.get(tag) else {
                out.push_str(&text[pos..start + 1]);
                pos = start + 1;
                continue;
            };

            if text[..start].ends_with('[') && text[open_end..].starts_with(']') {
                out.push_str(&text[pos..start - 1]);
                out.push_str(whole.as_str());
                pos = open_end + 1;
                continue;
            }

            out.push_str(&text[pos..start]);

            let mut end = open_end;
            let mut content = None;
            if caps.name("selfclose").is_none() {
                let closing = format!("[/{}]", tag);
                if let Some(offset) = text[open_end..].find(&closing) {
                    content = Some(&text[open_end..open_end + offset]);
                    end = open_end + offset + closing.len();
                }
            }

            let attrs = parse_attributes(caps.name("attrs").map_or("", |m| m.as_str()));
            out.push_str(&handler(ctx, &attrs, content));
            pos = end;
        }

        out.push_str(&text[pos..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::AssetRegistry;

    fn echo_registry<'a>() -> ShortcodeRegistry<'a> {
        let mut registry = ShortcodeRegistry::new();
        registry.add("echo", |ctx: &mut RenderContext, attrs: &RawAttributes, content: Option<&str>| {
            let out = format!(
                "<{}|{:?}|{:?}|{}>",
                ctx.invocation(),
                attrs.named,
                attrs.positional,
                content.unwrap_or("-")
            );
            ctx.advance_invocation();
            out
        });
        registry
    }

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(r#" Display="list" style='color: red' logo_size=thumbnail show_site_logo "#);
        assert_eq!(
            attrs.named,
            vec![
                ("display".to_string(), "list".to_string()),
                ("style".to_string(), "color: red".to_string()),
                ("logo_size".to_string(), "thumbnail".to_string()),
            ]
        );
        assert_eq!(attrs.positional, vec!["show_site_logo".to_string()]);
    }

    #[test]
    fn test_expand_self_closing_and_enclosing() {
        let registry = echo_registry();
        let mut ctx = RenderContext::new(1, AssetRegistry::new());
        let out = registry.expand(&mut ctx, "a [echo x=1 /] b [echo]inside[/echo] c");
        assert_eq!(
            out,
            r#"a <0|[("x", "1")]|[]|-> b <1|[]|[]|inside> c"#
        );
    }

    #[test]
    fn test_expand_leaves_unknown_and_escaped_tags() {
        let registry = echo_registry();
        let mut ctx = RenderContext::new(1, AssetRegistry::new());
        let out = registry.expand(&mut ctx, "[other] [[echo]] [echo]");
        assert_eq!(out, "[other] [echo] <0|[]|[]|->");
    }
}
