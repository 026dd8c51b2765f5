use crate::utils::error::Result;
use crate::utils::escape::{esc_attr, esc_url};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub handle: String,
    pub src: String,
    pub deps: Vec<String>,
    pub in_footer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedData {
    pub handle: String,
    pub object_name: String,
    pub data: Value,
}

/// Script and stylesheet declarations plus per-page enqueue state.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    scripts: BTreeMap<String, Asset>,
    styles: BTreeMap<String, Asset>,
    enqueued_scripts: Vec<String>,
    enqueued_styles: Vec<String>,
    localized: Vec<LocalizedData>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_script(&mut self, handle: &str, src: &str, deps: &[&str], in_footer: bool) {
        self.scripts.insert(
            handle.to_string(),
            Asset {
                handle: handle.to_string(),
                src: src.to_string(),
                deps: deps.iter().map(|d| d.to_string()).collect(),
                in_footer,
            },
        );
    }

    pub fn register_style(&mut self, handle: &str, src: &str, deps: &[&str]) {
        self.styles.insert(
            handle.to_string(),
            Asset {
                handle: handle.to_string(),
                src: src.to_string(),
                deps: deps.iter().map(|d| d.to_string()).collect(),
                in_footer: false,
            },
        );
    }

    pub fn script(&self, handle: &str) -> Option<&Asset> {
        self.scripts.get(handle)
    }

    pub fn style(&self, handle: &str) -> Option<&Asset> {
        self.styles.get(handle)
    }

    /// Returns `true` only the first time a handle is enqueued.
    pub fn enqueue_script(&mut self, handle: &str) -> bool {
        enqueue(&mut self.enqueued_scripts, handle)
    }

    pub fn enqueue_style(&mut self, handle: &str) -> bool {
        enqueue(&mut self.enqueued_styles, handle)
    }

    pub fn script_is_enqueued(&self, handle: &str) -> bool {
        self.enqueued_scripts.iter().any(|h| h == handle)
    }

    pub fn style_is_enqueued(&self, handle: &str) -> bool {
        self.enqueued_styles.iter().any(|h| h == handle)
    }

    /// Attach a JS global to a registered script.
    ///
    /// Returns `Ok(false)` when the script handle is unknown. Localizing the same
    /// object name twice replaces the earlier data.
    pub fn localize_script<T: Serialize>(&mut self, handle: &str, object_name: &str, data: &T) -> Result<bool> {
        if !self.scripts.contains_key(handle) {
            tracing::warn!("Cannot localize unregistered script '{}'", handle);
            return Ok(false);
        }
        let data = serde_json::to_value(data)?;

        match self
            .localized
            .iter_mut()
            .find(|l| l.handle == handle && l.object_name == object_name)
        {
            Some(existing) => existing.data = data,
            None => self.localized.push(LocalizedData {
                handle: handle.to_string(),
                object_name: object_name.to_string(),
                data,
            }),
        }
        Ok(true)
    }

    pub fn localized(&self, object_name: &str) -> Option<&Value> {
        self.localized
            .iter()
            .find(|l| l.object_name == object_name)
            .map(|l| &l.data)
    }

    /// `<link>` tags and header scripts, dependencies first.
    pub fn print_head(&self) -> Result<String> {
        let mut html = String::new();
        for style in resolve(&self.styles, &self.enqueued_styles) {
            let _ = writeln!(
                html,
                "<link rel='stylesheet' id='{}-css' href='{}' media='all' />",
                esc_attr(&style.handle),
                esc_url(&style.src)
            );
        }
        for script in resolve(&self.scripts, &self.enqueued_scripts) {
            if !script.in_footer {
                self.print_script(&mut html, script)?;
            }
        }
        Ok(html)
    }

    /// Footer scripts, each preceded by its localized data.
    pub fn print_footer(&self) -> Result<String> {
        let mut html = String::new();
        for script in resolve(&self.scripts, &self.enqueued_scripts) {
            if script.in_footer {
                self.print_script(&mut html, script)?;
            }
        }
        Ok(html)
    }

    fn print_script(&self, html: &mut String, script: &Asset) -> Result<()> {
        let extra: Vec<&LocalizedData> = self
            .localized
            .iter()
            .filter(|l| l.handle == script.handle)
            .collect();
        if !extra.is_empty() {
            let _ = writeln!(html, "<script id=\"{}-js-extra\">", esc_attr(&script.handle));
            for data in extra {
                let json = serde_json::to_string(&data.data)?;
                // 避免資料中的 "</script>" 提前結束標籤
                let _ = writeln!(html, "var {} = {};", data.object_name, json.replace("</", "<\\/"));
            }
            html.push_str("</script>\n");
        }
        let _ = writeln!(
            html,
            "<script src=\"{}\" id=\"{}-js\"></script>",
            esc_url(&script.src),
            esc_attr(&script.handle)
        );
        Ok(())
    }
}

fn enqueue(queue: &mut Vec<String>, handle: &str) -> bool {
    if queue.iter().any(|h| h == handle) {
        return false;
    }
    queue.push(handle.to_string());
    true
}

/// Enqueued assets in dependency order. An asset whose dependency chain
/// contains an unregistered handle is dropped.
fn resolve<'a>(registered: &'a BTreeMap<String, Asset>, queue: &[String]) -> Vec<&'a Asset> {
    let mut ordered = Vec::new();
    let mut done = HashSet::new();
    for handle in queue {
        let mut visiting = HashSet::new();
        let mut pending = Vec::new();
        if visit(registered, handle, &done, &mut visiting, &mut pending) {
            for asset in pending {
                if done.insert(asset.handle.clone()) {
                    ordered.push(asset);
                }
            }
        } else {
            tracing::warn!("Asset '{}' has missing or circular dependencies, not printed", handle);
        }
    }
    ordered
}

fn visit<'a>(
    registered: &'a BTreeMap<String, Asset>,
    handle: &str,
    done: &HashSet<String>,
    visiting: &mut HashSet<String>,
    out: &mut Vec<&'a Asset>,
) -> bool {
    if done.contains(handle) || out.iter().any(|a| a.handle == handle) {
        return true;
    }
    let Some(asset) = registered.get(handle) else {
        return false;
    };
    if !visiting.insert(handle.to_string()) {
        return false;
    }
    for dep in &asset.deps {
        if !visit(registered, dep, done, visiting, out) {
            return false;
        }
    }
    out.push(asset);
    true
}
