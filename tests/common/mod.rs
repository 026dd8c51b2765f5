#![allow(dead_code)]

use site_directory::{
    AssetRegistry, InMemoryNetwork, NetworkConfig, RenderContext, ShortcodeRegistry, SiteDirectory,
};

pub const NETWORK: &str = r#"
[network]
main_site = 1
plugin_url = "https://example.com/wp-content/plugins/multisite-directory"

[[sites]]
id = 1
name = "Network Home"
url = "https://example.com"

[[sites]]
id = 2
name = "Harbor News"
url = "https://harbor.example.com"

[[sites]]
id = 3
name = "Valley Sports"
url = "https://valley.example.com"
custom_logo = { src = "https://valley.example.com/logo.png", alt = "" }

[[sites]]
id = 4
name = "Quiet <Town> & Co"
url = "https://quiet.example.com/?a=1&b=2"

[[terms]]
id = 10
name = "News"
slug = "news"
geo = "42.36,-71.06"

[[terms]]
id = 11
name = "Sports"
slug = "sports"
geo = "40.71,-74.01"

[[terms]]
id = 12
name = "Empty"
slug = "empty"

[[terms]]
id = 13
name = "Structured"
slug = "structured"
geo = [1.5, 2.5]

[[entries]]
id = 100
site = 2
name = "harbor-news"
title = "Harbor News"
excerpt = "Daily news from the harbor"
categories = ["news"]
thumbnail = { src = "https://harbor.example.com/logo.png", alt = "Harbor" }

[[entries]]
id = 101
site = 3
name = "valley-sports"
title = "Valley Sports"
categories = ["sports", "news"]

[[entries]]
id = 102
site = 4
name = "quiet-town"
title = "Quiet Town"
categories = ["sports"]
"#;

pub fn network_config() -> NetworkConfig {
    NetworkConfig::from_toml_str(NETWORK).unwrap()
}

pub fn directory() -> SiteDirectory<InMemoryNetwork, NetworkConfig> {
    let config = network_config();
    let store = InMemoryNetwork::from_config(&config).unwrap();
    SiteDirectory::new(store, config)
}

/// Registry with the host libraries and the directory's own assets declared.
pub fn setup<'a>(
    directory: &'a SiteDirectory<InMemoryNetwork, NetworkConfig>,
    current_site: u64,
) -> (ShortcodeRegistry<'a>, RenderContext) {
    let mut assets = AssetRegistry::new();
    assets.register_script("jquery", "https://code.jquery.com/jquery.js", &[], false);
    assets.register_script("leaflet", "https://unpkg.com/leaflet.js", &[], true);
    assets.register_style("leaflet", "https://unpkg.com/leaflet.css", &[]);

    let mut shortcodes = ShortcodeRegistry::new();
    directory.register(&mut shortcodes, &mut assets);
    (shortcodes, RenderContext::new(current_site, assets))
}
