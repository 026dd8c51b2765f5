use anyhow::Context;
use clap::Parser;
use site_directory::core::map::LEAFLET_HANDLE;
use site_directory::utils::{logger, validation::Validate};
use site_directory::{
    AssetRegistry, CliConfig, InMemoryNetwork, NetworkConfig, RenderContext, ShortcodeRegistry,
    SiteDirectory, SHORTCODE_TAG,
};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting site-directory CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let network = NetworkConfig::from_file(&config.network)
        .with_context(|| format!("failed to load network file {}", config.network))?;
    if let Err(e) = network.validate() {
        tracing::error!("❌ Network file is invalid: {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = InMemoryNetwork::from_config(&network)?;

    // 宿主頁面本身提供的函式庫
    let mut assets = AssetRegistry::new();
    assets.register_script("jquery", &network.assets.jquery_script, &[], false);
    assets.register_script(LEAFLET_HANDLE, &network.assets.leaflet_script, &[], true);
    assets.register_style(LEAFLET_HANDLE, &network.assets.leaflet_style, &[]);

    let directory = SiteDirectory::new(store, network);
    let mut shortcodes = ShortcodeRegistry::new();
    directory.register(&mut shortcodes, &mut assets);
    tracing::debug!("Registered shortcodes: {:?}", shortcodes.tags().collect::<Vec<_>>());

    let mut ctx = RenderContext::new(config.current_site, assets);

    let html = match &config.page {
        Some(page) => {
            let template = std::fs::read_to_string(page)
                .with_context(|| format!("failed to read page template {}", page))?;
            shortcodes.expand(&mut ctx, &template)
        }
        None => shortcodes
            .invoke(SHORTCODE_TAG, &mut ctx, &config.raw_attributes(), config.content.as_deref())
            .unwrap_or_default(),
    };

    let rendered = ctx.invocation();
    let assets = ctx.into_assets();

    if config.with_assets {
        print!("{}", assets.print_head()?);
    }
    println!("{}", html);
    if config.with_assets {
        print!("{}", assets.print_footer()?);
    }

    tracing::info!("✅ Rendered {} shortcode invocation(s)", rendered);
    Ok(())
}
