use anyhow::Result;
use table_chooser::{
    page::{self, PageView},
    sample_catalog, CachedCatalog,
};
use tracing::info;
use widget_state::{Config, MemoryStore, Session};

/// A user interaction, applied to the widgets of the pass that displayed them.
type Step = Box<dyn Fn(&PageView) -> Result<()>>;

fn print(view: &PageView) {
    for line in view.lines.iter() {
        println!("{}", line);
    }
    println!();
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config {
        show_origins: std::env::var_os("SHOW_COMPONENT_ORIGINS").is_some(),
        ..Config::default()
    };
    let session = Session::with_config(MemoryStore::new(), config);
    let catalog = CachedCatalog::new(sample_catalog());

    let steps: Vec<(&str, Step)> = vec![
        (
            "select database",
            Box::new(|v: &PageView| sidebar(v)?.select_database(Some("SALES"))) as Step,
        ),
        (
            "select schema",
            Box::new(|v: &PageView| sidebar(v)?.select_schema(Some("PUBLIC"))) as Step,
        ),
        (
            "select table",
            Box::new(|v: &PageView| sidebar(v)?.select_table(Some("ORDERS"))) as Step,
        ),
        (
            "change second table",
            Box::new(|v: &PageView| main_panel(v)?.change_selection()) as Step,
        ),
        (
            "select other table",
            Box::new(|v: &PageView| main_panel(v)?.select_table(Some("PRODUCTS"))) as Step,
        ),
        (
            "leave",
            Box::new(|v: &PageView| page::choose(&v.mode, page::SOMETHING_ELSE)) as Step,
        ),
        (
            "come back",
            Box::new(|v: &PageView| page::choose(&v.mode, page::CHOOSE_TABLES)) as Step,
        ),
    ];

    let mut view = page::run_pass(&session, &catalog)?;
    print(&view);
    for (name, step) in steps.iter() {
        info!(step = %name, "user interaction");
        step(&view)?;
        view = page::run_pass(&session, &catalog)?;
        print(&view);
    }

    session.dump();
    if let Some((first, second)) = view.selected_tables() {
        info!(first = %first, second = %second, "selected tables");
    }
    Ok(())
}

fn sidebar(view: &PageView) -> Result<&table_chooser::TableChooser> {
    view.sidebar
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("the sidebar chooser is not displayed"))
}

fn main_panel(view: &PageView) -> Result<&table_chooser::TableChooser> {
    view.main
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("the main panel chooser is not displayed"))
}
