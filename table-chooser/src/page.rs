//! The demo page: two table choosers, one in the sidebar and one in the main panel.
use crate::{
    catalog::Catalog,
    chooser::{TableChooser, TableSelection},
};
use anyhow::Result;
use widget_state::{Scope, Session, Widget};

pub const CHOOSE_TABLES: &str = "Choose some tables";
pub const SOMETHING_ELSE: &str = "Something else";

/// Marker type for the page-level state partition.
pub struct Page;

/// Widgets created during one pass of the demo page.
pub struct PageView {
    pub mode: Scope,
    pub sidebar: Option<TableChooser>,
    pub main: Option<TableChooser>,
    pub lines: Vec<String>,
}

impl PageView {
    /// Both selected tables, once both choosers are complete.
    pub fn selected_tables(&self) -> Option<(String, String)> {
        let first = self.sidebar.as_ref()?.output()?;
        let second = self.main.as_ref()?.output()?;
        Some((first, second))
    }
}

/// Sets the radio button at the top of the page.
pub fn choose(mode: &Scope, choice: &str) -> Result<()> {
    Ok(mode.set("choice", choice.to_owned())?)
}

fn sidebar(session: &Session, catalog: &dyn Catalog) -> Result<TableChooser> {
    TableChooser::new(session, catalog, TableSelection::default())
}

fn main_panel(session: &Session, catalog: &dyn Catalog) -> Result<TableChooser> {
    TableChooser::new(
        session,
        catalog,
        TableSelection::initial(Some("SCRATCH"), Some("PUBLIC"), Some("CUSTOMERS")),
    )
}

/// Runs one pass of the page.
///
/// The main-panel chooser is only created once the sidebar chooser has a complete selection.
pub fn run_pass(session: &Session, catalog: &dyn Catalog) -> Result<PageView> {
    session.begin_pass()?;

    let mode = Scope::shared::<Page>(session)?;
    let mut view = PageView {
        mode,
        sidebar: None,
        main: None,
        lines: vec!["# Widget reuse demo".to_owned()],
    };

    let choice = view.mode.get("choice", CHOOSE_TABLES.to_owned())?;
    view.lines.push(format!("What should we do? [{}]", choice));
    if choice == SOMETHING_ELSE {
        view.lines.push("ok, fine".to_owned());
        return Ok(view);
    }

    view.lines.push("## Select the first table".to_owned());
    let first = sidebar(session, catalog)?;
    view.lines.extend(first.render());
    let first_complete = first.output().is_some();
    view.sidebar = Some(first);
    if !first_complete {
        return Ok(view);
    }

    view.lines.push("## Select the second table".to_owned());
    let second = main_panel(session, catalog)?;
    view.lines.extend(second.render());
    view.main = Some(second);

    if let Some((first, second)) = view.selected_tables() {
        view.lines.push(format!("[table {}]", first));
        view.lines.push(format!("[table {}]", second));
    }
    Ok(view)
}
