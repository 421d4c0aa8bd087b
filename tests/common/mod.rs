//! Common test utilities
//!
//! Shared page fixtures for the integration tests. Each fixture scripts a
//! [`MockDriver`] with the elements of a small page and hands back a fresh
//! context tree over it.

#![allow(dead_code)]

use locator_context::driver::MockDriver;
use locator_context::{Config, ContextTree, ElementHandle, Query, SearchScope};
use std::sync::Arc;

/// A data grid page: `<table id="grid">` with three body rows
pub struct GridPage {
    pub driver: Arc<MockDriver>,
    pub tree: ContextTree,
    pub grid: ElementHandle,
    pub rows: Vec<ElementHandle>,
}

/// Setup the grid page with the default configuration
pub async fn setup_grid_page() -> GridPage {
    setup_grid_page_with(Config::default()).await
}

/// Setup the grid page with a custom configuration
pub async fn setup_grid_page_with(config: Config) -> GridPage {
    let driver = Arc::new(MockDriver::new());

    let grid = driver
        .register_one(Query::id("grid"), SearchScope::Document)
        .await;
    driver
        .set_path(&grid, Query::xpath("/html/body/div/table"))
        .await;

    let rows = driver
        .register(Query::xpath("//*[@id='grid']//tr"), SearchScope::Document, 3)
        .await;
    for (i, row) in rows.iter().enumerate() {
        let path = format!("/html/body/div/table/tbody/tr[{}]", i + 1);
        driver.set_path(row, Query::xpath(path)).await;
    }

    let tree = ContextTree::with_config(driver.clone(), config);
    GridPage {
        driver,
        tree,
        grid,
        rows,
    }
}

/// Register one cell per row, keyed by the row's structural path
pub async fn register_cells(page: &GridPage, column: usize) -> Vec<ElementHandle> {
    let mut cells = Vec::with_capacity(page.rows.len());
    for i in 0..page.rows.len() {
        let path = format!(
            "/html/body/div/table/tbody/tr[{}]/td[{}]",
            i + 1,
            column
        );
        cells.push(
            page.driver
                .register_one(Query::xpath(path), SearchScope::Document)
                .await,
        );
    }
    cells
}

/// Get test HTML content matching the grid page fixture
pub fn get_test_html() -> String {
    r#"<!DOCTYPE html>
<html>
<body>
    <div>
        <table id="grid">
            <tbody>
                <tr><td>a1</td><td>a2</td></tr>
                <tr><td>b1</td><td>b2</td></tr>
                <tr><td>c1</td><td>c2</td></tr>
            </tbody>
        </table>
    </div>
</body>
</html>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_grid_page() {
        let page = setup_grid_page().await;
        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.tree.node_count(), 1);
        assert_eq!(page.driver.call_count().await, 0);
        assert!(get_test_html().contains("id=\"grid\""));
    }
}
