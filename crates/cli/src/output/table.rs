//! Table formatting for snapshot changes.

use morpho_rs_simulation::StateChange;
use serde_json::Value;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
}

pub(crate) fn truncate_address(addr: &str) -> String {
    if addr.len() > 10 {
        format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
    } else {
        addr.to_string()
    }
}

/// Shorten every `/`-separated segment of an entity key.
fn format_key(key: &str) -> String {
    key.split('/')
        .map(truncate_address)
        .collect::<Vec<_>>()
        .join("/")
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn format_changes_table(changes: &[StateChange]) -> String {
    if changes.is_empty() {
        return "No changes.".to_string();
    }

    let rows: Vec<ChangeRow> = changes
        .iter()
        .map(|change| ChangeRow {
            entity: change.entity.to_string(),
            key: format_key(&change.key),
            field: change.field.clone(),
            before: format_value(change.before.as_ref()),
            after: format_value(change.after.as_ref()),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()));

    table.to_string()
}
