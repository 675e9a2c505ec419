use axum::{extract::Query, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
}

fn catalog() -> Vec<Item> {
    ["anvil", "bellows", "chisel"]
        .iter()
        .zip(1..)
        .map(|(name, id)| Item {
            id,
            name: name.to_string(),
        })
        .collect()
}

pub async fn list_items(Query(query): Query<ItemQuery>) -> Json<Value> {
    info!(id = ?query.id, "List items requested");

    let items: Vec<Item> = catalog()
        .into_iter()
        .filter(|item| query.id.map_or(true, |id| item.id == id))
        .collect();

    Json(json!({
        "items": items,
        "total": items.len(),
    }))
}
