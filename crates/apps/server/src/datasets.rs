use axum::extract::{Path as AxumPath, Query, State};
use axum::Json;
use catalog::SortOrder;
use formats::Table;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl TableQuery {
    pub fn sort_column(&self) -> Option<&str> {
        self.sort_by.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order.as_deref().map(SortOrder::parse).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct FileList {
    pub files: Vec<String>,
}

pub async fn list_dataset(
    State(state): State<AppState>,
    AxumPath(dataset): AxumPath<String>,
) -> Result<Json<FileList>, ApiError> {
    let files = state.store.list(&dataset).await?;
    Ok(Json(FileList { files }))
}

pub async fn get_table(
    State(state): State<AppState>,
    AxumPath((dataset, file)): AxumPath<(String, String)>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Table>, ApiError> {
    let table = state
        .store
        .load_sorted(&dataset, &file, query.sort_column(), query.sort_order())
        .await?;
    Ok(Json(table))
}
