//! In-memory fake of the Knack records API.
//!
//! Serves object routes (`/objects/{key}/records`) and view routes
//! (`/pages/{scene}/views/{view}/records`) with the same auth headers the
//! real API checks. Each object and each view owns its own record list.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub type Record = Map<String, Value>;

type Db = Arc<RwLock<HashMap<String, Vec<Record>>>>;

/// Credentials the server accepts.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub application_id: String,
    pub api_key: String,
    pub token: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            application_id: "test-app-id".to_string(),
            api_key: "test-api-key".to_string(),
            token: "test-token".to_string(),
        }
    }
}

#[derive(Clone)]
struct AppState {
    credentials: Arc<Credentials>,
    db: Db,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub rows_per_page: Option<usize>,
    pub page: Option<usize>,
    pub filters: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Filters {
    #[serde(rename = "match")]
    match_mode: String,
    rules: Vec<Rule>,
}

#[derive(Debug, Deserialize)]
struct Rule {
    field: String,
    operator: String,
    #[serde(default)]
    value: Value,
}

const DEFAULT_ROWS_PER_PAGE: usize = 25;

pub fn app(credentials: Credentials) -> Router {
    let state = AppState {
        credentials: Arc::new(credentials),
        db: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route(
            "/objects/{object_key}/records",
            get(list_object_records).post(create_object_record),
        )
        .route(
            "/objects/{object_key}/records/{id}",
            get(get_object_record)
                .put(update_object_record)
                .delete(delete_object_record),
        )
        .route(
            "/pages/{scene_key}/views/{view_key}/records",
            get(list_view_records).post(create_view_record),
        )
        .route(
            "/pages/{scene_key}/views/{view_key}/records/{id}",
            get(get_view_record)
                .put(update_view_record)
                .delete(delete_view_record),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app(credentials)).await
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn authorize_object(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let creds = &state.credentials;
    if header(headers, "x-knack-application-id") == Some(creds.application_id.as_str())
        && header(headers, "x-knack-rest-api-key") == Some(creds.api_key.as_str())
    {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn authorize_view(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let creds = &state.credentials;
    if header(headers, "x-knack-application-id") == Some(creds.application_id.as_str())
        && header(headers, "authorization") == Some(creds.token.as_str())
    {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn view_collection(scene_key: &str, view_key: &str) -> String {
    format!("{scene_key}/{view_key}")
}

// ---------------------------------------------------------------------------
// Object handlers
// ---------------------------------------------------------------------------

async fn list_object_records(
    State(state): State<AppState>,
    Path(object_key): Path<String>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorize_object(&state, &headers)?;
    list_records(&state, &object_key, params).await
}

async fn create_object_record(
    State(state): State<AppState>,
    Path(object_key): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    authorize_object(&state, &headers)?;
    Ok(create_record(&state, &object_key, input).await)
}

async fn get_object_record(
    State(state): State<AppState>,
    Path((object_key, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Record>, StatusCode> {
    authorize_object(&state, &headers)?;
    get_record(&state, &object_key, &id).await
}

async fn update_object_record(
    State(state): State<AppState>,
    Path((object_key, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    authorize_object(&state, &headers)?;
    update_record(&state, &object_key, &id, input).await
}

async fn delete_object_record(
    State(state): State<AppState>,
    Path((object_key, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorize_object(&state, &headers)?;
    delete_record(&state, &object_key, &id).await
}

// ---------------------------------------------------------------------------
// View handlers
// ---------------------------------------------------------------------------

async fn list_view_records(
    State(state): State<AppState>,
    Path((scene_key, view_key)): Path<(String, String)>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorize_view(&state, &headers)?;
    list_records(&state, &view_collection(&scene_key, &view_key), params).await
}

async fn create_view_record(
    State(state): State<AppState>,
    Path((scene_key, view_key)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    authorize_view(&state, &headers)?;
    Ok(create_record(&state, &view_collection(&scene_key, &view_key), input).await)
}

async fn get_view_record(
    State(state): State<AppState>,
    Path((scene_key, view_key, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<Record>, StatusCode> {
    authorize_view(&state, &headers)?;
    get_record(&state, &view_collection(&scene_key, &view_key), &id).await
}

async fn update_view_record(
    State(state): State<AppState>,
    Path((scene_key, view_key, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(input): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    authorize_view(&state, &headers)?;
    update_record(&state, &view_collection(&scene_key, &view_key), &id, input).await
}

async fn delete_view_record(
    State(state): State<AppState>,
    Path((scene_key, view_key, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorize_view(&state, &headers)?;
    delete_record(&state, &view_collection(&scene_key, &view_key), &id).await
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

async fn list_records(state: &AppState, collection: &str, params: ListParams) -> Result<Json<Value>, StatusCode> {
    let filters = match params.filters.as_deref() {
        Some(raw) => Some(serde_json::from_str::<Filters>(raw).map_err(|_| StatusCode::BAD_REQUEST)?),
        None => None,
    };

    let db = state.db.read().await;
    let mut records: Vec<Record> = db
        .get(collection)
        .map(|records| {
            records
                .iter()
                .filter(|r| filters.as_ref().map_or(true, |f| f.accepts(r)))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    drop(db);

    if let Some(field) = params.sort_field.as_deref() {
        records.sort_by(|a, b| compare_field(a, b, field));
        if params.sort_order.as_deref() == Some("desc") {
            records.reverse();
        }
    }

    let rows_per_page = params.rows_per_page.unwrap_or(DEFAULT_ROWS_PER_PAGE).max(1);
    let page = params.page.unwrap_or(1).max(1);
    let total_records = records.len();
    let total_pages = total_records.div_ceil(rows_per_page).max(1);
    let page_records: Vec<Record> = records
        .into_iter()
        .skip((page - 1).saturating_mul(rows_per_page))
        .take(rows_per_page)
        .collect();
    debug!(collection, total_records, page, "listed records");

    Ok(Json(json!({
        "total_pages": total_pages,
        "current_page": page,
        "total_records": total_records,
        "records": page_records,
    })))
}

async fn create_record(state: &AppState, collection: &str, mut input: Record) -> Json<Record> {
    input.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    state
        .db
        .write()
        .await
        .entry(collection.to_string())
        .or_default()
        .push(input.clone());
    Json(input)
}

async fn get_record(state: &AppState, collection: &str, id: &str) -> Result<Json<Record>, StatusCode> {
    let db = state.db.read().await;
    db.get(collection)
        .and_then(|records| records.iter().find(|r| has_id(r, id)))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_record(state: &AppState, collection: &str, id: &str, input: Record) -> Result<Json<Record>, StatusCode> {
    let mut db = state.db.write().await;
    let record = db
        .get_mut(collection)
        .and_then(|records| records.iter_mut().find(|r| has_id(r, id)))
        .ok_or(StatusCode::NOT_FOUND)?;
    for (field, value) in input {
        if field != "id" {
            record.insert(field, value);
        }
    }
    Ok(Json(record.clone()))
}

async fn delete_record(state: &AppState, collection: &str, id: &str) -> Result<Json<Value>, StatusCode> {
    let mut db = state.db.write().await;
    let records = db.get_mut(collection).ok_or(StatusCode::NOT_FOUND)?;
    let index = records.iter().position(|r| has_id(r, id)).ok_or(StatusCode::NOT_FOUND)?;
    records.remove(index);
    Ok(Json(json!({ "delete": true })))
}

fn has_id(record: &Record, id: &str) -> bool {
    record.get("id").and_then(Value::as_str) == Some(id)
}

fn compare_field(a: &Record, b: &Record, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => text(x).cmp(&text(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Filters {
    fn accepts(&self, record: &Record) -> bool {
        let mut results = self.rules.iter().map(|rule| rule.accepts(record));
        if self.match_mode == "or" {
            results.any(|ok| ok)
        } else {
            results.all(|ok| ok)
        }
    }
}

impl Rule {
    fn accepts(&self, record: &Record) -> bool {
        let actual = record.get(&self.field).map(text).unwrap_or_default();
        let expected = text(&self.value);
        match self.operator.as_str() {
            "is" => actual == expected,
            "is not" => actual != expected,
            "contains" => actual.contains(&expected),
            "does not contain" => !actual.contains(&expected),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: Value) -> Record {
        pairs.as_object().unwrap().clone()
    }

    #[test]
    fn filters_parse_from_query_string_json() {
        let filters: Filters = serde_json::from_str(
            r#"{"match":"and","rules":[{"field":"field_1","operator":"is","value":"test"}]}"#,
        )
        .unwrap();
        assert_eq!(filters.match_mode, "and");
        assert_eq!(filters.rules.len(), 1);
        assert!(filters.accepts(&record(json!({"field_1": "test"}))));
        assert!(!filters.accepts(&record(json!({"field_1": "other"}))));
    }

    #[test]
    fn or_filters_accept_any_rule() {
        let filters: Filters = serde_json::from_str(
            r#"{"match":"or","rules":[{"field":"a","operator":"is","value":1},{"field":"b","operator":"contains","value":"x"}]}"#,
        )
        .unwrap();
        assert!(filters.accepts(&record(json!({"a": 2, "b": "xyz"}))));
        assert!(filters.accepts(&record(json!({"a": 1, "b": ""}))));
        assert!(!filters.accepts(&record(json!({"a": 2, "b": "abc"}))));
    }

    #[test]
    fn numbers_sort_numerically() {
        let a = record(json!({"n": 9}));
        let b = record(json!({"n": 10}));
        assert_eq!(compare_field(&a, &b, "n"), Ordering::Less);
    }

    #[test]
    fn list_params_all_optional() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        assert!(params.sort_field.is_none());
        assert!(params.filters.is_none());
    }
}
