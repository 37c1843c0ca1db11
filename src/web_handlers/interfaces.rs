use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::AuthenticatedUser;
use crate::error::{Error, ErrorClass};
use crate::interfaces::{ConversionOptions, ConversionResult};
use crate::models::subscription::DEFAULT_UPDATE_INTERVAL_HOURS;
use crate::models::{AppState, ProxyNode};
use crate::parser::explode_batch;
use crate::storage::subscription_store::DEFAULT_HISTORY_LIMIT;

type State = web::Data<Arc<AppState>>;

/// Maps a service error onto a JSON error response.
pub fn error_response(err: &Error) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    if let Error::ExternalFetch(_) = err {
        return HttpResponse::BadGateway().json(body);
    }
    match err.class() {
        ErrorClass::BadInput => HttpResponse::BadRequest().json(body),
        ErrorClass::NotFound => HttpResponse::NotFound().json(body),
        ErrorClass::ServerFault => {
            error!("Request failed: {}", err);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

/// Runs store and catalog work on the blocking pool.
async fn run_blocking<F, T>(f: F) -> Result<T, HttpResponse>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match web::block(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(&err)),
        Err(err) => {
            error!("Blocking task failed: {}", err);
            Err(HttpResponse::InternalServerError().json(json!({ "error": "Internal error" })))
        }
    }
}

fn conversion_response(req: &HttpRequest, state: &AppState, result: &ConversionResult) -> HttpResponse {
    let info = req.connection_info();
    let url = state.subscription_url(info.scheme(), info.host(), &result.token);
    HttpResponse::Ok().json(json!({
        "success": true,
        "token": result.token,
        "url": url,
        "proxies_count": result.proxies_count,
        "failures": result.failures,
        "rule": result.rule,
        "auto_update": result.auto_update,
        "update_interval_hours": result.update_interval_hours,
        "traffic_limit_gb": result.traffic_limit_gb,
    }))
}

#[derive(Deserialize, Debug)]
pub struct LinksRequest {
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(flatten)]
    pub options: ConversionOptions,
}

#[derive(Deserialize, Debug)]
pub struct GenerateRequest {
    #[serde(default)]
    pub nodes: Vec<ProxyNode>,
    #[serde(flatten)]
    pub options: ConversionOptions,
}

/// Query parameters for converting a remote subscription
#[derive(Deserialize, Debug, Default)]
pub struct SubscriptionQuery {
    pub url: Option<String>,
    pub rule: Option<String>,
    pub config_name: Option<String>,
    pub auto_update: Option<bool>,
    pub update_interval_hours: Option<u32>,
    pub traffic_limit_gb: Option<u64>,
}

impl SubscriptionQuery {
    fn options(&self) -> ConversionOptions {
        ConversionOptions {
            rule: self.rule.clone().unwrap_or_else(|| "default".to_string()),
            config_name: self.config_name.clone(),
            auto_update: self.auto_update.unwrap_or(true),
            update_interval_hours: self
                .update_interval_hours
                .unwrap_or(DEFAULT_UPDATE_INTERVAL_HOURS),
            traffic_limit_gb: self.traffic_limit_gb.unwrap_or(0),
        }
        .config_name_or("Subscription Config")
    }
}

/// Parses links without storing anything, so the caller can edit the nodes.
pub async fn parse_links_handler(
    _user: AuthenticatedUser,
    body: web::Json<LinksRequest>,
) -> HttpResponse {
    let outcome = explode_batch(&body.links);
    debug!(
        "Parsed {} nodes, {} failures",
        outcome.nodes.len(),
        outcome.failures
    );
    HttpResponse::Ok().json(json!({
        "nodes": outcome.nodes,
        "failures": outcome.failures,
    }))
}

pub async fn generate_config_handler(
    req: HttpRequest,
    _user: AuthenticatedUser,
    body: web::Json<GenerateRequest>,
    state: State,
) -> HttpResponse {
    let GenerateRequest { nodes, options } = body.into_inner();
    let options = options.config_name_or("My Subscription Config");
    let converter = state.converter.clone();
    match run_blocking(move || converter.generate_from_nodes(nodes, &options)).await {
        Ok(result) => conversion_response(&req, &state, &result),
        Err(resp) => resp,
    }
}

pub async fn convert_links_handler(
    req: HttpRequest,
    _user: AuthenticatedUser,
    body: web::Json<LinksRequest>,
    state: State,
) -> HttpResponse {
    let LinksRequest { links, options } = body.into_inner();
    let options = options.config_name_or("My Subscription Config");
    let converter = state.converter.clone();
    match run_blocking(move || converter.convert_links(links.as_slice(), &options)).await {
        Ok(result) => conversion_response(&req, &state, &result),
        Err(resp) => resp,
    }
}

pub async fn convert_sub_handler(
    req: HttpRequest,
    _user: AuthenticatedUser,
    query: web::Query<SubscriptionQuery>,
    state: State,
) -> HttpResponse {
    let Some(url) = query.url.as_deref().filter(|u| !u.trim().is_empty()) else {
        return error_response(&Error::Validation("Missing subscription URL".to_string()));
    };
    match state
        .converter
        .convert_subscription(url, &query.options())
        .await
    {
        Ok(result) => conversion_response(&req, &state, &result),
        Err(err) => error_response(&err),
    }
}

/// Serves a stored profile to Clash clients. No credentials required; the
/// token is the secret.
pub async fn clash_profile_handler(path: web::Path<String>, state: State) -> HttpResponse {
    let token = path.into_inner();
    let converter = state.converter.clone();
    match run_blocking(move || converter.fetch_profile(&token)).await {
        Ok(profile) => {
            let mut response = HttpResponse::Ok();
            for (key, value) in &profile.headers {
                response.insert_header((*key, value.as_str()));
            }
            response.body(profile.document)
        }
        Err(resp) => resp,
    }
}

#[derive(Deserialize, Debug)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn history_handler(
    _user: AuthenticatedUser,
    query: web::Query<HistoryQuery>,
    state: State,
) -> HttpResponse {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let store = state.subscriptions.clone();
    match run_blocking(move || store.history(limit)).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(resp) => resp,
    }
}

pub async fn delete_history_handler(
    _user: AuthenticatedUser,
    path: web::Path<String>,
    state: State,
) -> HttpResponse {
    let token = path.into_inner();
    let store = state.subscriptions.clone();
    match run_blocking(move || store.delete(&token)).await {
        Ok(_) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(resp) => resp,
    }
}

pub async fn clear_history_handler(_user: AuthenticatedUser, state: State) -> HttpResponse {
    let store = state.subscriptions.clone();
    match run_blocking(move || store.delete_all()).await {
        Ok(removed) => HttpResponse::Ok().json(json!({ "success": true, "removed": removed })),
        Err(resp) => resp,
    }
}

#[derive(Deserialize, Debug)]
pub struct RuleRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
}

pub async fn list_rules_handler(_user: AuthenticatedUser, state: State) -> HttpResponse {
    let catalog = state.catalog.clone();
    match run_blocking(move || catalog.list()).await {
        Ok(listing) => HttpResponse::Ok().json(listing),
        Err(resp) => resp,
    }
}

pub async fn create_rule_handler(
    _user: AuthenticatedUser,
    body: web::Json<RuleRequest>,
    state: State,
) -> HttpResponse {
    let rule = body.into_inner();
    let catalog = state.catalog.clone();
    match run_blocking(move || catalog.create_custom(&rule.name, &rule.description, &rule.content))
        .await
    {
        Ok(record) => HttpResponse::Ok().json(json!({ "success": true, "id": record.id })),
        Err(resp) => resp,
    }
}

pub async fn get_rule_handler(
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    state: State,
) -> HttpResponse {
    let id = path.into_inner();
    let catalog = state.catalog.clone();
    match run_blocking(move || catalog.get(id)).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(resp) => resp,
    }
}

pub async fn update_rule_handler(
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<RuleRequest>,
    state: State,
) -> HttpResponse {
    let id = path.into_inner();
    let rule = body.into_inner();
    let catalog = state.catalog.clone();
    match run_blocking(move || {
        catalog.update_custom(id, &rule.name, &rule.description, &rule.content)
    })
    .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(resp) => resp,
    }
}

pub async fn delete_rule_handler(
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    state: State,
) -> HttpResponse {
    let id = path.into_inner();
    let catalog = state.catalog.clone();
    match run_blocking(move || catalog.delete_custom(id)).await {
        Ok(_) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(resp) => resp,
    }
}

pub async fn rule_by_name_handler(
    _user: AuthenticatedUser,
    path: web::Path<String>,
    state: State,
) -> HttpResponse {
    let name = path.into_inner();
    let catalog = state.catalog.clone();
    match run_blocking(move || catalog.get_by_name(&name)).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(resp) => resp,
    }
}

pub async fn restore_rule_handler(
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    state: State,
) -> HttpResponse {
    let id = path.into_inner();
    let catalog = state.catalog.clone();
    match run_blocking(move || catalog.restore_builtin(id)).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Rule restored successfully",
        })),
        Err(resp) => resp,
    }
}

#[derive(Deserialize, Debug)]
pub struct ChangeAccountRequest {
    pub current_password: String,
    pub new_username: Option<String>,
    pub new_password: Option<String>,
}

pub async fn change_account_handler(
    user: AuthenticatedUser,
    body: web::Json<ChangeAccountRequest>,
    state: State,
) -> HttpResponse {
    let request = body.into_inner();
    let accounts = state.accounts.clone();
    let result = run_blocking(move || {
        if !accounts.verify_user(&user.username, &request.current_password)? {
            return Err(Error::Validation("Current password incorrect".to_string()));
        }
        let new_username = request
            .new_username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| user.username.clone());
        let new_password = request
            .new_password
            .filter(|password| !password.is_empty())
            .unwrap_or(request.current_password);
        accounts.change_account(&user.username, &new_username, &new_password)
    })
    .await;
    match result {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(resp) => resp,
    }
}

pub async fn get_runtime_setting_handler(
    _user: AuthenticatedUser,
    path: web::Path<String>,
    state: State,
) -> HttpResponse {
    let key = path.into_inner();
    let config = state.runtime_config.clone();
    let lookup = key.clone();
    match run_blocking(move || config.get_value(&lookup)).await {
        Ok(value) => HttpResponse::Ok().json(json!({ "key": key, "value": value })),
        Err(resp) => resp,
    }
}

#[derive(Deserialize, Debug)]
pub struct RuntimeSettingRequest {
    pub value: Value,
}

pub async fn set_runtime_setting_handler(
    _user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<RuntimeSettingRequest>,
    state: State,
) -> HttpResponse {
    let key = path.into_inner();
    let value = body.into_inner().value;
    let config = state.runtime_config.clone();
    let stored = key.clone();
    match run_blocking(move || config.set(&stored, &value)).await {
        Ok(()) => {
            info!("Runtime setting '{}' updated", key);
            HttpResponse::Ok().json(json!({ "success": true }))
        }
        Err(resp) => resp,
    }
}

pub async fn github_info_handler(_user: AuthenticatedUser, state: State) -> HttpResponse {
    match state.github.repo_info().await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(err) => {
            error!("Repository lookup failed: {}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch repository information" }))
        }
    }
}

pub async fn github_release_handler(_user: AuthenticatedUser, state: State) -> HttpResponse {
    match state.github.latest_release().await {
        Ok(release) => HttpResponse::Ok().json(release),
        Err(err) => {
            error!("Release lookup failed: {}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch release information" }))
        }
    }
}

/// Registers every route; the caller decides the mount point.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/clash/{token}", web::get().to(clash_profile_handler))
        .service(
            web::scope("/api")
                .route("/parse/links", web::post().to(parse_links_handler))
                .route("/generate/config", web::post().to(generate_config_handler))
                .route("/convert/links", web::post().to(convert_links_handler))
                .route("/convert/sub", web::get().to(convert_sub_handler))
                .route("/history", web::get().to(history_handler))
                .route("/history", web::delete().to(clear_history_handler))
                .route("/history/{token}", web::delete().to(delete_history_handler))
                .route("/rules", web::get().to(list_rules_handler))
                .route("/rules", web::post().to(create_rule_handler))
                .route("/rules/by-name/{name}", web::get().to(rule_by_name_handler))
                .route("/rules/{id}", web::get().to(get_rule_handler))
                .route("/rules/{id}", web::put().to(update_rule_handler))
                .route("/rules/{id}", web::delete().to(delete_rule_handler))
                .route("/rules/{id}/restore", web::post().to(restore_rule_handler))
                .route("/change-account", web::post().to(change_account_handler))
                .route(
                    "/settings/runtime/{key}",
                    web::get().to(get_runtime_setting_handler),
                )
                .route(
                    "/settings/runtime/{key}",
                    web::put().to(set_runtime_setting_handler),
                )
                .route("/github/info", web::get().to(github_info_handler))
                .route(
                    "/github/releases/latest",
                    web::get().to(github_release_handler),
                ),
        );
}
