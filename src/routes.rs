// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

/// Router completo, com `/api/v1/x/` e `/api/v1/x` caindo no mesmo handler.
pub fn build_app(app_state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(app_state))
}

pub fn build_router(app_state: AppState) -> Router {
    let prefix = app_state.settings.api_prefix.clone();
    let max_upload = app_state.settings.max_upload_bytes;

    // Única rota pública da API
    let public_routes = Router::new().route("/login/access-token", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users).post(handlers::users::create_user))
        .route("/me", get(handlers::users::get_me).put(handlers::users::update_me))
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        );

    let company_routes = Router::new()
        .route(
            "/",
            get(handlers::companies::list_companies).post(handlers::companies::create_company),
        )
        .route(
            "/{id}",
            get(handlers::companies::get_company)
                .put(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        )
        .route("/{id}/users", get(handlers::companies::list_company_users));

    let team_routes = Router::new()
        .route("/", get(handlers::teams::list_teams).post(handlers::teams::create_team))
        .route(
            "/{id}",
            get(handlers::teams::get_team)
                .put(handlers::teams::update_team)
                .delete(handlers::teams::delete_team),
        )
        .route(
            "/{id}/members",
            get(handlers::teams::list_members).post(handlers::teams::add_member),
        )
        .route(
            "/{id}/members/{user_id}",
            put(handlers::teams::update_member).delete(handlers::teams::remove_member),
        )
        .route("/{id}/projects", get(handlers::teams::list_team_projects));

    let project_routes = Router::new()
        .route(
            "/",
            get(handlers::projects::list_projects).post(handlers::projects::create_project),
        )
        .route(
            "/{id}",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route(
            "/{id}/teams",
            get(handlers::projects::list_project_teams).post(handlers::projects::assign_team),
        )
        .route(
            "/{id}/teams/{team_id}",
            axum::routing::delete(handlers::projects::unassign_team),
        )
        .route(
            "/{id}/tasks",
            get(handlers::projects::list_tasks).post(handlers::projects::create_task),
        )
        .route(
            "/{id}/tasks/{task_id}",
            put(handlers::projects::update_task).delete(handlers::projects::delete_task),
        )
        .route(
            "/{id}/updates",
            get(handlers::projects::list_updates).post(handlers::projects::create_update),
        );

    let property_routes = Router::new()
        .route(
            "/",
            get(handlers::properties::list_properties).post(handlers::properties::create_property),
        )
        .route("/project/{project_id}", get(handlers::properties::list_by_project))
        .route("/status/{status}", get(handlers::properties::list_by_status))
        .route(
            "/{id}",
            get(handlers::properties::get_property)
                .put(handlers::properties::update_property)
                .delete(handlers::properties::delete_property),
        )
        .route(
            "/{id}/updates",
            get(handlers::properties::list_updates).post(handlers::properties::create_update),
        );

    let client_routes = Router::new()
        .route("/", get(handlers::crm::list_clients).post(handlers::crm::create_client))
        .route(
            "/{id}",
            get(handlers::crm::get_client)
                .put(handlers::crm::update_client)
                .delete(handlers::crm::delete_client),
        )
        .route("/{id}/leads", get(handlers::crm::list_client_leads))
        .route("/{id}/contracts", get(handlers::crm::list_client_contracts));

    let lead_routes = Router::new()
        .route("/", get(handlers::crm::list_leads).post(handlers::crm::create_lead))
        .route("/property/{property_id}", get(handlers::crm::list_by_property))
        .route("/assigned/{user_id}", get(handlers::crm::list_by_assigned))
        .route("/status/{status}", get(handlers::crm::list_by_status))
        .route(
            "/{id}",
            get(handlers::crm::get_lead)
                .put(handlers::crm::update_lead)
                .delete(handlers::crm::delete_lead),
        );

    let contract_routes = Router::new()
        .route(
            "/",
            get(handlers::contracts::list_contracts).post(handlers::contracts::create_contract),
        )
        .route("/property/{property_id}", get(handlers::contracts::list_by_property))
        .route(
            "/{id}",
            get(handlers::contracts::get_contract)
                .put(handlers::contracts::update_contract)
                .delete(handlers::contracts::delete_contract),
        )
        .route(
            "/{id}/documents",
            get(handlers::documents::list_documents).post(handlers::documents::upload_document),
        )
        .route(
            "/{id}/documents/{document_id}",
            axum::routing::delete(handlers::documents::delete_document),
        );

    let expense_routes = Router::new()
        .route(
            "/",
            get(handlers::expenses::list_expenses).post(handlers::expenses::create_expense),
        )
        .route("/project/{project_id}", get(handlers::expenses::list_by_project))
        .route("/project/{project_id}/summary", get(handlers::expenses::project_summary))
        .route("/property/{property_id}", get(handlers::expenses::list_by_property))
        .route(
            "/{id}",
            get(handlers::expenses::get_expense)
                .put(handlers::expenses::update_expense)
                .delete(handlers::expenses::delete_expense),
        )
        .route("/{id}/receipt", put(handlers::expenses::upload_receipt));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/recent_activities", get(handlers::dashboard::get_recent_activities))
        .route("/active_projects", get(handlers::dashboard::get_active_projects));

    // Tudo abaixo exige Bearer de usuário ativo
    let protected_routes = Router::new()
        .route("/login/test-token", post(handlers::auth::test_token))
        .nest("/users", user_routes)
        .nest("/companies", company_routes)
        .nest("/teams", team_routes)
        .nest("/projects", project_routes)
        .nest("/properties", property_routes)
        .nest("/clients", client_routes)
        .nest("/leads", lead_routes)
        .nest("/contracts", contract_routes)
        .nest("/expenses", expense_routes)
        .nest("/dashboard", dashboard_routes)
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let api = public_routes.merge(protected_routes);

    // API_V1_STR="/" vira prefixo vazio e a API fica na raiz
    let app = Router::new().route("/", get(root)).route("/health", get(health));
    let app = if prefix.is_empty() { app.merge(api) } else { app.nest(&prefix, api) };

    app
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Bem-vindo à API de Gestão de Projetos Imobiliários" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Pool preguiçoso: nenhuma destas rotas chega a tocar no banco.
    fn app() -> NormalizePath<Router> {
        let settings = Settings::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://nobody@127.0.0.1:1/none".to_string()),
            "SECRET_KEY" => Some("segredo-de-teste".to_string()),
            "UPLOAD_DIR" => Some(std::env::temp_dir().display().to_string()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new().connect_lazy(&settings.database_url).unwrap();
        build_app(AppState::with_pool(pool, settings))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn trailing_slash_reaches_same_route() {
        let response = app()
            .oneshot(Request::get("/health/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_bearer() {
        let response = app()
            .oneshot(Request::get("/api/v1/projects").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Could not validate credentials" })
        );
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_before_the_database() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/dashboard/summary/")
                    .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let response = app()
            .oneshot(
                Request::post("/api/v1/login/test-token")
                    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let response = app()
            .oneshot(Request::get("/api/v1/nada").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
