// src/company_handlers.rs
//! Company routes. Reads are public, writes require an admin token.

use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::auth::ensure_admin;
use crate::error::ApiResult;
use crate::models::{Company, CompanyQuery, CreateCompanyRequest, UpdateCompanyRequest};
use crate::AppState;

// ==================== LIST COMPANIES ====================

pub async fn list_companies(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<CompanyQuery>,
) -> ApiResult<HttpResponse> {
    let companies = Company::find_all(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(json!({ "companies": companies })))
}

// ==================== GET COMPANY ====================

pub async fn get_company(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let company = Company::get(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(json!({ "company": company })))
}

// ==================== CREATE COMPANY ====================

pub async fn create_company(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    body: web::Json<CreateCompanyRequest>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_admin(&req)?;
    body.validate()?;

    let company = Company::create(&app_state.db_pool, body.into_inner()).await?;
    info!("Company '{}' created by {}", company.handle, claims.sub);

    Ok(HttpResponse::Created().json(json!({ "company": company })))
}

// ==================== UPDATE COMPANY ====================

pub async fn update_company(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<UpdateCompanyRequest>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_admin(&req)?;
    body.validate()?;

    let company = Company::update(&app_state.db_pool, &path, &body).await?;
    info!("Company '{}' updated by {}", company.handle, claims.sub);

    Ok(HttpResponse::Ok().json(json!({ "company": company })))
}

// ==================== DELETE COMPANY ====================

pub async fn delete_company(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_admin(&req)?;
    let handle = path.into_inner();

    Company::remove(&app_state.db_pool, &handle).await?;
    info!("Company '{}' deleted by {}", handle, claims.sub);

    Ok(HttpResponse::Ok().json(json!({ "deleted": handle })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::test_support::{self, init_test_app};

    #[actix_web::test]
    async fn test_writes_require_admin() {
        let state = test_support::lazy_state();
        let user_token = state.auth_service.create_token("test", false).unwrap();
        let app = init_test_app!(state).await;

        let body = json!({ "handle": "new", "name": "New", "description": "D" });

        let req = test::TestRequest::post().uri("/companies").set_json(&body).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/companies")
            .insert_header(("Authorization", format!("Bearer {}", user_token)))
            .set_json(&body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete().uri("/companies/c1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_bad_filters_are_rejected() {
        let state = test_support::lazy_state();
        let app = init_test_app!(state).await;

        let req = test::TestRequest::get().uri("/companies?minEmployees=5&maxEmployees=1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Bad Request: minEmployees is greater than maxEmployees.");

        let req = test::TestRequest::get().uri("/companies?color=red").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/companies?minEmployees=many").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_list_and_get() {
        let Some(db) = test_support::TestDb::acquire().await else { return };
        let app = init_test_app!(db.state()).await;

        let req = test::TestRequest::get().uri("/companies?nameLike=c&minEmployees=2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({ "companies": [
                { "handle": "c2", "name": "C2" },
                { "handle": "c3", "name": "C3" },
            ]})
        );

        let req = test::TestRequest::get().uri("/companies/c1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["company"]["num_employees"], 1);
        assert_eq!(body["company"]["jobs"][0]["equity"], "0.5");

        let req = test::TestRequest::get().uri("/companies/nope").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_zero_min_employees_skips_unknown_counts() {
        let Some(db) = test_support::TestDb::acquire().await else { return };
        sqlx::query(
            "INSERT INTO companies (handle, name, num_employees, description) VALUES ('c4', 'C4', NULL, 'Desc4')",
        )
            .execute(&db.pool)
            .await
            .unwrap();
        let app = init_test_app!(db.state()).await;

        let req = test::TestRequest::get().uri("/companies").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["companies"].as_array().unwrap().len(), 4);

        let req = test::TestRequest::get().uri("/companies?minEmployees=0").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["companies"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_admin_crud() {
        let Some(db) = test_support::TestDb::acquire().await else { return };
        let app = init_test_app!(db.state()).await;
        let admin = format!("Bearer {}", db.auth.create_token("admin", true).unwrap());

        let req = test::TestRequest::post()
            .uri("/companies")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "handle": "new", "name": "New", "num_employees": 10, "description": "DescNew" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::patch()
            .uri("/companies/new")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "name": "Newer" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["company"]["name"], "Newer");

        let req = test::TestRequest::patch()
            .uri("/companies/c1")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "logo_url": null }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["company"]["logo_url"], Value::Null);
        assert_eq!(body["company"]["name"], "C1");

        let req = test::TestRequest::patch()
            .uri("/companies/new")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "handle": "renamed" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::delete()
            .uri("/companies/new")
            .insert_header(("Authorization", admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "deleted": "new" }));
    }
}
