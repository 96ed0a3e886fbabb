// src/job_handlers.rs
//! Job routes. Reads are public, writes require an admin token.

use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::auth::ensure_admin;
use crate::error::ApiResult;
use crate::models::{CreateJobRequest, Job, JobQuery, UpdateJobRequest};
use crate::AppState;

pub async fn list_jobs(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<JobQuery>,
) -> ApiResult<HttpResponse> {
    let jobs = Job::find_all(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(json!({ "jobs": jobs })))
}

pub async fn get_job(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let job = Job::get(&app_state.db_pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "job": job })))
}

pub async fn create_job(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    body: web::Json<CreateJobRequest>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_admin(&req)?;
    body.validate()?;

    let job = Job::create(&app_state.db_pool, body.into_inner()).await?;
    info!("Job {} ('{}') created for {} by {}", job.id, job.title, job.company_handle, claims.sub);

    Ok(HttpResponse::Created().json(json!({ "job": job })))
}

pub async fn update_job(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<i32>,
    body: web::Json<UpdateJobRequest>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_admin(&req)?;
    body.validate()?;

    let job = Job::update(&app_state.db_pool, path.into_inner(), &body).await?;
    info!("Job {} updated by {}", job.id, claims.sub);

    Ok(HttpResponse::Ok().json(json!({ "job": job })))
}

pub async fn delete_job(
    req: HttpRequest,
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let claims = ensure_admin(&req)?;
    let id = path.into_inner();

    Job::remove(&app_state.db_pool, id).await?;
    info!("Job {} deleted by {}", id, claims.sub);

    Ok(HttpResponse::Ok().json(json!({ "deleted": id.to_string() })))
}
