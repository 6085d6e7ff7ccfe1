use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use super::tasks_models::{parse_task_id, TaskErrorResponse, TaskRequest};
use crate::repository::{RepositoryError, TaskStore};

// Bodies must be JSON: wrong Content-Type is 415, anything unparsable is 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let response = match &err {
            JsonPayloadError::ContentType => HttpResponse::UnsupportedMediaType()
                .json(TaskErrorResponse::new("Content-Type must be application/json")),
            _ => HttpResponse::BadRequest().json(TaskErrorResponse::new(format!("Invalid task body: {}", err))),
        };
        InternalError::from_response(err, response).into()
    })
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(TaskErrorResponse::new(message))
}

// NotFound is an ordinary answer; only backend failures are worth an error log
fn repository_error(err: RepositoryError, action: &str) -> HttpResponse {
    match err {
        RepositoryError::NotFound(id) => {
            info!("Task {} not found while trying to {}", id, action);
            HttpResponse::NotFound().json(TaskErrorResponse::new(format!("Task {} not found", id)))
        }
        RepositoryError::Backend(e) => {
            error!("Failed to {}: {}", action, e);
            HttpResponse::InternalServerError().json(TaskErrorResponse::new("Internal server error"))
        }
    }
}

// GET /tasks
pub async fn get_tasks(store: web::Data<dyn TaskStore>) -> impl Responder {
    info!("Received request to list tasks");
    match store.list_all().await {
        Ok(tasks) => HttpResponse::Ok().json(tasks),
        Err(e) => repository_error(e, "list tasks"),
    }
}

// POST /tasks
pub async fn create_task(
    store: web::Data<dyn TaskStore>,
    request: web::Json<TaskRequest>,
) -> impl Responder {
    let fields = match request.into_inner().into_fields() {
        Ok(fields) => fields,
        Err(message) => return bad_request(message),
    };
    info!("Received request to create task: {}", fields.title);

    match store.create(&fields).await {
        Ok(task) => {
            info!("Task {} created", task.id);
            HttpResponse::Created().json(task)
        }
        Err(e) => repository_error(e, "create task"),
    }
}

// GET /tasks/{id}
pub async fn get_task_by_id(
    store: web::Data<dyn TaskStore>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_task_id(&path) {
        Ok(id) => id,
        Err(message) => return bad_request(message),
    };
    info!("Received request to get task {}", id);

    match store.get_by_id(id).await {
        Ok(task) => HttpResponse::Ok().json(task),
        Err(e) => repository_error(e, "get task"),
    }
}

// PUT /tasks/{id}
pub async fn update_task(
    store: web::Data<dyn TaskStore>,
    path: web::Path<String>,
    request: web::Json<TaskRequest>,
) -> impl Responder {
    let id = match parse_task_id(&path) {
        Ok(id) => id,
        Err(message) => return bad_request(message),
    };
    let fields = match request.into_inner().into_fields() {
        Ok(fields) => fields,
        Err(message) => return bad_request(message),
    };
    info!("Received request to update task {}", id);

    match store.update(id, &fields).await {
        Ok(task) => {
            info!("Task {} updated", id);
            HttpResponse::Ok().json(task)
        }
        Err(e) => repository_error(e, "update task"),
    }
}

// DELETE /tasks/{id}
pub async fn delete_task(
    store: web::Data<dyn TaskStore>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_task_id(&path) {
        Ok(id) => id,
        Err(message) => return bad_request(message),
    };
    info!("Received request to delete task {}", id);

    match store.delete(id).await {
        Ok(()) => {
            info!("Task {} deleted", id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => repository_error(e, "delete task"),
    }
}
