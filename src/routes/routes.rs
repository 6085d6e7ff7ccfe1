use actix_web::{web, HttpResponse};

use super::tasks::tasks_handlers;

pub fn tasks_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            .app_data(tasks_handlers::json_config())
            .service(
                web::resource("")
                    .route(web::get().to(tasks_handlers::get_tasks))
                    .route(web::post().to(tasks_handlers::create_task))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(tasks_handlers::get_task_by_id))
                    .route(web::put().to(tasks_handlers::update_task))
                    .route(web::delete().to(tasks_handlers::delete_task))
                    .default_service(web::to(method_not_allowed)),
            ),
    );
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().finish()
}
