// src/routes.rs

pub mod routes;

pub mod tasks {
    pub mod tasks_handlers;
    pub mod tasks_models;
}
