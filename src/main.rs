mod config;
mod conversation;
mod model;
mod prompts;
mod web;

use std::sync::Arc;

use actix_web::{App, HttpServer, web::Data};
use dotenv::dotenv;
use log::{info, error};

use config::AppConfig;
use model::{GeminiModel, ModelManager};
use prompts::PromptTemplates;
use web::routes;

// App state structure
pub struct AppState {
    templates: PromptTemplates,
    model: ModelManager,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting PoliSmart web application");

    // Credentials are checked here so a misconfigured process never serves traffic
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    let gemini = match GeminiModel::new(config.gemini.clone()) {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to initialize Gemini client: {}", e);
            std::process::exit(1);
        }
    };
    let model = ModelManager::new(
        Arc::new(gemini),
        config.max_concurrent_generations,
        config.generation_timeout,
    );

    let templates = match PromptTemplates::new() {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };

    // Create app state
    let app_state = Data::new(AppState { templates, model });
    let json_limit = config.json_payload_limit;

    info!("Listening on {}:{}", config.host, config.port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(routes::json_config(json_limit))
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
