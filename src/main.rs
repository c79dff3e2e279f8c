use actix_multipart::form::MultipartFormConfig;
use actix_multipart::form::tempfile::TempFileConfig;
use actix_web::{App, HttpServer, middleware, web};

use textdeck::config::AppConfig;
use textdeck::handlers;
use textdeck::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env: {e}");
        }
    }
    env_logger::init();

    let config = AppConfig::from_env();
    config.ensure_dirs()?;

    let bind_addr = config.bind_addr.clone();
    let state = web::Data::new(AppState::new(config));

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let config = &state.config;
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(TempFileConfig::default().directory(&config.upload_dir))
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(config.max_upload_bytes)
                    .memory_limit(config.max_upload_bytes),
            )
            // Static files
            .service(actix_files::Files::new("/static", config.static_dir.clone()))
            .configure(handlers::routes)
            // Default 404 handler (must be registered last)
            .default_service(web::to(handlers::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
