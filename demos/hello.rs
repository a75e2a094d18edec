//! A small server demonstrating routes, middleware and static files.
//!
//! Run with `RUST_LOG=info cargo run --example hello`, then press Enter to stop.

use microhttp_rs::{HttpResponse, HttpServer, ServerConfig, StatusCode};
use serde::Serialize;

#[derive(Serialize)]
struct Status {
    workers: usize,
    path: String,
}

fn main() -> Result<(), microhttp_rs::ServerError> {
    let log_env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(log_env);

    let config = ServerConfig {
        port: 8090,
        thread_pool_size: 2,
        verbose: true,
        ..ServerConfig::default()
    };
    let workers = config.thread_pool_size;

    let mut server = HttpServer::new(config);
    server
        .use_middleware(|req, res| {
            if req.path.starts_with("/admin") && req.get_header("Authorization").is_none() {
                res.set_status(StatusCode::Unauthorized);
                res.set_body("<h1>401 Unauthorized</h1>");
                return Ok(false);
            }
            Ok(true)
        })
        .route("/", |_req, res| {
            res.set_body("<h1>Hello, World!</h1>");
            Ok(())
        })
        .route("/status", move |req, res| {
            *res = HttpResponse::new(StatusCode::Ok).with_json(&Status {
                workers,
                path: req.path.clone(),
            })?;
            Ok(())
        })
        .route("/admin/*", |req, res| {
            res.set_body(format!("<h1>admin area: {}</h1>", req.path));
            Ok(())
        })
        .static_files("/static", "./public");

    server.run()
}
