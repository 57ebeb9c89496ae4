//! Serves `GET /` with a JSON greeting and `POST /echo` with the decoded body.
//!
//! ```text
//! cargo run --example hello_world
//! curl http://127.0.0.1:3000/
//! curl -X POST -H 'content-type: application/json' -d '{"message":"hi"}' http://127.0.0.1:3000/echo
//! ```

use nethttp::{Method, Response, Server, ServerAddress, StatusCode};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut server = Server::new(ServerAddress::new("127.0.0.1", 3000));

    server.add_route("/", Method::Get, |request| async move {
        let greeting = Message {
            message: "Hello, World!".to_owned(),
        };
        let response = Response::with_status(&request, StatusCode::Ok)
            .json(&greeting)?
            .header("connection", "close");
        Ok(response)
    });

    server.add_route("/echo", Method::Post, |request| async move {
        let echoed: Message = match request.json() {
            Ok(message) => message,
            Err(e) => {
                let body = e.to_string();
                return Ok(Response::with_status(&request, StatusCode::BadRequest)
                    .header("content-length", body.len().to_string())
                    .header("connection", "close")
                    .body(body));
            }
        };
        let response = Response::with_status(&request, StatusCode::Created)
            .json(&echoed)?
            .header("connection", "close");
        Ok(response)
    });

    let listener = server.bind().await?;
    listener
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await?;

    Ok(())
}
