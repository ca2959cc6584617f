#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use project_gantt::{GanttView, http_api};

    let addr: SocketAddr = std::env::var("PROJECT_GANTT_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    println!("project-gantt HTTP API listening on http://{addr}");
    let view = GanttView::new();
    http_api::serve(addr, view).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
