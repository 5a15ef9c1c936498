// Prometheus metrics HTTP exporter: serves the node's registered counters,
// gauges and histograms on a dedicated port, separate from the control-plane
// API so scraping never competes with request traffic.
use anyhow::{Context, Result};
use hyper::{
    header::CONTENT_TYPE,
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use prometheus::{Encoder, TextEncoder};
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::{info, warn};

const METRICS_PATH: &str = "/metrics";

/// Binds `addr` and serves the Prometheus text exposition format at
/// `/metrics` until the process is torn down. Any other path or method gets
/// a plain 404, since this listener has no other surface.
///
/// ```no_run
/// use nimbus_metrics::exporter::start_metrics_exporter;
///
/// #[tokio::main]
/// async fn main() {
///     let addr = "127.0.0.1:9090".parse().unwrap();
///     start_metrics_exporter(addr).await.unwrap();
/// }
/// ```
pub async fn start_metrics_exporter(addr: SocketAddr) -> Result<()> {
    let make_svc = make_service_fn(|_conn| async { Ok::<_, Infallible>(service_fn(metrics_handler)) });

    let server = Server::bind(&addr).serve(make_svc);

    info!(%addr, path = METRICS_PATH, "metrics exporter listening");

    server.await.context("metrics exporter server exited")?;
    Ok(())
}

async fn metrics_handler(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    if req.method() != Method::GET || req.uri().path() != METRICS_PATH {
        return Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("not found"))
            .unwrap());
    }

    match render_prometheus_text() {
        Ok((content_type, body)) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()),
        Err(e) => {
            warn!(error = %e, "failed to encode metrics");
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from(format!("error encoding metrics: {e}")))
                .unwrap())
        }
    }
}

fn render_prometheus_text() -> Result<(String, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}
