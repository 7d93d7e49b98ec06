use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};

/// Static host for the client bundle. Paths that match no file get
/// `index.html` so client-side routes survive a reload.
pub(crate) fn build_app(dist_dir: &Path) -> Router {
    let spa_index = ServeFile::new(dist_dir.join("index.html"));
    let assets = ServeDir::new(dist_dir)
        .precompressed_br()
        .precompressed_gzip()
        .fallback(spa_index);

    Router::new()
        .fallback_service(assets)
        .layer(middleware::from_fn(set_static_cache_control))
        .layer(CompressionLayer::new())
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if is_hashed_bundle_asset(path) {
        return Some("public, max-age=31536000, immutable");
    }

    if path.starts_with("/assets/") {
        return Some("public, max-age=86400");
    }

    None
}

fn is_hashed_bundle_asset(path: &str) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }

    let Some(filename) = Path::new(path).file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    filename
        .split(['-', '_', '.'])
        .any(|segment| segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use axum::body::{Body, to_bytes};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;

    struct DistDir(PathBuf);

    impl DistDir {
        fn new() -> Self {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            let dir = std::env::temp_dir().join(format!(
                "vdma-dist-{}-{nanos}",
                std::process::id()
            ));
            std::fs::create_dir_all(&dir).expect("create dist dir");
            std::fs::write(dir.join("index.html"), "<!doctype html><title>VDMA</title>")
                .expect("write index");
            std::fs::write(dir.join("vdma-client-71578f6b278221f3_bg.wasm"), [0u8, 97, 115, 109])
                .expect("write wasm");
            Self(dir)
        }
    }

    impl Drop for DistDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(
            axum::http::Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("infallible")
    }

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/vdma-client-71578f6b278221f3_bg.wasm"),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(
            cache_control_for_path("/style-a93762ff3bf6d63a.css"),
            Some("public, max-age=31536000, immutable")
        );
    }

    #[test]
    fn short_cache_for_unhashed_static_assets() {
        assert_eq!(
            cache_control_for_path("/assets/logo.svg"),
            Some("public, max-age=86400")
        );
    }

    #[test]
    fn no_cache_header_override_for_html_or_routes() {
        assert_eq!(cache_control_for_path("/"), None);
        assert_eq!(cache_control_for_path("/index.html"), None);
        assert_eq!(cache_control_for_path("/heatmap"), None);
        assert_eq!(cache_control_for_path("/main.js"), None);
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_index() {
        let dist = DistDir::new();
        for route in ["/", "/dashboard", "/map", "/heatmap"] {
            let response = get(build_app(&dist.0), route).await;
            assert_eq!(response.status(), StatusCode::OK, "route {route}");
            assert!(response.headers().get(header::CACHE_CONTROL).is_none());
            let body = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body");
            assert!(body.starts_with(b"<!doctype html>"), "route {route}");
        }
    }

    #[tokio::test]
    async fn bundle_files_are_served_with_long_cache() {
        let dist = DistDir::new();
        let response = get(build_app(&dist.0), "/vdma-client-71578f6b278221f3_bg.wasm").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("public, max-age=31536000, immutable"))
        );
    }
}
