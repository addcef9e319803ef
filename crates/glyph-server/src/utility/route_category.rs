//! Route categorization for metrics and logging.

use axum::http::Uri;
use strum::IntoStaticStr;

/// Route classification for metrics grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RouteCategory {
    /// Image uploads and processing.
    Recognition,
    /// Read-only service information: formats and stats.
    Information,
    /// Liveness and health checks.
    Monitoring,
    /// OpenAPI document and reference UI.
    Documentation,
    Unknown,
}

impl RouteCategory {
    /// Categorizes a route based on its URI path.
    pub fn from_uri(uri: &Uri) -> Self {
        let path = uri.path();

        if path == "/health" || path.ends_with("/health") {
            Self::Monitoring
        } else if path.ends_with("/upload") || path.ends_with("/process") {
            Self::Recognition
        } else if path.starts_with("/api/v1/ocr/") {
            Self::Information
        } else if path.starts_with("/api/") {
            Self::Documentation
        } else {
            Self::Unknown
        }
    }

    /// Returns the string representation for logging and metrics.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorization_maps_paths_correctly() {
        let cases = [
            ("/health", RouteCategory::Monitoring),
            ("/api/v1/ocr/health", RouteCategory::Monitoring),
            ("/api/v1/ocr/upload", RouteCategory::Recognition),
            ("/api/v1/ocr/process", RouteCategory::Recognition),
            ("/api/v1/ocr/stats", RouteCategory::Information),
            ("/api/v1/ocr/supported-formats", RouteCategory::Information),
            ("/api/openapi.json", RouteCategory::Documentation),
            ("/favicon.ico", RouteCategory::Unknown),
        ];

        for (path, expected) in cases {
            let uri: Uri = path.parse().unwrap();
            assert_eq!(RouteCategory::from_uri(&uri), expected, "path: {path}");
        }
    }

    #[test]
    fn categories_render_snake_case() {
        assert_eq!(RouteCategory::Recognition.as_str(), "recognition");
        assert_eq!(RouteCategory::Unknown.as_str(), "unknown");
    }
}
