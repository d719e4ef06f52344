//! API configuration.

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second for the upload endpoint
    pub rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Directory annotated artifacts are written to and served from
    pub processed_dir: String,
    /// Path to the cattle detector ONNX model
    pub detector_model_path: String,
    /// Path to the disease classifier ONNX model
    pub classifier_model_path: String,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 50 * 1024 * 1024, // 50MB, videos included
            processed_dir: "data/processed".to_string(),
            detector_model_path: "models/cattle_detector.onnx".to_string(),
            classifier_model_path: "models/lsd_classifier.onnx".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            processed_dir: std::env::var("PROCESSED_DIR").unwrap_or(defaults.processed_dir),
            detector_model_path: std::env::var("DETECTOR_MODEL_PATH")
                .unwrap_or(defaults.detector_model_path),
            classifier_model_path: std::env::var("CLASSIFIER_MODEL_PATH")
                .unwrap_or(defaults.classifier_model_path),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_body_size, 50 * 1024 * 1024);
        assert!(!config.is_production());
    }
}
