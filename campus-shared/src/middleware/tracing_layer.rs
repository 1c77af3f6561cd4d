use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers.
    Json,
    /// Human-readable lines with file and line numbers.
    Pretty,
}

impl LogFormat {
    /// `CAMPUS_LOG_FORMAT` wins when set, otherwise `CAMPUS_ENV=production`
    /// selects JSON.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var("CAMPUS_LOG_FORMAT").ok().as_deref(),
            std::env::var("CAMPUS_ENV").ok().as_deref(),
        )
    }

    fn resolve(format: Option<&str>, environment: Option<&str>) -> Self {
        match format.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Self::Json,
            Some("pretty") | Some("text") => Self::Pretty,
            _ if environment == Some("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Filter used when `RUST_LOG` is unset: the service crate at debug,
/// everything else at info.
fn default_directives(service_name: &str) -> String {
    let crate_target = service_name.replace('-', "_");
    format!("info,{crate_target}=debug,campus_shared=debug,tower_http=debug")
}

/// Installs the global subscriber for `service_name`.
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));
    let format = LogFormat::from_env();
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true).with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_file(true).with_line_number(true))
            .init(),
    }

    tracing::info!(service = service_name, ?format, "tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_format_overrides_environment() {
        assert_eq!(LogFormat::resolve(Some("pretty"), Some("production")), LogFormat::Pretty);
        assert_eq!(LogFormat::resolve(Some("JSON"), None), LogFormat::Json);
    }

    #[test]
    fn production_defaults_to_json() {
        assert_eq!(LogFormat::resolve(None, Some("production")), LogFormat::Json);
        assert_eq!(LogFormat::resolve(None, Some("staging")), LogFormat::Pretty);
        assert_eq!(LogFormat::resolve(Some("xml"), None), LogFormat::Pretty);
    }

    #[test]
    fn default_directives_target_the_service_crate() {
        assert!(default_directives("campus-wallet").contains("campus_wallet=debug"));
        assert!(EnvFilter::try_new(default_directives("campus-dating")).is_ok());
    }
}
