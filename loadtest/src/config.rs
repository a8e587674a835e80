//! Load test configuration
//!
//! Configuration is loaded from environment variables. Scenario thresholds
//! are compile-time constants (see `scenario::params`) and are not
//! configurable here.

use std::env;
use std::time::Duration;

use crate::runner::{RunBound, RunnerConfig};
use crate::scenario::params::DEFAULT_SIMPLE_PUSH_URL;

/// Main load test configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Rooms service base URL
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Push URL announced when registering room owners
    pub simple_push_url: String,

    /// Virtual user configuration
    pub load: LoadConfig,

    /// Status endpoint configuration
    pub status: StatusConfig,
}

/// How much load to generate
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Number of concurrent virtual users
    pub users: usize,
    /// Run duration, used when no iteration count is set
    pub duration: Duration,
    /// Scenarios per user; takes precedence over `duration`
    pub iterations: Option<u64>,
}

/// Status/metrics HTTP endpoint
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// Bind address
    pub host: String,
    /// Port; the endpoint is disabled when unset
    pub port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: Duration::from_secs(30),
            simple_push_url: DEFAULT_SIMPLE_PUSH_URL.to_string(),
            load: LoadConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            users: 10,
            duration: Duration::from_secs(60),
            iterations: None,
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Target service
        if let Some(url) = lookup("ROOMS_BASE_URL")
            && !url.is_empty()
        {
            config.base_url = url;
        }
        if let Some(val) = lookup("REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = lookup("SIMPLE_PUSH_URL")
            && !url.is_empty()
        {
            config.simple_push_url = url;
        }

        // Load shape
        if let Some(val) = lookup("LOADTEST_USERS")
            && let Ok(users) = val.parse()
        {
            config.load.users = users;
        }
        if let Some(val) = lookup("LOADTEST_DURATION_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.load.duration = Duration::from_secs(secs);
        }
        if let Some(val) = lookup("LOADTEST_ITERATIONS")
            && let Ok(iterations) = val.parse()
        {
            config.load.iterations = Some(iterations);
        }

        // Status endpoint
        if let Some(host) = lookup("METRICS_HOST") {
            config.status.host = host;
        }
        if let Some(val) = lookup("METRICS_PORT")
            && let Ok(port) = val.parse()
        {
            config.status.port = Some(port);
        }

        config
    }

    pub fn runner_config(&self) -> RunnerConfig {
        let bound = match self.load.iterations {
            Some(iterations) => RunBound::Iterations(iterations),
            None => RunBound::Duration(self.load.duration),
        };
        RunnerConfig {
            users: self.load.users,
            bound,
        }
    }

    /// Status endpoint address, if enabled
    pub fn status_addr(&self) -> Option<String> {
        self.status
            .port
            .map(|port| format!("{}:{}", self.status.host, port))
    }
}
