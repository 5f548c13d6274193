//! Error reporting sink.
//!
//! Reporting is fire-and-forget: a sink that cannot be reached logs a warning
//! and the job carries on.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Url;
use serde_json::{Value, json};

use crate::error::JobError;
use crate::http::HttpClient;

/// Client identifier sent to the sink.
pub const CLIENT_NAME: &str = "downloads-sync";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    /// Records a failure. Never fails itself.
    async fn capture_exception(&self, error: &anyhow::Error);
}

/// Parsed Sentry DSN: `scheme://<public_key>@host[:port][/path]/<project_id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    public_key: String,
    store_url: Url,
}

impl Dsn {
    pub fn parse(dsn: &str) -> Result<Self> {
        let url = Url::parse(dsn).context("Invalid error sink DSN")?;

        let public_key = url.username();
        if public_key.is_empty() {
            bail!("Error sink DSN has no public key");
        }

        let path = url.path().trim_matches('/');
        let (prefix, project_id) = match path.rsplit_once('/') {
            Some((prefix, project_id)) => (format!("/{}", prefix), project_id),
            None => (String::new(), path),
        };
        if project_id.is_empty() {
            bail!("Error sink DSN has no project id");
        }

        let host = url.host_str().context("Error sink DSN has no host")?;
        let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
        let store_url = Url::parse(&format!(
            "{}://{}{}{}/api/{}/store/",
            url.scheme(),
            host,
            port,
            prefix,
            project_id
        ))
        .context("Invalid error sink DSN")?;

        Ok(Self {
            public_key: public_key.to_string(),
            store_url,
        })
    }

    pub fn store_url(&self) -> &Url {
        &self.store_url
    }

    fn auth_header(&self, release: &str) -> String {
        format!(
            "Sentry sentry_version=7, sentry_client={}/{}, sentry_key={}",
            CLIENT_NAME, release, self.public_key
        )
    }
}

/// Sends events to a Sentry-compatible store endpoint.
pub struct SentryReporter {
    http: HttpClient,
    dsn: Dsn,
    release: String,
}

impl SentryReporter {
    pub fn new(http: HttpClient, dsn: Dsn, release: &str) -> Self {
        Self {
            http,
            dsn,
            release: release.to_string(),
        }
    }

    async fn send_event(&self, event: &Value) -> Result<()> {
        let request = self
            .http
            .inner()
            .post(self.dsn.store_url().clone())
            .header("X-Sentry-Auth", self.dsn.auth_header(&self.release))
            .json(event);

        self.http.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ErrorReporter for SentryReporter {
    #[tracing::instrument(skip(self, error))]
    async fn capture_exception(&self, error: &anyhow::Error) {
        let event = build_event(error, &self.release);
        match self.send_event(&event).await {
            Ok(()) => debug!("Reported error to {}", self.dsn.store_url()),
            Err(e) => warn!("Failed to report error: {:#}", e),
        }
    }
}

/// One exception entry per error in the chain, outermost last.
pub fn build_event(error: &anyhow::Error, release: &str) -> Value {
    let mut values: Vec<Value> = error
        .chain()
        .map(|cause| {
            let kind = cause
                .downcast_ref::<JobError>()
                .map(JobError::kind)
                .unwrap_or("Error");
            json!({ "type": kind, "value": cause.to_string() })
        })
        .collect();
    values.reverse();

    json!({
        "level": "error",
        "logger": CLIENT_NAME,
        "platform": "other",
        "release": release,
        "message": format!("{:#}", error),
        "exception": { "values": values },
    })
}
