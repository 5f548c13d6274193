use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;

use super::{Database, SummaryCollection, UpdateResult};
use crate::error::JobError;
use crate::http::HttpClient;

pub const DEFAULT_APP_SERVICES_URL: &str = "https://services.cloud.mongodb.com";

/// Linked data source name of the cluster.
pub const DEFAULT_DATA_SOURCE: &str = "mongodb-atlas";

const CLIENT_API: &str = "api/client/v2.0";

/// Where the summary document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionTarget {
    pub data_source: String,
    pub database: String,
    pub collection: String,
}

#[derive(Deserialize, Debug)]
struct LoginResponse {
    access_token: Option<String>,
    user_id: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ProfileResponse {
    user_id: String,
}

/// Atlas App Services client authenticating with an application API key.
pub struct AppServices {
    http: HttpClient,
    base_url: String,
    app_id: String,
    api_key: String,
    target: CollectionTarget,
}

impl AppServices {
    #[tracing::instrument(skip(http, api_key))]
    pub fn new(
        http: HttpClient,
        base_url: &str,
        app_id: &str,
        api_key: &str,
        target: CollectionTarget,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            api_key: api_key.to_string(),
            target,
        }
    }

    /// Logs in with the API key credential.
    #[tracing::instrument(skip(self))]
    pub async fn login(&self) -> Result<User> {
        let url = format!(
            "{}/{}/app/{}/auth/providers/api-key/login",
            self.base_url, CLIENT_API, self.app_id
        );

        debug!("Logging in to app {}...", self.app_id);

        let request = self
            .http
            .inner()
            .post(&url)
            .json(&json!({ "key": self.api_key }));

        let response: LoginResponse = self
            .http
            .send_json(request)
            .await
            .map_err(into_authentication_error)?;

        let (Some(access_token), Some(id)) = (response.access_token, response.user_id) else {
            return Err(JobError::AuthenticationFailed(
                "login response did not include a session".to_string(),
            )
            .into());
        };

        Ok(User {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            app_id: self.app_id.clone(),
            id,
            access_token,
        })
    }
}

#[async_trait]
impl Database for AppServices {
    #[tracing::instrument(skip(self))]
    async fn connect(&self) -> Result<Box<dyn SummaryCollection>> {
        let user = self.login().await?;

        match user.profile_id().await {
            Ok(profile_id) if profile_id != user.id() => warn!(
                "Session profile {} does not match logged-in user {}",
                profile_id,
                user.id()
            ),
            Ok(_) => {}
            Err(e) => warn!("Could not verify session identity: {:#}", e),
        }

        info!("Logged in as {}", user.id());

        Ok(Box::new(user.collection(&self.target)))
    }
}

/// An authenticated session.
#[derive(Clone)]
pub struct User {
    http: HttpClient,
    base_url: String,
    app_id: String,
    id: String,
    access_token: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("app_id", &self.app_id)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl User {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identity of the session's current user, as reported by the server.
    pub async fn profile_id(&self) -> Result<String> {
        let url = format!("{}/{}/auth/profile", self.base_url, CLIENT_API);
        let request = self.http.inner().get(&url).bearer_auth(&self.access_token);
        let profile: ProfileResponse = self.http.send_json(request).await?;
        Ok(profile.user_id)
    }

    pub fn collection(&self, target: &CollectionTarget) -> Collection {
        Collection {
            user: self.clone(),
            target: target.clone(),
        }
    }
}

/// Handle on one collection through the function-call endpoint.
#[derive(Debug)]
pub struct Collection {
    user: User,
    target: CollectionTarget,
}

impl Collection {
    async fn call_function(&self, name: &str, argument: Value) -> Result<Value> {
        let url = format!(
            "{}/{}/app/{}/functions/call",
            self.user.base_url, CLIENT_API, self.user.app_id
        );

        let request = self
            .user
            .http
            .inner()
            .post(&url)
            .bearer_auth(&self.user.access_token)
            .json(&json!({
                "name": name,
                "service": self.target.data_source,
                "arguments": [argument],
            }));

        self.user.http.send_json(request).await
    }
}

#[async_trait]
impl SummaryCollection for Collection {
    #[tracing::instrument(skip(self))]
    async fn upsert_one(&self, filter: Value, update: Value) -> Result<UpdateResult> {
        let reply = self
            .call_function(
                "updateOne",
                json!({
                    "database": self.target.database,
                    "collection": self.target.collection,
                    "query": filter,
                    "update": update,
                    "upsert": true,
                }),
            )
            .await?;

        let result = UpdateResult {
            matched_count: ejson_u64(reply.get("matchedCount")),
            modified_count: ejson_u64(reply.get("modifiedCount")),
            upserted_id: reply.get("upsertedId").cloned(),
        };

        debug!(
            "updateOne on {}.{}: matched {}, modified {}, upserted {:?}",
            self.target.database,
            self.target.collection,
            result.matched_count,
            result.modified_count,
            result.upserted_id
        );

        Ok(result)
    }
}

/// Rejected logins become [`JobError::AuthenticationFailed`].
fn into_authentication_error(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<JobError>() {
        Some(JobError::HttpStatus {
            status: 401 | 403,
            status_text,
            ..
        }) => JobError::AuthenticationFailed(format!("login rejected: {}", status_text)).into(),
        _ => err,
    }
}

/// Reads a count that may be a plain number or extended JSON.
fn ejson_u64(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::Object(map)) => map
            .get("$numberInt")
            .or_else(|| map.get("$numberLong"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}
