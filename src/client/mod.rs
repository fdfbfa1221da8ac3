//! Blocking HTTP client for the remote badge platform.
//!
//! Every resource family has a primary and a mirror host exposing an
//! identical contract. Requests go to the primary first; transport-level
//! failures (network errors and 5xx) are retried once against the mirror
//! before a [`ClientError::Transport`] is surfaced. Rate limiting and 404
//! are reported as their own variants and never trigger the mirror, because
//! the right reaction differs by call site.

pub mod batch;
pub mod paginate;

use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::{Config, HostPair};
use crate::error::client::ClientError;
use crate::model::{
    AwardRecord, AwardedDates, Badge, CountResponse, Friend, GroupMembership, Page, UserInfo,
};

const USER_AGENT: &str = concat!("badgeline/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApiClient {
    http: HttpClient,
    config: Config,
}

impl ApiClient {
    /// Build a client over the given configuration.
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ClientError::Transport {
                path: "<client setup>".to_string(),
                source,
            })?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `GET /v1/users/{id}` on the users family.
    pub fn get_user_info(&self, user_id: u64) -> Result<UserInfo, ClientError> {
        self.get_json(
            &self.config.endpoints.users,
            &format!("/v1/users/{user_id}"),
            &[],
        )
    }

    /// `GET /v1/users/{id}/groups/roles` on the groups family.
    pub fn get_user_groups(&self, user_id: u64) -> Result<Vec<GroupMembership>, ClientError> {
        let page: Page<GroupMembership> = self.get_json(
            &self.config.endpoints.groups,
            &format!("/v1/users/{user_id}/groups/roles"),
            &[],
        )?;
        Ok(page.data)
    }

    /// `GET /v1/users/{id}/friends` on the friends family.
    pub fn get_user_friends(&self, user_id: u64) -> Result<Vec<Friend>, ClientError> {
        let page: Page<Friend> = self.get_json(
            &self.config.endpoints.friends,
            &format!("/v1/users/{user_id}/friends"),
            &[],
        )?;
        Ok(page.data)
    }

    pub fn get_friends_count(&self, user_id: u64) -> Result<u64, ClientError> {
        self.get_count(&format!("/v1/users/{user_id}/friends/count"))
    }

    pub fn get_followers_count(&self, user_id: u64) -> Result<u64, ClientError> {
        self.get_count(&format!("/v1/users/{user_id}/followers/count"))
    }

    pub fn get_followings_count(&self, user_id: u64) -> Result<u64, ClientError> {
        self.get_count(&format!("/v1/users/{user_id}/followings/count"))
    }

    /// One page of the badge listing, newest first.
    pub fn get_badge_page(
        &self,
        user_id: u64,
        cursor: Option<&str>,
    ) -> Result<Page<Badge>, ClientError> {
        let mut query = vec![
            ("limit", self.config.page_limit.to_string()),
            ("sortOrder", "Desc".to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        self.get_json(
            &self.config.endpoints.badges,
            &format!("/v1/users/{user_id}/badges"),
            &query,
        )
    }

    /// Award timestamps for one batch of badge ids.
    pub fn get_awarded_dates(
        &self,
        user_id: u64,
        badge_ids: &[u64],
    ) -> Result<Vec<AwardRecord>, ClientError> {
        let ids = badge_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let envelope: AwardedDates = self.get_json(
            &self.config.endpoints.badges,
            &format!("/v1/users/{user_id}/badges/awarded-dates"),
            &[("badgeIds", ids)],
        )?;
        Ok(envelope.data)
    }

    fn get_count(&self, path: &str) -> Result<u64, ClientError> {
        let envelope: CountResponse =
            self.get_json(&self.config.endpoints.friends, path, &[])?;
        Ok(envelope.count)
    }

    /// Issue a GET against a host pair with the mirror as explicit fallback.
    ///
    /// Only transport-level failures consume the fallback; everything else
    /// is surfaced from the primary response as-is.
    fn get_json<T: DeserializeOwned>(
        &self,
        hosts: &HostPair,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        match self.request_host(&hosts.primary, path, query) {
            Err(err) if err.is_transport() => {
                warn!(path, error = %err, "primary host failed, retrying against mirror");
                self.request_host(&hosts.mirror, path, query)
            }
            other => other,
        }
    }

    fn request_host<T: DeserializeOwned>(
        &self,
        host: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{host}{path}");
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .map_err(|source| ClientError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited {
                path: path.to_string(),
                retry_after: retry_after_hint(&response),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                path: path.to_string(),
            });
        }
        if let Err(source) = response.error_for_status_ref() {
            if status.is_server_error() {
                return Err(ClientError::Transport {
                    path: path.to_string(),
                    source,
                });
            }
            return Err(ClientError::UnexpectedStatus {
                status,
                path: path.to_string(),
            });
        }

        response.json().map_err(|source| ClientError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

/// The server's `Retry-After` header parsed as whole seconds, if present.
fn retry_after_hint(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
