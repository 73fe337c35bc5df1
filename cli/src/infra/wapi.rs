//! WAPI infrastructure: implements `NetworkInventory` and `DiscoveryTaskApi`
//! over the appliance's REST API using `reqwest`.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::{DiscoveryTaskApi, NetworkInventory, Session};
use crate::domain::{
    ControlCommand, DiscoveryTask, Network, NetworkAssignment, NetworkFilter, NetworkRef,
    RunConfig, TaskKind, TaskRef, TaskState,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESULTS: &str = "1000000";
const NETWORK_FIELDS: &str = "network,network_view,extattrs";
const TASK_FIELDS: &str = "state,status,networks,network_view";

/// Authenticated WAPI session.
///
/// The appliance answers the first request with an `ibapauth` cookie which
/// the cookie store replays; basic auth is sent as well so an expired cookie
/// never fails a call. Call [`WapiClient::logout`] when the run ends.
pub struct WapiClient {
    http: Client,
    base: String,
    username: String,
    password: String,
}

impl WapiClient {
    /// Open a session against the configured appliance.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(cfg: &RunConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .danger_accept_invalid_certs(!cfg.verify_tls)
            .user_agent(concat!("discoveryctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        if !cfg.verify_tls {
            tracing::warn!(endpoint = %cfg.endpoint, "TLS certificate verification is disabled");
        }
        tracing::info!(base = %cfg.wapi_base(), user = %cfg.username, "WAPI session opened");
        Ok(Self {
            http,
            base: cfg.wapi_base(),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
        })
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(&self.username, Some(&self.password))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        object: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{object}", self.base);
        tracing::debug!(%url, ?query, "GET");
        let resp = self
            .authed(self.http.get(&url).query(query))
            .send()
            .await
            .with_context(|| format!("GET {object}"))?;
        let resp = check(resp).await.with_context(|| format!("GET {object}"))?;
        resp.json::<T>()
            .await
            .with_context(|| format!("decoding {object} response"))
    }
}

impl Session for WapiClient {
    async fn close(&self) -> Result<()> {
        let resp = self
            .authed(self.http.post(format!("{}/logout", self.base)))
            .send()
            .await
            .context("logout request failed")?;
        anyhow::ensure!(
            resp.status().is_success(),
            "logout returned HTTP {}",
            resp.status().as_u16()
        );
        Ok(())
    }
}

impl NetworkInventory for WapiClient {
    async fn list_networks(&self, filter: &NetworkFilter) -> Result<Vec<Network>> {
        let attribute_key = filter.attribute.as_ref().map(|(k, _)| format!("*{k}"));
        let mut query: Vec<(&str, &str)> = vec![
            ("_return_fields", NETWORK_FIELDS),
            ("_return_as_object", "1"),
            ("_max_results", MAX_RESULTS),
        ];
        if let (Some(key), Some((_, value))) = (&attribute_key, &filter.attribute) {
            query.push((key.as_str(), value.as_str()));
        }
        if let Some(view) = &filter.view {
            query.push(("network_view", view.as_str()));
        }
        if let Some(cidr) = &filter.cidr {
            query.push(("network", cidr.as_str()));
        }

        let envelope: Envelope<WireNetwork> = self.get_json("network", &query).await?;
        Ok(envelope.result.into_iter().map(WireNetwork::into_network).collect())
    }
}

impl DiscoveryTaskApi for WapiClient {
    async fn get_task(&self, kind: TaskKind) -> Result<DiscoveryTask> {
        let envelope: Envelope<WireTask> = self
            .get_json(
                "discoverytask",
                &[("_return_as_object", "1"), ("_return_fields+", TASK_FIELDS)],
            )
            .await?;
        find_task(envelope, kind)
    }

    async fn set_networks(&self, task: &TaskRef, assignment: &NetworkAssignment) -> Result<()> {
        let url = format!("{}/{task}", self.base);
        tracing::debug!(%url, networks = assignment.networks.len(), "PUT");
        let resp = self
            .authed(self.http.put(&url).json(assignment))
            .send()
            .await
            .with_context(|| format!("PUT {task}"))?;
        check(resp).await.with_context(|| format!("PUT {task}"))?;
        Ok(())
    }

    async fn send_control(&self, task: &TaskRef, command: ControlCommand) -> Result<()> {
        let url = format!("{}/{task}", self.base);
        tracing::debug!(%url, %command, "POST network_discovery_control");
        let resp = self
            .authed(
                self.http
                    .post(&url)
                    .query(&[("_function", "network_discovery_control")])
                    .json(&json!({ "action": command.as_str() })),
            )
            .send()
            .await
            .with_context(|| format!("{command} {task}"))?;
        check(resp)
            .await
            .with_context(|| format!("{command} {task}"))?;
        Ok(())
    }
}

/// Turn a non-2xx response into an error carrying the appliance's message.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("HTTP {}: {}", status.as_u16(), error_text(&body))
}

/// WAPI errors are JSON objects with a `text` field; fall back to the raw body.
fn error_text(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("text").and_then(|t| t.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    result: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct WireNetwork {
    #[serde(rename = "_ref")]
    reference: String,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    network_view: Option<String>,
    #[serde(default)]
    extattrs: BTreeMap<String, WireAttr>,
}

#[derive(Debug, Deserialize)]
struct WireAttr {
    value: serde_json::Value,
}

impl WireNetwork {
    fn into_network(self) -> Network {
        let reference = NetworkRef(self.reference);
        let view = self
            .network_view
            .or_else(|| reference.view_suffix().map(String::from))
            .unwrap_or_default();
        let cidr = self
            .network
            .or_else(|| cidr_from_ref(&reference))
            .unwrap_or_default();
        let extattrs = self
            .extattrs
            .into_iter()
            .map(|(key, attr)| {
                let value = match attr.value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();
        Network {
            reference,
            cidr,
            view,
            extattrs,
        }
    }
}

/// `network/<id>:10.0.0.0/24/default` → `10.0.0.0/24`.
fn cidr_from_ref(reference: &NetworkRef) -> Option<String> {
    let (_, tail) = reference.as_str().split_once(':')?;
    let (cidr, _view) = tail.rsplit_once('/')?;
    Some(cidr.to_string())
}

#[derive(Debug, Deserialize)]
struct WireTask {
    #[serde(rename = "_ref")]
    reference: String,
    #[serde(default)]
    discovery_task_oid: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    networks: Vec<WireNetworkRef>,
    #[serde(default)]
    network_view: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireNetworkRef {
    Plain(String),
    Object {
        #[serde(rename = "_ref")]
        reference: String,
    },
}

fn find_task(envelope: Envelope<WireTask>, kind: TaskKind) -> Result<DiscoveryTask> {
    let wire = envelope
        .result
        .into_iter()
        .find(|t| t.discovery_task_oid.as_deref() == Some(kind.oid()))
        .ok_or_else(|| anyhow::anyhow!("no '{kind}' discovery task on the appliance"))?;
    Ok(DiscoveryTask {
        kind,
        reference: TaskRef(wire.reference),
        state: TaskState::parse(wire.state.as_deref().unwrap_or_default()),
        status: wire.status.filter(|s| !s.is_empty()),
        networks: wire
            .networks
            .into_iter()
            .map(|n| match n {
                WireNetworkRef::Plain(r) | WireNetworkRef::Object { reference: r } => {
                    NetworkRef(r)
                }
            })
            .collect(),
        network_view: wire.network_view,
    })
}
