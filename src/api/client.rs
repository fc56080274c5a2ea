//! Targetprocess API client implementation.
//!
//! This module provides the transport client every entity accessor is built
//! on. It handles the two API base URLs, token authentication, query
//! filters, request execution and error classification.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::auth::{AccessToken, ACCESS_TOKEN_PARAM};
use super::context::Context;
use super::error::{ApiError, Result};
use super::filters::{apply_all, QueryFilter, QueryParams};
use crate::logging::Logger;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "targetprocess-rs";

/// The Targetprocess API client.
///
/// Cloning is cheap and clones share configuration. Reads go to the v2 API
/// and writes to the v1 API, mirroring what each version supports.
///
/// Records returned by accessors hold only a weak [`ClientRef`]. Their
/// follow-up calls fail with [`ApiError::Detached`] once the last `Client`
/// handle is dropped, so keep one alive while working with records.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    ctx: Context,
}

struct ClientInner {
    /// The account name, first label of the instance hostname.
    account: String,
    /// Base URL for v1 (write) requests.
    base_url: Url,
    /// Base URL for v2 (read) requests.
    base_url_read_only: Url,
    /// The HTTP client.
    http: reqwest::Client,
    /// User access token, sent as a query parameter.
    token: Option<AccessToken>,
    /// Per-request timeout.
    timeout: Duration,
    /// Sent as `User-Agent` when non-empty.
    user_agent: String,
    /// Optional sink for debug output.
    logger: Option<Arc<dyn Logger>>,
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    account: String,
    token: Option<AccessToken>,
    timeout: Duration,
    user_agent: String,
    logger: Option<Arc<dyn Logger>>,
    http: Option<reqwest::Client>,
    host: Option<String>,
    ctx: Context,
}

impl ClientBuilder {
    fn new(account: String) -> Self {
        Self {
            account,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            logger: None,
            http: None,
            host: None,
            ctx: Context::background(),
        }
    }

    /// The user access token from the account settings. An empty token is
    /// not sent.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        let token = AccessToken::new(token);
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// An empty user agent disables the header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, ...).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Replace the `https://{account}.tpondemand.com` origin, e.g. with a
    /// mock server or a self-hosted instance.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidAccount`] if the account does not form a
    /// valid URL.
    pub fn build(self) -> Result<Client> {
        let invalid = |source| ApiError::InvalidAccount {
            account: self.account.clone(),
            source,
        };
        if self.account.is_empty() {
            return Err(invalid(url::ParseError::EmptyHost));
        }

        let origin = match &self.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.tpondemand.com", self.account),
        };
        let base_url = Url::parse(&format!("{origin}/api/v1/")).map_err(invalid)?;
        let base_url_read_only = Url::parse(&format!("{origin}/api/v2/")).map_err(invalid)?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .build()
                .map_err(|source| ApiError::Transport {
                    url: origin,
                    source: source.without_url(),
                })?,
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                account: self.account,
                base_url,
                base_url_read_only,
                http,
                token: self.token,
                timeout: self.timeout,
                user_agent: self.user_agent,
                logger: self.logger,
            }),
            ctx: self.ctx,
        })
    }
}

impl Client {
    /// Create a client for `https://{account}.tpondemand.com`.
    ///
    /// `token` is the user access token; see
    /// <https://dev.targetprocess.com/docs/authentication#token-authentication>.
    pub fn new(account: &str, token: &str) -> Result<Self> {
        Self::builder(account).token(token).build()
    }

    pub fn builder(account: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(account.into())
    }

    pub fn account(&self) -> &str {
        &self.inner.account
    }

    /// Base URL for write (v1) requests.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Base URL for read (v2) requests.
    pub fn base_url_read_only(&self) -> &Url {
        &self.inner.base_url_read_only
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.inner.user_agent
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Replace the cancellation scope for subsequent requests made through
    /// this value (clones keep their own).
    pub fn set_context(&mut self, ctx: Context) {
        self.ctx = ctx;
    }

    /// A copy of this client running under `ctx`.
    pub fn with_context(&self, ctx: Context) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ctx,
        }
    }

    /// A non-owning handle to this client, as stored on records.
    pub fn downgrade(&self) -> ClientRef {
        ClientRef {
            inner: Arc::downgrade(&self.inner),
            ctx: self.ctx.clone(),
        }
    }

    /// GET `entity_type` from the v2 API and decode the JSON response.
    ///
    /// `params` seeds the query string; `filters` are applied on top of it
    /// in order.
    ///
    /// # Errors
    ///
    /// Fails on an invalid entity type, a failing filter, transport errors,
    /// non-2xx responses and undecodable bodies.
    #[instrument(skip(self, params, filters), fields(entity_type = %entity_type))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        entity_type: &str,
        params: Option<QueryParams>,
        filters: &[QueryFilter],
    ) -> Result<T> {
        let mut url = resolve(&self.inner.base_url_read_only, entity_type)?;
        let params = apply_all(params.unwrap_or_default(), filters)?;
        let params = self.default_params(params);

        self.debug_log(format_args!(
            "[targetprocess] GET {}?{}",
            url,
            self.redacted(&params).encode()
        ));
        url.set_query(Some(&params.encode()));

        self.execute(self.inner.http.get(url), entity_type).await
    }

    /// Follow a pagination link returned in a response's `Next` field.
    ///
    /// The entity type is taken from the link's path so the request goes
    /// through [`Client::get`] with the link's query parameters.
    #[instrument(skip(self, next_url))]
    pub async fn get_next<T: DeserializeOwned>(&self, next_url: &str) -> Result<T> {
        let invalid = |source| ApiError::InvalidNextUrl {
            url: next_url.to_string(),
            source,
        };
        let mut next = match Url::parse(next_url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .inner
                .base_url_read_only
                .join(next_url)
                .map_err(|e| invalid(Some(e)))?,
            Err(e) => return Err(invalid(Some(e))),
        };

        // v1 links end in "/", v2 links don't.
        if !next.path().ends_with('/') {
            let path = format!("{}/", next.path());
            next.set_path(&path);
        }

        let entity_type = next
            .path()
            .rsplit('/')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| invalid(None))?
            .to_string();

        self.get(&entity_type, Some(QueryParams::from_url(&next)), &[])
            .await
    }

    /// POST `body` to `entity_type` on the v1 API. Used both to create and
    /// to update entities.
    #[instrument(skip(self, params, body), fields(entity_type = %entity_type))]
    pub async fn post<T: DeserializeOwned>(
        &self,
        entity_type: &str,
        params: Option<QueryParams>,
        body: Vec<u8>,
    ) -> Result<T> {
        let mut url = resolve(&self.inner.base_url, entity_type)?;
        let params = self.default_params(params.unwrap_or_default());

        self.debug_log(format_args!(
            "[targetprocess] POST {}?{}",
            url,
            self.redacted(&params).encode()
        ));
        url.set_query(Some(&params.encode()));

        self.execute(self.inner.http.post(url).body(body), entity_type)
            .await
    }

    /// Send a request and decode the response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        entity_type: &str,
    ) -> Result<T> {
        let mut request = request
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(self.inner.timeout);
        if !self.inner.user_agent.is_empty() {
            request = request.header(USER_AGENT, self.inner.user_agent.as_str());
        }
        let request = request.build().map_err(|source| ApiError::Transport {
            url: entity_type.to_string(),
            source: source.without_url(),
        })?;

        // Never put the query string (and its token) into errors. reqwest
        // errors carry the full URL, so it is stripped from them as well.
        let endpoint = without_query(request.url());

        let response = self
            .ctx
            .run(self.inner.http.execute(request))
            .await?
            .map_err(|source| ApiError::Transport {
                url: endpoint.clone(),
                source: source.without_url(),
            })?;
        let status = response.status();

        // Always read the body to the end so the connection can be reused.
        let body = self
            .ctx
            .run(response.bytes())
            .await?
            .map_err(|source| ApiError::Transport {
                url: endpoint,
                source: source.without_url(),
            })?;

        if !status.is_success() {
            self.debug_log(format_args!(
                "[targetprocess] {} response on {}",
                status, entity_type
            ));
            return Err(ApiError::from_response(entity_type, status.as_u16(), &body));
        }

        let text = String::from_utf8_lossy(&body);
        self.debug_log(format_args!("[targetprocess] raw response: {}", text));
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            entity_type: entity_type.to_string(),
            body: text.into_owned(),
            source,
        })
    }

    /// Parameters every request carries.
    fn default_params(&self, mut params: QueryParams) -> QueryParams {
        if let Some(token) = &self.inner.token {
            params.set(ACCESS_TOKEN_PARAM, token.expose());
        }
        params.set("format", "json");
        params.set("resultFormat", "json");
        params
    }

    fn redacted(&self, params: &QueryParams) -> QueryParams {
        let mut params = params.clone();
        if params.contains(ACCESS_TOKEN_PARAM) {
            params.set(ACCESS_TOKEN_PARAM, "***");
        }
        params
    }

    pub(crate) fn debug_log(&self, args: fmt::Arguments<'_>) {
        if let Some(logger) = &self.inner.logger {
            logger.debug(args);
        }
    }

    pub(crate) fn info_log(&self, args: fmt::Arguments<'_>) {
        if let Some(logger) = &self.inner.logger {
            logger.info(args);
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("account", &self.inner.account)
            .field("base_url", &self.inner.base_url.as_str())
            .field("base_url_read_only", &self.inner.base_url_read_only.as_str())
            .field("token", &self.inner.token)
            .field("timeout", &self.inner.timeout)
            .field("user_agent", &self.inner.user_agent)
            .field("logger", &self.inner.logger.is_some())
            .finish()
    }
}

/// A weak, non-owning reference from a record to the client that fetched
/// it.
///
/// Never serialized, and ignored by record equality. Follow-up calls on a
/// record fail with [`ApiError::Detached`] once every [`Client`] handle is
/// gone, or if the record was never attached.
#[derive(Clone, Default)]
pub struct ClientRef {
    inner: Weak<ClientInner>,
    ctx: Context,
}

impl ClientRef {
    /// Upgrade to a usable client.
    pub fn client(&self) -> Result<Client> {
        self.inner
            .upgrade()
            .map(|inner| Client {
                inner,
                ctx: self.ctx.clone(),
            })
            .ok_or(ApiError::Detached)
    }

    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl PartialEq for ClientRef {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Debug for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRef")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl From<&Client> for ClientRef {
    fn from(client: &Client) -> Self {
        client.downgrade()
    }
}

/// Resolve `entity_type/` against `base`, refusing anything that is not a
/// plain path below it.
fn resolve(base: &Url, entity_type: &str) -> Result<Url> {
    let invalid = || ApiError::InvalidEntityType(entity_type.to_string());
    if entity_type.is_empty() || entity_type.contains(['?', '#']) {
        return Err(invalid());
    }
    let url = base
        .join(&format!("{entity_type}/"))
        .map_err(|_| invalid())?;
    if !url.as_str().starts_with(base.as_str()) {
        return Err(invalid());
    }
    Ok(url)
}

fn without_query(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// Browser link for an entity, as shown after creating it.
pub fn generate_url(account: &str, id: i32) -> String {
    format!("https://{account}.tpondemand.com/entity/{id}/RestUI/board.aspx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::filters::{first, where_clause};
    use crate::logging::testing::CaptureLogger;
    use serde::Deserialize;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OK_RESPONSE: &str = r#"{"items": [], "next": "", "prev": ""}"#;

    #[derive(Debug, Deserialize)]
    struct GenericResponse {
        items: Vec<String>,
    }

    fn mock_client(server: &MockServer) -> Client {
        Client::builder("example")
            .token("1234abcd")
            .host(server.uri())
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_builds_both_base_urls() {
        let client = Client::new("exampleaccount", "token").unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://exampleaccount.tpondemand.com/api/v1/"
        );
        assert_eq!(
            client.base_url_read_only().as_str(),
            "https://exampleaccount.tpondemand.com/api/v2/"
        );
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.user_agent(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_account_rejected() {
        let err = Client::new("bad account", "token").unwrap_err();
        assert!(matches!(err, ApiError::InvalidAccount { .. }));
        let err = Client::new("", "token").unwrap_err();
        assert!(matches!(err, ApiError::InvalidAccount { .. }));
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let client = Client::new("example", "secret_token").unwrap();
        assert!(!format!("{:?}", client).contains("secret_token"));
    }

    #[test]
    fn test_resolve_entity_types() {
        let base = Url::parse("https://x.tpondemand.com/api/v2/").unwrap();
        assert_eq!(
            resolve(&base, "Users").unwrap().as_str(),
            "https://x.tpondemand.com/api/v2/Users/"
        );
        assert_eq!(
            resolve(&base, "Bugs/bulk").unwrap().as_str(),
            "https://x.tpondemand.com/api/v2/Bugs/bulk/"
        );
        for bad in ["", "a?b", "a#b", "../v1/Users", "//evil.example", "http://evil.example"] {
            assert!(
                matches!(resolve(&base, bad), Err(ApiError::InvalidEntityType(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_generate_url() {
        assert_eq!(
            generate_url("example", 42),
            "https://example.tpondemand.com/entity/42/RestUI/board.aspx"
        );
    }

    #[tokio::test]
    async fn test_get_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/Users/"))
            .and(query_param("accessToken", "1234abcd"))
            .and(query_param("format", "json"))
            .and(query_param("resultFormat", "json"))
            .and(header("User-Agent", DEFAULT_USER_AGENT))
            .and(header("Accept", "application/json"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let resp: GenericResponse = mock_client(&server).get("Users", None, &[]).await.unwrap();
        assert!(resp.items.is_empty());
    }

    #[tokio::test]
    async fn test_get_applies_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/UserStories/"))
            .and(query_param("where", "A == 1 and B == 2"))
            .and(query_param("take", "1"))
            .and(query_param("skip", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let seed: QueryParams = [("skip", "5")].into_iter().collect();
        let _: GenericResponse = mock_client(&server)
            .get(
                "UserStories",
                Some(seed),
                &[where_clause(["A == 1"]), first(), where_clause(["B == 2"])],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_without_token_omits_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .mount(&server)
            .await;

        let client = Client::builder("example")
            .host(server.uri())
            .user_agent("")
            .build()
            .unwrap();
        let _: GenericResponse = client.get("Users", None, &[]).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0]
            .url
            .query_pairs()
            .any(|(k, _)| k == ACCESS_TOKEN_PARAM));
        assert!(!requests[0].headers.contains_key("user-agent"));
    }

    #[tokio::test]
    async fn test_post_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/UserStory/"))
            .and(query_param("accessToken", "1234abcd"))
            .and(query_param("format", "json"))
            .and(query_param("resultFormat", "json"))
            .and(header("Content-Type", "application/json"))
            .and(body_string(r#"{"Name":"story"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let _: GenericResponse = mock_client(&server)
            .post("UserStory", None, br#"{"Name":"story"}"#.to_vec())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_entity_type_sends_nothing() {
        let server = MockServer::start().await;
        let err = mock_client(&server)
            .get::<GenericResponse>("Users?x=1", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidEntityType(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_filter_sends_nothing() {
        fn reject(_: QueryParams) -> Result<QueryParams> {
            Err(ApiError::Filter("nope".to_string()))
        }
        let server = MockServer::start().await;
        let err = mock_client(&server)
            .get::<GenericResponse>("Users", None, &[QueryFilter::custom(reject)])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Filter(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_404_classification() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
            .mount(&server)
            .await;

        let err = mock_client(&server)
            .get::<GenericResponse>("Projects", None, &[])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_permission_denied());
        assert!(err.to_string().contains("404: no such thing"));
    }

    #[tokio::test]
    async fn test_401_classification() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = mock_client(&server)
            .post::<GenericResponse>("Bug", None, Vec::new())
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_json_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = mock_client(&server)
            .get::<GenericResponse>("Projects", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert!(err.to_string().contains("<html>maintenance</html>"));
    }

    #[tokio::test]
    async fn test_empty_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = mock_client(&server)
            .get::<GenericResponse>("Projects", None, &[])
            .await
            .unwrap_err();
        match err {
            ApiError::Decode { body, entity_type, .. } => {
                assert_eq!(body, "");
                assert_eq!(entity_type, "Projects");
            }
            other => panic!("Expected Decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_next_with_v1_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/Projects/"))
            .and(query_param("take", "25"))
            .and(query_param("skip", "25"))
            .and(query_param("accessToken", "1234abcd"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let _: GenericResponse = mock_client(&server)
            .get_next("https://testing.tpondemand.com/api/v1/Projects/?format=json&take=25&skip=25")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_next_with_v2_link_without_trailing_slash() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/userstories/"))
            .and(query_param("skip", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let _: GenericResponse = mock_client(&server)
            .get_next("/api/v2/userstories?take=25&skip=50")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_next_does_not_duplicate_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .mount(&server)
            .await;

        let _: GenericResponse = mock_client(&server)
            .get_next("https://example.tpondemand.com/api/v1/Bugs/?accessToken=1234abcd&skip=25")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let tokens = requests[0]
            .url
            .query_pairs()
            .filter(|(k, _)| k == ACCESS_TOKEN_PARAM)
            .count();
        assert_eq!(tokens, 1);
    }

    #[tokio::test]
    async fn test_get_next_rejects_link_without_entity() {
        let server = MockServer::start().await;
        let err = mock_client(&server)
            .get_next::<GenericResponse>("https://example.tpondemand.com/")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidNextUrl { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_hides_query() {
        let client = Client::builder("example")
            .token("secret_token")
            .host("http://127.0.0.1:1")
            .build()
            .unwrap();
        let err = client
            .get::<GenericResponse>("Users", None, &[])
            .await
            .unwrap_err();
        match &err {
            ApiError::Transport { url, source } => {
                assert_eq!(url, "http://127.0.0.1:1/api/v2/Users/");
                assert!(source.url().is_none());
            }
            other => panic!("Expected Transport error, got {other:?}"),
        }
        assert!(!err.to_string().contains("secret_token"));
        assert!(!format!("{err:?}").contains("secret_token"));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(OK_RESPONSE)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = Client::builder("example")
            .host(server.uri())
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let err = client
            .get::<GenericResponse>("Users", None, &[])
            .await
            .unwrap_err();
        match err {
            ApiError::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("Expected Transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_context_deadline_aborts_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(OK_RESPONSE)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let mut client = mock_client(&server);
        client.set_context(Context::background().with_timeout(Duration::from_millis(50)));
        let err = client
            .get::<GenericResponse>("Users", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_cancelled_context_sends_nothing() {
        let server = MockServer::start().await;
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();
        let client = mock_client(&server).with_context(ctx);
        let err = client
            .get::<GenericResponse>("Users", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_debug_log_redacts_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .mount(&server)
            .await;

        let logger = Arc::new(CaptureLogger::default());
        let client = Client::builder("example")
            .token("secret_token")
            .host(server.uri())
            .logger(logger.clone())
            .build()
            .unwrap();
        let _: GenericResponse = client.get("Users", None, &[]).await.unwrap();

        let lines = logger.lines();
        assert!(lines.iter().any(|l| l.contains("GET ") && l.contains("/api/v2/Users/")));
        assert!(lines.iter().any(|l| l.contains("raw response")));
        assert!(lines.iter().all(|l| !l.contains("secret_token")));
    }

    #[test]
    fn test_client_ref_detaches_when_client_dropped() {
        let client = Client::new("example", "token").unwrap();
        let handle = client.downgrade();
        assert!(handle.is_attached());
        assert!(handle.client().is_ok());
        drop(client);
        assert!(!handle.is_attached());
        assert!(matches!(handle.client(), Err(ApiError::Detached)));
        assert!(matches!(ClientRef::default().client(), Err(ApiError::Detached)));
    }
}
