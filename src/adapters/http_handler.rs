use std::{net::SocketAddr, sync::Arc, time::Instant};

use axum::body::Body as AxumBody;
use http::{HeaderValue, StatusCode, header};
use hyper::{Response, ext::ReasonPhrase};
use tracing::Instrument;

use crate::{
    core::{
        AccessList, DispatchTable, RenderMode, Renderer, RequestError,
        render::{CONTENT_TYPE_JSON, Rendered},
        url::ParsedUrl,
    },
    ports::{
        adapter::{AdapterMode, ExplorerAdapter},
        http_server::RequestHandler,
    },
    tracing_setup::create_request_span,
};

/// Request handler for the explorer routes
///
/// Turns a request target into a route, checks the peer against the access
/// list, runs the backend query and renders the result. Only a 200 response
/// leaves the connection open.
pub struct ExplorerHandler {
    backend: Arc<dyn ExplorerAdapter>,
    access_list: Arc<AccessList>,
    dispatch: DispatchTable,
    renderer: Renderer,
}

impl ExplorerHandler {
    pub fn new(
        backend: Arc<dyn ExplorerAdapter>,
        access_list: Arc<AccessList>,
        renderer: Renderer,
    ) -> Self {
        Self {
            backend,
            access_list,
            dispatch: DispatchTable::new(),
            renderer,
        }
    }

    pub fn access_list(&self) -> &Arc<AccessList> {
        &self.access_list
    }

    /// Answer one request. Never fails; errors become status codes.
    pub async fn handle(&self, target: &str, peer: SocketAddr) -> Response<AxumBody> {
        let Some(url) = ParsedUrl::parse(target, self.dispatch.routes()) else {
            tracing::debug!(%peer, path = target, "no such route");
            return rejection(StatusCode::NOT_FOUND);
        };

        let mode = RenderMode::from_url(&url);
        let span = create_request_span(url.route.name(), mode.as_str(), peer);
        let started = Instant::now();

        async move {
            let response = if !self.access_list.check(peer.ip()) {
                tracing::warn!(%peer, "peer rejected by access list");
                rejection(StatusCode::FORBIDDEN)
            } else {
                match self.execute(&url, mode, target).await {
                    Ok(rendered) => success(rendered),
                    Err(e) => {
                        tracing::error!(error = %e, "request failed");
                        internal_error(&e)
                    }
                }
            };

            let span = tracing::Span::current();
            span.record("http.status_code", response.status().as_u16());
            span.record("duration_ms", started.elapsed().as_millis() as u64);
            tracing::debug!("request completed");
            response
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        url: &ParsedUrl,
        mode: RenderMode,
        target: &str,
    ) -> Result<Rendered, RequestError> {
        let doc = self
            .dispatch
            .dispatch(self.backend.as_ref(), url, AdapterMode::from(mode))
            .await?;
        Ok(self.renderer.render(doc, mode, target)?)
    }
}

impl RequestHandler for ExplorerHandler {
    async fn handle_request(&self, target: &str, peer: SocketAddr) -> Response<AxumBody> {
        self.handle(target, peer).await
    }
}

fn with_common_headers(
    status: StatusCode,
    content_type: &'static str,
    body: AxumBody,
) -> Response<AxumBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if status != StatusCode::OK {
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    }
    response
}

fn success(rendered: Rendered) -> Response<AxumBody> {
    with_common_headers(
        StatusCode::OK,
        rendered.content_type,
        AxumBody::from(rendered.body),
    )
}

fn rejection(status: StatusCode) -> Response<AxumBody> {
    with_common_headers(status, CONTENT_TYPE_JSON, AxumBody::empty())
}

fn internal_error(error: &RequestError) -> Response<AxumBody> {
    let message = format!("Internal error: {error}");
    let body = serde_json::json!({ "error": message }).to_string();
    let mut response = with_common_headers(
        StatusCode::INTERNAL_SERVER_ERROR,
        CONTENT_TYPE_JSON,
        AxumBody::from(body),
    );

    // The status line carries the description too, minus anything a reason
    // phrase cannot hold.
    let phrase: String = message
        .chars()
        .map(|c| if c.is_ascii_graphic() { c } else { ' ' })
        .collect();
    if let Ok(reason) = ReasonPhrase::try_from(phrase) {
        response.extensions_mut().insert(reason);
    }
    response
}
