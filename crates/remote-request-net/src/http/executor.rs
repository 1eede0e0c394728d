//! Request execution.
//!
//! [`RequestExecutor`] ties the pieces together: it builds the wire request,
//! drives the loading indicator, watches connectivity, dispatches on the
//! background runtime, classifies the response and delivers one typed result
//! through a [`PendingResult`].

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};

use super::builder::RequestBuilder;
use super::client::HttpClient;
use super::multipart::MultipartBody;
use super::request::{ContentType, RequestDescription, WireRequest};
use super::response::ResponseClassifier;
use super::upload::{PROGRESS_CHANNEL_CAPACITY, UploadProgress, progress_body};
use crate::config::ConfigProvider;
use crate::error::{FailureKind, Result, is_connectivity_failure};
use crate::reachability::{ConnectivityMonitor, ListenerContext, ReachabilityStatus};
use crate::runtime;
use crate::ui::{LoadingGuard, NoopUi, UiDelegate};

/// The eventual result of a request.
///
/// Await it, block on it, or hand it a callback. Dropping it discards the
/// result; the request itself still runs to completion.
#[must_use = "a pending result does nothing unless awaited or given a callback"]
pub struct PendingResult<T> {
    receiver: oneshot::Receiver<Result<T>>,
    runtime: Handle,
}

impl<T> PendingResult<T> {
    fn new(receiver: oneshot::Receiver<Result<T>>, runtime: Handle) -> Self {
        Self { receiver, runtime }
    }

    fn failed(err: FailureKind, runtime: Handle) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(err));
        Self::new(rx, runtime)
    }

    /// Block the current thread until the result arrives.
    ///
    /// Must not be called from within an async context.
    pub fn wait(self) -> Result<T> {
        self.receiver.blocking_recv().unwrap_or(Err(FailureKind::InvalidResponse))
    }
}

impl<T: Send + 'static> PendingResult<T> {
    /// Call `f` with the result once it arrives, on the executor's runtime.
    pub fn on_complete<F>(self, f: F)
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        let runtime = self.runtime.clone();
        runtime.spawn(async move { f(self.await) });
    }
}

impl<T> Future for PendingResult<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the task died without answering.
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(FailureKind::InvalidResponse)))
    }
}

impl<T> std::fmt::Debug for PendingResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResult").finish_non_exhaustive()
    }
}

struct ExecutorInner {
    builder: RequestBuilder,
    client: HttpClient,
    classifier: ResponseClassifier,
    monitor: Option<Arc<ConnectivityMonitor>>,
    ui: Arc<dyn UiDelegate>,
    runtime: Handle,
    progress: broadcast::Sender<UploadProgress>,
}

/// Runs requests described by [`RequestDescription`]s.
///
/// Cheap to clone; clones share the client, monitor, UI delegate and
/// progress channel.
#[derive(Clone)]
pub struct RequestExecutor {
    inner: Arc<ExecutorInner>,
}

impl RequestExecutor {
    /// Start configuring an executor that reads base URL and credentials
    /// from `config`.
    pub fn builder(config: Arc<dyn ConfigProvider>) -> RequestExecutorBuilder {
        RequestExecutorBuilder {
            config,
            client: None,
            monitor: None,
            ui: None,
            runtime: None,
        }
    }

    /// The request builder used by this executor.
    pub fn request_builder(&self) -> &RequestBuilder {
        &self.inner.builder
    }

    /// The transport client.
    pub fn client(&self) -> &HttpClient {
        &self.inner.client
    }

    /// The connectivity monitor, if one was supplied.
    pub fn monitor(&self) -> Option<&Arc<ConnectivityMonitor>> {
        self.inner.monitor.as_ref()
    }

    /// Subscribe to upload progress.
    ///
    /// Every upload of this executor reports on the same channel.
    pub fn progress(&self) -> broadcast::Receiver<UploadProgress> {
        self.inner.progress.subscribe()
    }

    /// Fetch and decode a JSON response.
    ///
    /// Build failures are returned without touching the network. When a
    /// monitor is attached, an unreachable network notifies the UI and hides
    /// the loading indicator, but the request is still sent.
    pub fn data_task<T>(&self, description: RequestDescription) -> PendingResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let runtime = self.inner.runtime.clone();
        let request = match self.inner.builder.build(&description) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(target: "remote_request_net::http", endpoint = %description.endpoint(), error = %e, "Request could not be built");
                return PendingResult::failed(e, runtime);
            }
        };

        let guard = Arc::new(LoadingGuard::show(Arc::clone(&self.inner.ui), description.is_silent()));
        self.observe_connectivity(Arc::downgrade(&guard));

        let (tx, rx) = oneshot::channel();
        let client = self.inner.client.clone();
        let classifier = self.inner.classifier;
        runtime.spawn(async move {
            let result = fetch::<T>(&client, classifier, request).await;
            guard.hide();
            let _ = tx.send(result);
        });

        PendingResult::new(rx, self.inner.runtime.clone())
    }

    /// Upload the description's parameters and media as `multipart/form-data`
    /// and decode the JSON response.
    ///
    /// Progress is reported on [`progress`](Self::progress).
    pub fn upload_task<T>(&self, description: RequestDescription) -> PendingResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let runtime = self.inner.runtime.clone();
        let boundary = MultipartBody::generate_boundary();
        let mut request = match self.inner.builder.build_with_boundary(&description, Some(&boundary)) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(target: "remote_request_net::http", endpoint = %description.endpoint(), error = %e, "Upload could not be built");
                return PendingResult::failed(e, runtime);
            }
        };

        let body = MultipartBody::encode(&boundary, description.params(), description.media());
        if let Err(e) = set_multipart_headers(&mut request, &boundary, body.len()) {
            return PendingResult::failed(e, runtime);
        }

        let guard = LoadingGuard::show(Arc::clone(&self.inner.ui), description.is_silent());

        let (tx, rx) = oneshot::channel();
        let client = self.inner.client.clone();
        let classifier = self.inner.classifier;
        let progress = self.inner.progress.clone();
        runtime.spawn(async move {
            tracing::debug!(target: "remote_request_net::http", url = %request.url, body_len = body.len(), "Uploading");
            let result = upload::<T>(&client, classifier, request, progress_body(body, progress)).await;
            guard.hide();
            let _ = tx.send(result);
        });

        PendingResult::new(rx, self.inner.runtime.clone())
    }

    /// Replace the monitor's listener with one tied to this request.
    fn observe_connectivity(&self, guard: Weak<LoadingGuard>) {
        let Some(monitor) = &self.inner.monitor else {
            return;
        };

        let ui = Arc::clone(&self.inner.ui);
        monitor.start_listening(ListenerContext::Inline, move |status| {
            if status == ReachabilityStatus::NotReachable {
                tracing::debug!(target: "remote_request_net::http", "Network unreachable during request");
                if let Some(guard) = guard.upgrade() {
                    guard.hide();
                }
                ui.no_connectivity();
            }
        });
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("client", &self.inner.client)
            .field("monitor", &self.inner.monitor.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`RequestExecutor`].
pub struct RequestExecutorBuilder {
    config: Arc<dyn ConfigProvider>,
    client: Option<HttpClient>,
    monitor: Option<Arc<ConnectivityMonitor>>,
    ui: Option<Arc<dyn UiDelegate>>,
    runtime: Option<Handle>,
}

impl RequestExecutorBuilder {
    /// Use `client` instead of a default one.
    pub fn client(mut self, client: HttpClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Watch connectivity with `monitor` during fetches.
    pub fn monitor(mut self, monitor: Arc<ConnectivityMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Report loading and connectivity to `ui`.
    pub fn ui(mut self, ui: Arc<dyn UiDelegate>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Run requests on `runtime`.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the executor.
    ///
    /// Without an explicit runtime, the caller's runtime is used if there is
    /// one, else the shared background runtime.
    pub fn build(self) -> Result<RequestExecutor> {
        let client = match self.client {
            Some(client) => client,
            None => HttpClient::new()?,
        };
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => runtime::current_or_background().map_err(FailureKind::request_failed)?,
        };
        let (progress, _) = broadcast::channel(PROGRESS_CHANNEL_CAPACITY);

        Ok(RequestExecutor {
            inner: Arc::new(ExecutorInner {
                builder: RequestBuilder::new(self.config),
                client,
                classifier: ResponseClassifier::new(),
                monitor: self.monitor,
                ui: self.ui.unwrap_or_else(|| Arc::new(NoopUi)),
                runtime,
                progress,
            }),
        })
    }
}

fn set_multipart_headers(request: &mut WireRequest, boundary: &str, len: usize) -> Result<()> {
    let content_type = HeaderValue::try_from(ContentType::Multipart.header_value(Some(boundary)))
        .map_err(|_| FailureKind::InvalidRequest)?;
    request.headers.insert(CONTENT_TYPE, content_type);
    request.headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    request.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    request.body = None;
    Ok(())
}

async fn fetch<T: DeserializeOwned>(
    client: &HttpClient,
    classifier: ResponseClassifier,
    request: WireRequest,
) -> Result<T> {
    let url = request.url.clone();
    let response = client.send(request).await.map_err(|e| {
        tracing::debug!(target: "remote_request_net::http", url = %url, error = %e, "Request failed");
        FailureKind::network(e)
    })?;

    let status = response.status().as_u16();
    let body = response.bytes().await.ok();
    tracing::debug!(target: "remote_request_net::http", url = %url, status, "Response received");

    let bytes = classifier.classify(Some(status), body.as_deref())?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(target: "remote_request_net::http", url = %url, error = %e, "Response did not decode");
        FailureKind::network(e)
    })
}

async fn upload<T: DeserializeOwned>(
    client: &HttpClient,
    classifier: ResponseClassifier,
    request: WireRequest,
    body: reqwest::Body,
) -> Result<T> {
    let url = request.url.clone();
    let response = client.send_with_body(request, Some(body)).await.map_err(|e| {
        tracing::debug!(target: "remote_request_net::http", url = %url, error = %e, "Upload failed");
        if is_connectivity_failure(&e) {
            FailureKind::ConnectivityError
        } else {
            FailureKind::unknown(e)
        }
    })?;

    let status = response.status().as_u16();
    let body = response.bytes().await.ok();
    tracing::debug!(target: "remote_request_net::http", url = %url, status, "Upload response received");

    classifier.classify_as(Some(status), body.as_deref())
}
