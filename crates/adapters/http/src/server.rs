//! Server frontend — axum router assembly.
//!
//! A single fallback route catches every method+path combination and hands it
//! to the [`Dispatcher`]; there is no static route table.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use tower_http::trace::TraceLayer;

use devrack_app::ports::StatePublisher;
use devrack_domain::request::RequestDescriptor;

use crate::dispatch::Dispatcher;

/// Build the axum [`Router`].
///
/// Every request falls through to the dispatcher. Includes a [`TraceLayer`]
/// that logs each HTTP request/response at the `DEBUG` level using the
/// `tracing` ecosystem.
pub fn build<P>(dispatcher: Arc<Dispatcher<P>>) -> Router
where
    P: StatePublisher + Send + Sync + 'static,
{
    Router::new()
        .fallback(handle)
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn handle<P>(State(dispatcher): State<Arc<Dispatcher<P>>>, request: Request) -> Response
where
    P: StatePublisher + Send + Sync + 'static,
{
    let descriptor = descriptor_from(&request);
    dispatcher.dispatch(descriptor).await.into_response()
}

fn descriptor_from(request: &Request) -> RequestDescriptor {
    let headers = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    RequestDescriptor::new(
        request.method().as_str(),
        request.uri().path(),
        headers,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use devrack_app::gateway::reply_channel;
    use devrack_app::state_bus::InProcessStateBus;
    use crate::error::HandlerError;
    use crate::registry::HandlerRegistry;

    fn app(registry: HandlerRegistry) -> Router {
        let dispatcher = Arc::new(Dispatcher::new(
            registry,
            Arc::new(InProcessStateBus::new(16)),
        ));
        build(dispatcher)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_route() {
        let resp = app(HandlerRegistry::new())
            .oneshot(
                HttpRequest::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn should_roundtrip_handler_value_through_json() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("GETCpuStats", |_| async {
                Ok(serde_json::json!({"cores": 8, "load": [0.5, 0.25]}))
            })
            .unwrap();

        let resp = app(registry)
            .oneshot(
                HttpRequest::builder()
                    .uri("/cpu/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body, serde_json::json!({"cores": 8, "load": [0.5, 0.25]}));
    }

    #[tokio::test]
    async fn should_apply_common_headers_to_every_response() {
        let resp = app(HandlerRegistry::new())
            .oneshot(
                HttpRequest::builder()
                    .uri("/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = resp.headers();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    #[tokio::test]
    async fn should_accept_any_method() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("OPTIONSRoot", |_| async { Ok(serde_json::json!({})) })
            .unwrap();

        let resp = app(registry)
            .oneshot(
                HttpRequest::builder()
                    .method("OPTIONS")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_pass_descriptor_with_headers_to_handler() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("GETEcho", |descriptor| async move {
                Ok(serde_json::to_value(&descriptor)?)
            })
            .unwrap();

        let resp = app(registry)
            .oneshot(
                HttpRequest::builder()
                    .uri("/echo")
                    .header("x-probe", "42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(resp).await;
        assert_eq!(body["method"], "GET");
        assert_eq!(body["path"], "/echo");
        assert_eq!(body["headers"]["x-probe"], "42");
    }

    #[tokio::test]
    async fn should_answer_memory_request_via_connected_gateway() {
        let (client, mut server) =
            reply_channel::<RequestDescriptor, serde_json::Value>(4, Duration::from_secs(1));

        tokio::spawn(async move {
            while let Some((request, responder)) = server.recv().await {
                assert_eq!(request.method, "GET");
                responder.send(serde_json::json!({"rss": 42}));
            }
        });

        let mut registry = HandlerRegistry::new();
        registry
            .register("GETMemory", move |descriptor| {
                let client = client.clone();
                async move { Ok(client.call(descriptor).await?) }
            })
            .unwrap();

        let resp = app(registry)
            .oneshot(
                HttpRequest::builder()
                    .uri("/memory")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({"rss": 42}));
    }

    #[tokio::test]
    async fn should_report_gateway_failure_as_500() {
        let (client, server) =
            reply_channel::<RequestDescriptor, serde_json::Value>(4, Duration::from_secs(1));
        drop(server);

        let mut registry = HandlerRegistry::new();
        registry
            .register("GETMemory", move |descriptor| {
                let client = client.clone();
                async move { Ok(client.call(descriptor).await?) }
            })
            .unwrap();

        let resp = app(registry)
            .oneshot(
                HttpRequest::builder()
                    .uri("/memory")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "no collaborator connected");
    }

    #[tokio::test]
    async fn should_surface_handler_error_message() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("POSTLightingToggle", |_| async {
                Err(HandlerError::failed("toggle switch is offline"))
            })
            .unwrap();

        let resp = app(registry)
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/lighting/toggle")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "toggle switch is offline");
    }

    #[test]
    fn should_build_descriptor_from_request_parts() {
        let request = HttpRequest::builder()
            .method("put")
            .uri("http://localhost/devices//all/")
            .header("accept", "application/json")
            .body(Body::empty())
            .unwrap();

        let descriptor = descriptor_from(&request);
        assert_eq!(descriptor.method, "PUT");
        assert_eq!(descriptor.path, "/devices//all/");
        assert_eq!(
            descriptor.headers,
            HashMap::from([("accept".to_string(), "application/json".to_string())])
        );
    }
}
