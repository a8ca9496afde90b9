use axum::Router;
use axum::extract::Request;
use axum::http::Method;
use tower::Layer;
use tower::util::{MapRequest, MapRequestLayer};

pub type MethodOverride<S> = MapRequest<S, fn(Request) -> Request>;

pub fn wrap(router: Router) -> MethodOverride<Router> {
    MapRequestLayer::new(override_method as fn(Request) -> Request).layer(router)
}

/// Rewrites a POST carrying `?_method=PUT|PATCH|DELETE` before routing.
pub fn override_method(mut req: Request) -> Request {
    if req.method() == Method::POST {
        if let Some(method) = req.uri().query().and_then(requested_method) {
            tracing::trace!(%method, "method_override");
            *req.method_mut() = method;
        }
    }
    req
}

fn requested_method(query: &str) -> Option<Method> {
    let value = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "_method")
        .map(|(_, v)| v)?;
    match value.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn req(method: Method, uri: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn rewrites_post_with_override_param() {
        let out = override_method(req(Method::POST, "/listings/1?_method=DELETE"));
        assert_eq!(out.method(), Method::DELETE);
        let out = override_method(req(Method::POST, "/listings/1?x=1&_method=put"));
        assert_eq!(out.method(), Method::PUT);
    }

    #[test]
    fn leaves_other_requests_alone() {
        let out = override_method(req(Method::GET, "/listings/1?_method=DELETE"));
        assert_eq!(out.method(), Method::GET);
        let out = override_method(req(Method::POST, "/listings/1?_method=TRACE"));
        assert_eq!(out.method(), Method::POST);
        let out = override_method(req(Method::POST, "/listings"));
        assert_eq!(out.method(), Method::POST);
    }
}
