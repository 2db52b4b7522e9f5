// Builders that turn typed functions into axum handlers. Errors are returned
// as ApiError and rendered by its IntoResponse impl.

use std::future::Future;

use axum::{
    extract::{Query, RawPathParams},
    http::{StatusCode, Uri},
    response::Response,
};
use futures::future::{BoxFuture, FutureExt};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::api::models::{ApiError, respond};
use crate::core::errors::ContentError;

/// Decodes the query string into `T`, calls `f` and responds with `ok`.
pub fn query<T, Y, F, Fut>(
    f: F,
    ok: StatusCode,
) -> impl Fn(Uri) -> BoxFuture<'static, Result<Response, ApiError>> + Clone + Send + Sync + 'static
where
    T: DeserializeOwned + Send + 'static,
    Y: Serialize + Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Y, ContentError>> + Send + 'static,
{
    move |uri: Uri| {
        let f = f.clone();
        async move {
            let q = decode_query::<T>(&uri)?;
            let res = f(q).await?;
            Ok::<_, ApiError>(respond(ok, res))
        }
        .boxed()
    }
}

/// Like [`query`], but first parses the path parameter `param` as a UUID.
/// A bad id fails the request before the query string is looked at.
pub fn query_id<T, Y, F, Fut>(
    param: &'static str,
    f: F,
    ok: StatusCode,
) -> impl Fn(RawPathParams, Uri) -> BoxFuture<'static, Result<Response, ApiError>> + Clone + Send + Sync + 'static
where
    T: DeserializeOwned + Send + 'static,
    Y: Serialize + Send + 'static,
    F: Fn(Uuid, T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Y, ContentError>> + Send + 'static,
{
    move |params: RawPathParams, uri: Uri| {
        let f = f.clone();
        let id = route_uuid(&params, param);
        async move {
            let id = id?;
            let q = decode_query::<T>(&uri)?;
            let res = f(id, q).await?;
            Ok::<_, ApiError>(respond(ok, res))
        }
        .boxed()
    }
}

fn decode_query<T: DeserializeOwned>(uri: &Uri) -> Result<T, ContentError> {
    Query::<T>::try_from_uri(uri)
        .map(|Query(q)| q)
        .map_err(|e| ContentError::InvalidQuery(e.body_text()))
}

fn route_uuid(params: &RawPathParams, name: &str) -> Result<Uuid, ContentError> {
    let raw = params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .ok_or_else(|| ContentError::InvalidId(format!("missing path parameter `{}`", name)))?;
    Uuid::parse_str(raw).map_err(|e| ContentError::InvalidId(format!("{}: {}", raw, e)))
}
