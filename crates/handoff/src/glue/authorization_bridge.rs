use crate::authorization::AuthorizationProvider;
use crate::error::GResult;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type TokenFuture = Pin<Box<dyn Future<Output = GResult<String>> + Send>>;

pub struct FnAuthorizationProvider {
    inner: Arc<dyn Fn() -> TokenFuture + Send + Sync>,
}

impl FnAuthorizationProvider {
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Send + Sync + 'static + Fn() -> Fut,
        Fut: Future<Output = GResult<String>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move || -> TokenFuture {
                let fut = func();
                Box::pin(fut)
            }),
        }
    }
}

#[async_trait]
impl AuthorizationProvider for FnAuthorizationProvider {
    async fn client_token(&self) -> GResult<String> {
        (self.inner)().await
    }
}
