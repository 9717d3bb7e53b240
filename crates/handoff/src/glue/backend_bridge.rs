use crate::api::PaymentCredential;
use crate::authorization::Authorization;
use crate::error::GResult;
use crate::host::{ApprovalBackend, ApprovalRequest, ApprovalResponse, Tokenizer};
use crate::payload::TokenizationPayload;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxFuture<T> = Pin<Box<dyn Future<Output = GResult<T>> + Send>>;

/// Approval backend backed by an async closure. The closure receives owned copies.
pub struct FnApprovalBackend {
    inner: Arc<dyn Fn(Authorization, ApprovalRequest) -> BoxFuture<ApprovalResponse> + Send + Sync>,
}

impl FnApprovalBackend {
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Send + Sync + 'static + Fn(Authorization, ApprovalRequest) -> Fut,
        Fut: Future<Output = GResult<ApprovalResponse>> + Send + 'static,
    {
        Self {
            inner: Arc::new(
                move |auth: Authorization,
                      request: ApprovalRequest|
                      -> BoxFuture<ApprovalResponse> { Box::pin(func(auth, request)) },
            ),
        }
    }
}

#[async_trait]
impl ApprovalBackend for FnApprovalBackend {
    async fn send(
        &self,
        authorization: &Authorization,
        request: &ApprovalRequest,
    ) -> GResult<ApprovalResponse> {
        (self.inner)(authorization.clone(), request.clone()).await
    }
}

pub struct FnTokenizer {
    inner: Arc<
        dyn Fn(Authorization, TokenizationPayload) -> BoxFuture<PaymentCredential> + Send + Sync,
    >,
}

impl FnTokenizer {
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Send + Sync + 'static + Fn(Authorization, TokenizationPayload) -> Fut,
        Fut: Future<Output = GResult<PaymentCredential>> + Send + 'static,
    {
        Self {
            inner: Arc::new(
                move |auth: Authorization,
                      payload: TokenizationPayload|
                      -> BoxFuture<PaymentCredential> { Box::pin(func(auth, payload)) },
            ),
        }
    }
}

#[async_trait]
impl Tokenizer for FnTokenizer {
    async fn tokenize(
        &self,
        authorization: &Authorization,
        payload: &TokenizationPayload,
    ) -> GResult<PaymentCredential> {
        (self.inner)(authorization.clone(), payload.clone()).await
    }
}
