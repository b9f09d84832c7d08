// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use certsweep::engines::traits::{EngineError, EngineResponse, FetchRequest, HttpEngine};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

struct StaticResponse {
    status: u16,
    content_type: Option<String>,
    body: String,
}

#[async_trait]
impl EngineResponse for StaticResponse {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn text(self: Box<Self>) -> Result<String, EngineError> {
        Ok(self.body)
    }
}

/// 按 URL 返回预设响应的引擎，未登记的 URL 视为连接失败
#[derive(Default)]
pub struct MockEngine {
    routes: HashMap<String, (u16, Option<String>, String)>,
    requests: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, status: u16, content_type: Option<&str>, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            (status, content_type.map(str::to_string), body.to_string()),
        );
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpEngine for MockEngine {
    async fn fetch(&self, request: &FetchRequest) -> Result<Box<dyn EngineResponse>, EngineError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.routes.get(&request.url) {
            Some((status, content_type, body)) => Ok(Box::new(StaticResponse {
                status: *status,
                content_type: content_type.clone(),
                body: body.clone(),
            })),
            None => Err(EngineError::Other(format!("no route for {}", request.url))),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
