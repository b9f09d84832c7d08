// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use certsweep::infrastructure::stream::{FeedConnector, FeedStream, StreamError};
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 前 `failures` 次连接失败，之后每次连接依次推送 `messages` 再断开
pub struct ScriptedFeed {
    failures: usize,
    messages: Vec<String>,
    attempts: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new(failures: usize, messages: Vec<String>) -> Self {
        Self {
            failures,
            messages,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedConnector for ScriptedFeed {
    async fn connect(&self) -> Result<FeedStream, StreamError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(StreamError::Connect("connection refused".to_string()));
        }
        let items: Vec<Result<String, StreamError>> =
            self.messages.iter().cloned().map(Ok).collect();
        Ok(futures::stream::iter(items).boxed())
    }

    fn endpoint(&self) -> &str {
        "wss://feed.test/"
    }
}

pub fn certificate_update(domains: &[&str]) -> String {
    serde_json::json!({
        "message_type": "certificate_update",
        "data": { "leaf_cert": { "all_domains": domains } }
    })
    .to_string()
}
