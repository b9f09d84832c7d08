// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 实时发现源模块
///
/// 提供 certstream WebSocket 连接器与事件解析
pub mod certstream;

pub use certstream::{parse_event, CertstreamConnector, FeedConnector, FeedEvent, FeedStream, StreamError};
