// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供固定容量的任务队列与去重准入路径
/// 队列满时丢弃新任务而不是阻塞生产者
pub mod admission;
pub mod task_queue;

pub use admission::{Admission, AdmissionGate};
pub use task_queue::BoundedTaskQueue;
