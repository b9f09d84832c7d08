// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

use crate::domain::models::Domain;

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<Domain>,
    closed: bool,
}

/// 固定容量的任务队列
///
/// 生产者（worker 发现的子域名、证书流）通过 [`BoundedTaskQueue::try_push`]
/// 非阻塞地入队，队列满时直接丢弃；消费者通过 [`BoundedTaskQueue::pop`] 等待任务。
/// 关闭后不再接受新任务，但已入队的任务仍可被取出，取空后所有消费者收到 `None`。
#[derive(Debug)]
pub struct BoundedTaskQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl BoundedTaskQueue {
    /// 创建指定容量的队列
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity.min(4096)),
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
        }
    }

    /// 非阻塞入队
    ///
    /// # 返回值
    ///
    /// 入队成功返回 `true`；队列已满或已关闭时丢弃任务并返回 `false`。
    pub fn try_push(&self, domain: Domain) -> bool {
        {
            let mut state = self.state.lock();
            if state.closed || state.items.len() >= self.capacity {
                return false;
            }
            state.items.push_back(domain);
        }
        self.notify.notify_one();
        true
    }

    /// 出队，队列为空时等待
    ///
    /// # 返回值
    ///
    /// * `Some(Domain)` - 下一个任务
    /// * `None` - 队列已关闭且已取空
    pub async fn pop(&self) -> Option<Domain> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking state so a push or close between the
            // check and the await is not missed.
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(domain) = state.items.pop_front() {
                    return Some(domain);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// 关闭队列并唤醒所有等待中的消费者
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "task_queue_test.rs"]
mod tests;
