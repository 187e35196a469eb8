//! Task Queue - 全局串行任务队列
//!
//! 所有影响音箱的操作（speak / chat / play / 语音指令副作用）都必须经由
//! 本队列提交，由单一消费循环按提交顺序逐个执行，保证物理设备在任一
//! 时刻只收到一条播放指令。
//!
//! 失败语义：任务失败只影响该任务自身的结果（错误原样抛回提交方），
//! 队列照常推进到下一个任务，绝不会被单个任务卡死。

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};

use super::error::AppError;

/// 最近一次任务失败的摘要
#[derive(Debug, Clone, Serialize)]
pub struct TaskErrorInfo {
    /// 错误类别（AppError::kind）
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// 队列状态快照
///
/// 只由队列自身写入；任何协作方（如健康上报）可读。
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStatus {
    /// 排队中 + 执行中的任务数
    pub depth: usize,
    /// 最近完成的任务类型
    pub last_task_type: Option<String>,
    /// 最近一次任务失败摘要（最近任务成功时为 None）
    pub last_task_error: Option<TaskErrorInfo>,
    /// 最近任务完成时间
    pub last_finished_at: Option<DateTime<Utc>>,
}

/// 队列中的一个任务：执行后返回失败摘要（成功为 None），
/// 任务自身的结果通过 oneshot 发回提交方
struct QueuedTask {
    task_type: String,
    run: Box<dyn FnOnce() -> BoxFuture<'static, Option<(String, String)>> + Send>,
}

/// 全局串行任务队列
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<QueuedTask>,
    status: Arc<Mutex<QueueStatus>>,
}

/// 锁中毒时直接取回内部值继续使用（状态只是监控数据）
fn lock_status(status: &Mutex<QueueStatus>) -> MutexGuard<'_, QueueStatus> {
    status.lock().unwrap_or_else(|e| e.into_inner())
}

impl TaskQueue {
    /// 创建队列并启动消费循环
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let status = Arc::new(Mutex::new(QueueStatus::default()));

        tokio::spawn(Self::run(receiver, status.clone()));

        Self { sender, status }
    }

    /// 提交一个任务
    ///
    /// 提交方不会阻塞，返回的 future 在该任务真正完成时结束。
    /// 任务按提交顺序执行，全局同一时刻至多一个任务在运行。
    pub fn enqueue<T, F>(
        &self,
        task_type: impl Into<String>,
        fut: F,
    ) -> impl Future<Output = Result<T, AppError>>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let task_type = task_type.into();
        let (result_tx, result_rx) = oneshot::channel::<Result<T, AppError>>();

        let task = QueuedTask {
            task_type,
            run: Box::new(move || {
                Box::pin(async move {
                    let result = fut.await;
                    let failure = result
                        .as_ref()
                        .err()
                        .map(|e| (e.kind().to_string(), e.to_string()));
                    // 提交方可能已放弃等待，发送失败不影响队列推进
                    let _ = result_tx.send(result);
                    failure
                })
            }),
        };

        lock_status(&self.status).depth += 1;
        let enqueued = self.sender.send(task).is_ok();
        if !enqueued {
            let mut status = lock_status(&self.status);
            status.depth = status.depth.saturating_sub(1);
        }

        async move {
            if !enqueued {
                return Err(AppError::TaskFailed("task queue closed".to_string()));
            }
            match result_rx.await {
                Ok(result) => result,
                Err(_) => Err(AppError::TaskFailed(
                    "task dropped before completion".to_string(),
                )),
            }
        }
    }

    /// 获取状态快照
    pub fn status(&self) -> QueueStatus {
        lock_status(&self.status).clone()
    }

    /// 消费循环：严格一次一个，完成（无论成败）后才取下一个
    async fn run(mut receiver: mpsc::UnboundedReceiver<QueuedTask>, status: Arc<Mutex<QueueStatus>>) {
        tracing::info!("Task queue started");

        while let Some(task) = receiver.recv().await {
            let task_type = task.task_type.clone();
            tracing::debug!(task_type = %task_type, "Task started");

            let failure = (task.run)().await;

            let now = Utc::now();
            {
                let mut s = lock_status(&status);
                s.depth = s.depth.saturating_sub(1);
                s.last_task_type = Some(task_type.clone());
                s.last_finished_at = Some(now);
                s.last_task_error = failure.clone().map(|(kind, message)| TaskErrorInfo {
                    kind,
                    message,
                    at: now,
                });
            }

            match failure {
                Some((kind, message)) => {
                    tracing::warn!(task_type = %task_type, error_kind = %kind, error = %message, "Task failed")
                }
                None => tracing::debug!(task_type = %task_type, "Task finished"),
            }
        }

        tracing::info!("Task queue stopped");
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_tasks_execute_in_submission_order() {
        let queue = TaskQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let order = order.clone();
            // 前面的任务执行更慢，若存在并发或重排会打乱记录顺序
            let delay = Duration::from_millis(if i < 5 { 20 } else { 1 });
            handles.push(queue.enqueue("test", async move {
                tokio::time::sleep(delay).await;
                order.lock().unwrap().push(i);
                Ok::<_, AppError>(i)
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), i);
        }

        let recorded = order.lock().unwrap().clone();
        assert_eq!(recorded, (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_at_most_one_task_running() {
        let queue = TaskQueue::new();
        let running = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let running = running.clone();
            let max_seen = max_seen.clone();
            handles.push(queue.enqueue("test", async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, AppError>(())
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_task_does_not_block_queue() {
        let queue = TaskQueue::new();

        let failing = queue.enqueue("boom", async {
            Err::<(), _>(AppError::TaskFailed("deliberate".to_string()))
        });
        let following = queue.enqueue("after", async { Ok::<_, AppError>(42) });

        assert!(failing.await.is_err());
        assert_eq!(following.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_status_reflects_last_task() {
        let queue = TaskQueue::new();

        queue
            .enqueue("speak", async { Ok::<_, AppError>(()) })
            .await
            .unwrap();

        let status = queue.status();
        assert_eq!(status.depth, 0);
        assert_eq!(status.last_task_type.as_deref(), Some("speak"));
        assert!(status.last_task_error.is_none());
        assert!(status.last_finished_at.is_some());

        let _ = queue
            .enqueue("chat", async {
                Err::<(), _>(AppError::EngineNotReady)
            })
            .await;

        let status = queue.status();
        assert_eq!(status.last_task_type.as_deref(), Some("chat"));
        let err = status.last_task_error.expect("error recorded");
        assert_eq!(err.kind, "EngineNotReady");
    }

    #[tokio::test]
    async fn test_error_cleared_after_success() {
        let queue = TaskQueue::new();

        let _ = queue
            .enqueue("bad", async { Err::<(), _>(AppError::EngineNotReady) })
            .await;
        queue
            .enqueue("good", async { Ok::<_, AppError>(()) })
            .await
            .unwrap();

        assert!(queue.status().last_task_error.is_none());
    }
}
