//! 事件记录器（EventRecorder）与作用域事件缓冲（EventBuffer）
//!
//! 用例执行期间产生的事件先缓存在作用域内，事务提交成功后整体移交给事件总线；
//! 回滚时整体丢弃。缓冲一旦封存（提交或回滚），后续记录一律失败。
//!
use crate::domain_event::{CorrelationId, DomainEvent, EventPayload};
use crate::error::{DomainError, DomainResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BufferState {
    Open,
    /// 查询作用域：不允许产生事件
    ReadOnly,
    Sealed,
}

#[derive(Debug)]
struct Pending {
    state: BufferState,
    correlation_id: CorrelationId,
    events: Vec<DomainEvent>,
}

/// 面向处理器的记录句柄，可克隆；只能追加事件
#[derive(Clone, Debug)]
pub struct EventRecorder {
    inner: Arc<Mutex<Pending>>,
}

impl EventRecorder {
    /// 追加事件到当前作用域；作用域已关闭或只读时返回 `InvalidState`
    pub fn record(&self, event: DomainEvent) -> DomainResult<()> {
        let mut pending = lock(&self.inner);
        match pending.state {
            BufferState::Open => {
                let event = event.with_correlation_id(&pending.correlation_id);
                pending.events.push(event);
                Ok(())
            }
            BufferState::ReadOnly => Err(DomainError::invalid_state(format!(
                "cannot record event '{}' in a read-only scope",
                event.event_type()
            ))),
            BufferState::Sealed => Err(DomainError::invalid_state(format!(
                "cannot record event '{}' outside an open scope",
                event.event_type()
            ))),
        }
    }

    /// 记录类型化载荷
    pub fn record_payload<P: EventPayload>(&self, payload: &P) -> DomainResult<()> {
        self.record(DomainEvent::from_payload(payload)?)
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.inner).events.len()
    }

    pub fn is_open(&self) -> bool {
        lock(&self.inner).state == BufferState::Open
    }
}

/// 作用域事件缓冲的唯一所有者
///
/// 封存操作按值消费自身，保证一个作用域的事件至多被移交或丢弃一次。
#[derive(Debug)]
pub struct EventBuffer {
    recorder: EventRecorder,
}

impl EventBuffer {
    pub fn new(correlation_id: CorrelationId) -> Self {
        Self::with_state(correlation_id, BufferState::Open)
    }

    /// 只读缓冲（查询作用域）
    pub fn read_only(correlation_id: CorrelationId) -> Self {
        Self::with_state(correlation_id, BufferState::ReadOnly)
    }

    fn with_state(correlation_id: CorrelationId, state: BufferState) -> Self {
        Self {
            recorder: EventRecorder {
                inner: Arc::new(Mutex::new(Pending {
                    state,
                    correlation_id,
                    events: Vec::new(),
                })),
            },
        }
    }

    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    /// 封存并取出全部事件（按记录顺序），用于提交成功之后
    pub fn seal_and_take(self) -> Vec<DomainEvent> {
        let mut pending = lock(&self.recorder.inner);
        pending.state = BufferState::Sealed;
        std::mem::take(&mut pending.events)
    }

    /// 封存并丢弃全部事件，返回丢弃数量，用于回滚
    pub fn seal_and_discard(self) -> usize {
        let mut pending = lock(&self.recorder.inner);
        pending.state = BufferState::Sealed;
        let dropped = pending.events.len();
        pending.events.clear();
        dropped
    }
}

// 记录过程中不会在持锁期间 panic，中毒时沿用内部数据即可
fn lock(inner: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
