//! Scheduler отложенных continuations (замена coroutines)
//!
//! Все задержки симуляции: записи "resume-at" в priority queue:
//! - патрульная пауза (ResumePatrol)
//! - удаление трупа (Despawn)
//! - респаун игрока (Respawn)
//! - гашение визуала attack ray (ClearAttackRay)
//!
//! `dispatch_due_continuations` в начале каждого тика превращает созревшие
//! записи в `ContinuationDue` события, обработчики живут в своих модулях.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy::prelude::*;

/// Handle запланированной continuation (для отмены)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct TaskId(u64);

/// Что выполнить по таймеру
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Continuation {
    /// Конец патрульной паузы → следующий waypoint
    ResumePatrol,
    /// Игрок: вернуть на respawn point
    Respawn,
    /// Враг: удалить труп из симуляции
    Despawn,
    /// Погасить визуал выстрела
    ClearAttackRay,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub entity: Entity,
    /// Время срабатывания (секунды от старта симуляции)
    pub due_at: f32,
    pub continuation: Continuation,
}

/// Обёртка для min-heap по (due_at, id)
#[derive(Debug, Clone, Copy)]
struct QueuedTask(ScheduledTask);

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap: max-heap, разворачиваем: раньше due_at → выше приоритет
        other
            .0
            .due_at
            .total_cmp(&self.0.due_at)
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

/// Resource: очередь continuations
#[derive(Resource, Default)]
pub struct Scheduler {
    queue: BinaryHeap<QueuedTask>,
    next_id: u64,
}

impl Scheduler {
    /// Запланировать на абсолютное время
    pub fn schedule(&mut self, entity: Entity, due_at: f32, continuation: Continuation) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        self.queue.push(QueuedTask(ScheduledTask {
            id,
            entity,
            due_at,
            continuation,
        }));
        id
    }

    /// `Scheduler.After(duration, callback)`
    pub fn after(&mut self, now: f32, delay: f32, entity: Entity, continuation: Continuation) -> TaskId {
        self.schedule(entity, now + delay.max(0.0), continuation)
    }

    /// Отменить одну запись. false: уже сработала или отменена.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|task| task.0.id != id);
        self.queue.len() != before
    }

    /// Отменить всё, что принадлежит entity (деспавн)
    pub fn cancel_entity(&mut self, entity: Entity) -> usize {
        let before = self.queue.len();
        self.queue.retain(|task| task.0.entity != entity);
        before - self.queue.len()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.queue.iter().any(|task| task.0.id == id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Достать все записи с `due_at <= now` (по времени, при равенстве: FIFO)
    pub fn drain_due(&mut self, now: f32) -> Vec<ScheduledTask> {
        let mut due = Vec::new();
        while let Some(next) = self.queue.peek() {
            if next.0.due_at > now {
                break;
            }
            if let Some(task) = self.queue.pop() {
                due.push(task.0);
            }
        }
        due
    }
}

/// Event: continuation созрела
#[derive(Event, Debug, Clone, Copy)]
pub struct ContinuationDue {
    pub task: TaskId,
    pub entity: Entity,
    pub continuation: Continuation,
}

/// System: созревшие записи → `ContinuationDue` (первая система тика)
pub fn dispatch_due_continuations(
    mut scheduler: ResMut<Scheduler>,
    time: Res<Time>,
    mut due_events: EventWriter<ContinuationDue>,
) {
    for task in scheduler.drain_due(time.elapsed_secs()) {
        due_events.write(ContinuationDue {
            task: task.id,
            entity: task.entity,
            continuation: task.continuation,
        });
    }
}
