//! Mock indexing task simulator
//!
//! Produces randomized task snapshots and advances them on a timer. The
//! data is synthetic: there is no job system behind it.

use chrono::{DateTime, Duration, Utc};
use r2v_common::model::{IndexingTask, TaskStatus};
use rand::seq::SliceRandom;
use rand::Rng;

/// Filenames the simulator draws from
pub const TASK_CATALOGUE: &[(&str, &str)] = &[
    ("1", "Bohemian Rhapsody - Queen.mp3"),
    ("2", "Stairway to Heaven - Led Zeppelin.mp3"),
    ("3", "Hotel California - Eagles.mp3"),
    ("4", "Sweet Child O'Mine - Guns N' Roses.mp3"),
    ("5", "Smells Like Teen Spirit - Nirvana.mp3"),
    ("6", "Imagine - John Lennon.mp3"),
    ("7", "Billie Jean - Michael Jackson.mp3"),
    ("8", "Like a Rolling Stone - Bob Dylan.mp3"),
    ("9", "I Will Always Love You - Whitney Houston.mp3"),
    ("10", "Hey Jude - The Beatles.mp3"),
];

/// Tasks per snapshot
pub const SNAPSHOT_SIZE: usize = 5;

/// Tasks older than this are finished
const TERMINAL_AGE_MINUTES: f64 = 5.0;

/// Probability a finished snapshot task succeeded
const COMPLETED_PROBABILITY: f64 = 0.8;

/// Probability an active task advances on a tick
const ADVANCE_PROBABILITY: f64 = 0.3;

const IN_PROGRESS: [TaskStatus; 3] = [
    TaskStatus::Downloading,
    TaskStatus::Vectorizing,
    TaskStatus::Inserting,
];

/// Status implied by a task's age
fn status_for_age<R: Rng + ?Sized>(rng: &mut R, age_minutes: f64) -> TaskStatus {
    if age_minutes > TERMINAL_AGE_MINUTES {
        return if rng.gen_bool(COMPLETED_PROBABILITY) {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
    }

    let index = ((age_minutes / 2.0).floor() as usize).min(IN_PROGRESS.len() - 1);
    IN_PROGRESS[index]
}

/// Random snapshot of [`SNAPSHOT_SIZE`] tasks started in the last ten minutes
pub fn snapshot<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<IndexingTask> {
    let mut catalogue: Vec<&(&str, &str)> = TASK_CATALOGUE.iter().collect();
    catalogue.shuffle(rng);

    catalogue
        .into_iter()
        .take(SNAPSHOT_SIZE)
        .map(|(id, filename)| {
            let age_minutes = rng.gen_range(0..10);
            let start_time = now - Duration::minutes(age_minutes);
            let status = status_for_age(rng, age_minutes as f64);

            let mut task = IndexingTask {
                id: id.to_string(),
                filename: filename.to_string(),
                status,
                start_time,
                end_time: None,
                error: None,
            };

            if status.is_terminal() {
                task.end_time = Some(start_time + Duration::seconds(rng.gen_range(10..40)));
                if status == TaskStatus::Failed {
                    task.error = Some(
                        if rng.gen_bool(0.5) {
                            "Network error during download"
                        } else {
                            "Vectorization failed"
                        }
                        .to_string(),
                    );
                }
            }

            task
        })
        .collect()
}

/// Possibly advance one task a single step
///
/// Terminal tasks never change. Returns the updated task when the status
/// moved; reaching a terminal status stamps `end_time`.
pub fn advance<R: Rng + ?Sized>(
    task: &IndexingTask,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Option<IndexingTask> {
    if task.status.is_terminal() || !rng.gen_bool(ADVANCE_PROBABILITY) {
        return None;
    }

    let next = task.status.next();
    let mut updated = task.clone();
    updated.status = next;
    if next.is_terminal() {
        updated.end_time = Some(now);
    }
    Some(updated)
}

/// Per-stream task list advanced once per tick
#[derive(Debug, Clone)]
pub struct TaskFeed {
    tasks: Vec<IndexingTask>,
}

impl TaskFeed {
    pub fn new(tasks: Vec<IndexingTask>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[IndexingTask] {
        &self.tasks
    }

    /// Whether every task is terminal
    pub fn is_settled(&self) -> bool {
        self.tasks.iter().all(|t| t.status.is_terminal())
    }

    /// Advance all tasks once; returns `(old_status, updated_task)` per change
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Vec<(TaskStatus, IndexingTask)> {
        let mut changes = Vec::new();
        for task in self.tasks.iter_mut() {
            if let Some(updated) = advance(task, rng, now) {
                let old_status = task.status;
                *task = updated.clone();
                changes.push((old_status, updated));
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn task(status: TaskStatus) -> IndexingTask {
        IndexingTask {
            id: "1".to_string(),
            filename: "Imagine - John Lennon.mp3".to_string(),
            status,
            start_time: Utc::now(),
            end_time: None,
            error: None,
        }
    }

    #[test]
    fn test_status_for_young_tasks_follows_age() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(status_for_age(&mut rng, 0.0), TaskStatus::Downloading);
        assert_eq!(status_for_age(&mut rng, 1.0), TaskStatus::Downloading);
        assert_eq!(status_for_age(&mut rng, 2.0), TaskStatus::Vectorizing);
        assert_eq!(status_for_age(&mut rng, 4.0), TaskStatus::Inserting);
        assert_eq!(status_for_age(&mut rng, 5.0), TaskStatus::Inserting);
    }

    #[test]
    fn test_status_for_old_tasks_is_terminal() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            assert!(status_for_age(&mut rng, 6.0).is_terminal());
        }
    }

    #[test]
    fn test_snapshot_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        let now = Utc::now();

        for _ in 0..20 {
            let tasks = snapshot(&mut rng, now);
            assert_eq!(tasks.len(), SNAPSHOT_SIZE);

            let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids.len(), SNAPSHOT_SIZE, "ids must be distinct");

            for t in &tasks {
                assert!(t.start_time <= now);
                assert!(now - t.start_time < Duration::minutes(10));
                assert_eq!(t.status.is_terminal(), t.end_time.is_some());
                assert_eq!(t.status == TaskStatus::Failed, t.error.is_some());
                if let Some(end) = t.end_time {
                    let took = end - t.start_time;
                    assert!(took >= Duration::seconds(10) && took < Duration::seconds(40));
                }
            }
        }
    }

    #[test]
    fn test_terminal_tasks_never_advance() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert!(advance(&task(TaskStatus::Completed), &mut rng, Utc::now()).is_none());
            assert!(advance(&task(TaskStatus::Failed), &mut rng, Utc::now()).is_none());
        }
    }

    #[test]
    fn test_feed_only_moves_forward() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut feed = TaskFeed::new(vec![task(TaskStatus::Downloading)]);

        for _ in 0..200 {
            for (old, updated) in feed.tick(&mut rng, Utc::now()) {
                assert_eq!(updated.status, old.next());
                assert!(updated.status.rank() > old.rank());
            }
        }

        // 200 ticks at 30% each is far more than the three steps needed
        assert!(feed.is_settled());
        assert_eq!(feed.tasks()[0].status, TaskStatus::Completed);
        assert!(feed.tasks()[0].end_time.is_some());
    }
}
