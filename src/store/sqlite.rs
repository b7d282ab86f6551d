use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use tokio::sync::oneshot;

use super::helpers::{fmt_datetime, parse_datetime, parse_optional_datetime, parse_status, to_bpm};
use super::migrations::run_migrations;
use super::HealthStore;
use crate::models::{HeartRateSample, Workout, WorkoutStatus};

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("Failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join store thread: {join_err:?}");
            }
        }
    }
}

/// SQLite-backed [`HealthStore`]. All statements run on a dedicated worker
/// thread; async callers hand over closures and await the reply.
#[derive(Clone)]
pub struct SqliteHealthStore {
    inner: Arc<StoreInner>,
    db_path: Arc<PathBuf>,
}

impl SqliteHealthStore {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("saunalog-store".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run store migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("Store initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        StoreCommand::Shutdown => break,
                    }
                }

                info!("Store thread shutting down");
            })
            .with_context(|| "failed to spawn store worker thread")?;

        ready_rx
            .recv()
            .context("store worker exited before signaling readiness")??;

        info!("Health store initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to store thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("store thread terminated unexpectedly"))?
    }
}

fn row_to_workout(row: &Row) -> Result<Workout> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Workout {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        status: parse_status(&status)?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

#[async_trait]
impl HealthStore for SqliteHealthStore {
    async fn insert_workout(&self, workout: &Workout) -> Result<()> {
        let record = workout.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO workouts (id, started_at, ended_at, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    fmt_datetime(record.started_at),
                    record.ended_at.map(fmt_datetime),
                    record.status.as_str(),
                    fmt_datetime(record.created_at),
                    fmt_datetime(record.updated_at),
                ],
            )
            .with_context(|| "failed to insert workout")?;
            Ok(())
        })
        .await
    }

    async fn update_workout_progress(&self, id: &str, seen_at: DateTime<Utc>) -> Result<()> {
        let id = id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE workouts
                 SET updated_at = ?1
                 WHERE id = ?2",
                params![fmt_datetime(seen_at), id],
            )
            .with_context(|| "failed to update workout progress")?;
            Ok(())
        })
        .await
    }

    async fn finish_workout(&self, id: &str, ended_at: DateTime<Utc>) -> Result<()> {
        let id = id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn
                .execute(
                    "UPDATE workouts
                     SET status = ?1,
                         ended_at = ?2,
                         updated_at = ?3
                     WHERE id = ?4",
                    params![
                        WorkoutStatus::Completed.as_str(),
                        fmt_datetime(ended_at),
                        fmt_datetime(ended_at),
                        id,
                    ],
                )
                .with_context(|| "failed to finish workout")?;

            if rows_affected == 0 {
                return Err(anyhow!("workout {id} not found"));
            }

            Ok(())
        })
        .await
    }

    async fn mark_interrupted(&self, id: &str, stopped_at: DateTime<Utc>) -> Result<()> {
        let id = id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE workouts
                 SET status = ?1,
                     ended_at = ?2,
                     updated_at = ?3
                 WHERE id = ?4",
                params![
                    WorkoutStatus::Interrupted.as_str(),
                    fmt_datetime(stopped_at),
                    fmt_datetime(stopped_at),
                    id,
                ],
            )
            .with_context(|| "failed to mark workout interrupted")?;
            Ok(())
        })
        .await
    }

    async fn get_workout(&self, id: &str) -> Result<Option<Workout>> {
        let id = id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, ended_at, status, created_at, updated_at
                 FROM workouts
                 WHERE id = ?1",
            )?;

            let mut rows = stmt.query(params![id])?;
            let workout = match rows.next()? {
                Some(row) => Some(row_to_workout(row)?),
                None => None,
            };
            Ok(workout)
        })
        .await
    }

    async fn find_running_workout(&self) -> Result<Option<Workout>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, ended_at, status, created_at, updated_at
                 FROM workouts
                 WHERE status = 'Running'
                 ORDER BY started_at DESC
                 LIMIT 1",
            )?;

            let mut rows = stmt.query([])?;
            let workout = match rows.next()? {
                Some(row) => Some(row_to_workout(row)?),
                None => None,
            };
            Ok(workout)
        })
        .await
    }

    async fn list_workouts(&self) -> Result<Vec<Workout>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, ended_at, status, created_at, updated_at
                 FROM workouts
                 WHERE status IN ('Completed', 'Interrupted')
                 ORDER BY started_at DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut workouts = Vec::new();
            while let Some(row) = rows.next()? {
                workouts.push(row_to_workout(row)?);
            }

            Ok(workouts)
        })
        .await
    }

    async fn delete_workout(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM workouts WHERE id = ?1", params![id])
                .with_context(|| "failed to delete workout")?;
            Ok(())
        })
        .await
    }

    async fn replace_workout(&self, original_id: &str, replacement: &Workout) -> Result<()> {
        let original_id = original_id.to_string();
        let record = replacement.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            // OR REPLACE so replaying the same edit lands on the same row
            // instead of failing on the primary key.
            tx.execute(
                "INSERT OR REPLACE INTO workouts (id, started_at, ended_at, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    fmt_datetime(record.started_at),
                    record.ended_at.map(fmt_datetime),
                    record.status.as_str(),
                    fmt_datetime(record.created_at),
                    fmt_datetime(record.updated_at),
                ],
            )
            .with_context(|| "failed to insert replacement workout")?;

            // The original may already be gone if the same edit ran twice;
            // the replacement row is what matters.
            tx.execute(
                "DELETE FROM workouts WHERE id = ?1",
                params![original_id],
            )
            .with_context(|| "failed to delete original workout")?;

            tx.commit().context("failed to commit workout replacement")?;
            Ok(())
        })
        .await
    }

    async fn insert_sample(&self, sample: &HeartRateSample) -> Result<()> {
        let record = sample.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO heart_rate_samples (bpm, sampled_at)
                 VALUES (?1, ?2)",
                params![i64::from(record.bpm), fmt_datetime(record.sampled_at)],
            )
            .with_context(|| "failed to insert heart rate sample")?;
            Ok(())
        })
        .await
    }

    async fn samples_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HeartRateSample>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT bpm, sampled_at
                 FROM heart_rate_samples
                 WHERE sampled_at >= ?1 AND sampled_at < ?2
                 ORDER BY sampled_at ASC",
            )?;

            let mut rows = stmt.query(params![fmt_datetime(start), fmt_datetime(end)])?;
            let mut samples = Vec::new();
            while let Some(row) = rows.next()? {
                let bpm: i64 = row.get(0)?;
                let sampled_at: String = row.get(1)?;
                samples.push(HeartRateSample {
                    bpm: to_bpm(bpm, "bpm")?,
                    sampled_at: parse_datetime(&sampled_at, "sampled_at")?,
                });
            }

            Ok(samples)
        })
        .await
    }
}
