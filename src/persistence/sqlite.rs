use super::{GanttViewStore, PersistenceError, PersistenceResult};
use crate::chart::UndatedPolicy;
use crate::config::ViewConfig;
use crate::task::ProjectTask;
use crate::validation;
use crate::view::GanttView;
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

pub struct SqliteTaskStore {
    connection: Mutex<Connection>,
}

impl SqliteTaskStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS gantt_view_config (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                config_json TEXT NOT NULL,
                undated_policy TEXT NOT NULL DEFAULT 'skip'
            );
            CREATE TABLE IF NOT EXISTS project_task (
                id INTEGER PRIMARY KEY,
                task_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_config(
        &self,
        tx: &rusqlite::Transaction,
        config: &ViewConfig,
        policy: UndatedPolicy,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(config)?;
        tx.execute("DELETE FROM gantt_view_config", [])?;
        tx.execute(
            "INSERT INTO gantt_view_config (id, config_json, undated_policy) VALUES (1, ?1, ?2)",
            params![json, policy.as_str()],
        )?;
        Ok(())
    }

    fn save_tasks(&self, tx: &rusqlite::Transaction, view: &GanttView) -> PersistenceResult<()> {
        tx.execute("DELETE FROM project_task", [])?;
        let mut stmt = tx.prepare("INSERT INTO project_task (id, task_json) VALUES (?1, ?2)")?;
        for task in view.tasks()? {
            let json = serde_json::to_string(&task)?;
            stmt.execute(params![task.id, json])?;
        }
        Ok(())
    }

    /// The save-time write path for the widget's date callback: loads the
    /// stored record, applies the new dates, and re-checks the range
    /// constraint inside the transaction. A violation rolls back, leaving
    /// the row exactly as it was.
    pub fn write_gantt_dates(
        &self,
        task_id: i32,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;

        let json: Option<String> = tx
            .query_row(
                "SELECT task_json FROM project_task WHERE id = ?1",
                params![task_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(json) = json else {
            return Err(PersistenceError::NotFound);
        };

        let mut task: ProjectTask = serde_json::from_str(&json)?;
        task.gantt.start = start;
        task.gantt.end = end;
        validation::validate_gantt_dates(&task)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;

        let updated = serde_json::to_string(&task)?;
        tx.execute(
            "UPDATE project_task SET task_json = ?1 WHERE id = ?2",
            params![updated, task_id],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl GanttViewStore for SqliteTaskStore {
    fn save_view(&self, view: &GanttView) -> PersistenceResult<()> {
        super::validate_view(view)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_config(&tx, view.config(), view.undated_policy())?;
        self.save_tasks(&tx, view)?;
        tx.commit()?;
        Ok(())
    }

    fn load_view(&self) -> PersistenceResult<Option<GanttView>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn
            .prepare("SELECT config_json, undated_policy FROM gantt_view_config WHERE id = 1")?;
        let row: Option<(String, String)> = stmt
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((config_json, policy_raw)) = row else {
            return Ok(None);
        };

        let config: ViewConfig = serde_json::from_str(&config_json)?;
        let policy = UndatedPolicy::from_str(&policy_raw).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid undated policy '{policy_raw}'"))
        })?;

        let mut stmt = conn.prepare("SELECT task_json FROM project_task ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tasks = Vec::new();
        for json in rows {
            let json = json?;
            let task: ProjectTask = serde_json::from_str(&json)?;
            tasks.push(task);
        }

        super::validate_tasks(&tasks)?;

        let mut view = GanttView::from_parts(config, policy);
        for task in tasks {
            view.upsert_task_record(task)?;
        }

        Ok(Some(view))
    }
}
