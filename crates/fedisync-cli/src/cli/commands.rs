use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fedisync_core::models::{Notification, Status};
use fedisync_core::{consolidate, CoreConfig, Database, TimelineCache};
use serde_json::{json, Value};

/// CLI command parsed from arguments
#[derive(Debug, Clone)]
pub enum CliCommand {
    /// Number of cached items for a session
    Count { session: String },
    /// Drop the cached items of a session
    Clear { session: String },
    /// Show or overwrite the last-seen cursor
    LastSeen {
        session: String,
        set: Option<Vec<String>>,
    },
    /// Decoded cached statuses of a session
    Dump { session: String },
    /// Digest of a JSON array of notifications
    Consolidate { file: PathBuf },
}

fn open_cache(config: &CoreConfig) -> Result<TimelineCache> {
    let db = Database::open(&config.data_dir).with_context(|| {
        format!("Failed to open cache in {}", config.data_dir.display())
    })?;
    Ok(TimelineCache::with_max_items(db, config.max_cache_items))
}

/// Execute `command` and return its JSON result
pub fn run(command: CliCommand, config: &CoreConfig) -> Result<Value> {
    tracing::debug!(?command, data_dir = %config.data_dir.display(), "running command");
    match command {
        CliCommand::Count { session } => {
            let cache = open_cache(config)?;
            Ok(json!({ "session": session, "count": cache.count(&session) }))
        }
        CliCommand::Clear { session } => {
            let cache = open_cache(config)?;
            cache.clear(&session);
            Ok(json!({ "session": session, "count": cache.count(&session) }))
        }
        CliCommand::LastSeen { session, set } => {
            let cache = open_cache(config)?;
            if let Some(ids) = set {
                cache.set_last_seen(&session, &ids);
            }
            Ok(json!({ "session": session, "lastSeen": cache.get_last_seen(&session) }))
        }
        CliCommand::Dump { session } => {
            let cache = open_cache(config)?;
            let mut statuses: Vec<Status> = cache.read_items(&session);
            statuses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(serde_json::to_value(statuses)?)
        }
        CliCommand::Consolidate { file } => consolidate_file(&file),
    }
}

fn consolidate_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read notifications file: {}", path.display()))?;
    let notifications: Vec<Notification> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse notifications file: {}", path.display()))?;

    let rows: Vec<Value> = consolidate(&notifications)
        .into_iter()
        .map(|row| {
            json!({
                "id": row.id,
                "type": row.key.kind,
                "targetId": row.key.target_id,
                "createdAt": row.created_at.to_rfc3339(),
                "accounts": row.accounts.iter().map(|a| a.acct.clone()).collect::<Vec<_>>(),
                "statusId": row.status.as_ref().map(|s| s.id.clone()),
            })
        })
        .collect();
    Ok(Value::Array(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn status_json(id: &str, secs: u32) -> Value {
        json!({
            "id": id,
            "created_at": format!("2023-02-17T10:20:{:02}Z", secs),
            "account": {"id": "a1", "acct": "alice"}
        })
    }

    #[test]
    fn test_count_clear_and_dump() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::new(dir.path());
        let statuses: Vec<Status> = vec![
            serde_json::from_value(status_json("1", 1)).unwrap(),
            serde_json::from_value(status_json("2", 2)).unwrap(),
        ];
        open_cache(&config).unwrap().write("alice", &statuses);

        let count = run(CliCommand::Count { session: "alice".into() }, &config).unwrap();
        assert_eq!(count["count"], 2);

        let dump = run(CliCommand::Dump { session: "alice".into() }, &config).unwrap();
        assert_eq!(dump[0]["id"], "2");
        assert_eq!(dump[1]["id"], "1");

        let cleared = run(CliCommand::Clear { session: "alice".into() }, &config).unwrap();
        assert_eq!(cleared["count"], 0);
    }

    #[test]
    fn test_last_seen_set_and_get() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::new(dir.path());

        let empty = run(
            CliCommand::LastSeen { session: "s".into(), set: None },
            &config,
        )
        .unwrap();
        assert!(empty["lastSeen"].is_null());

        let stored = run(
            CliCommand::LastSeen {
                session: "s".into(),
                set: Some(vec!["9".into(), "8".into()]),
            },
            &config,
        )
        .unwrap();
        assert_eq!(stored["lastSeen"], json!(["9", "8"]));
    }

    #[test]
    fn test_consolidate_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        let notifications = json!([
            {
                "id": "2", "type": "favourite", "created_at": "2023-02-17T10:20:02Z",
                "account": {"id": "b", "acct": "bob"},
                "status": status_json("s1", 0)
            },
            {
                "id": "1", "type": "favourite", "created_at": "2023-02-17T10:20:01Z",
                "account": {"id": "c", "acct": "carol"},
                "status": status_json("s1", 0)
            }
        ]);
        std::fs::write(&path, notifications.to_string()).unwrap();

        let config = CoreConfig::new(dir.path());
        let rows = run(CliCommand::Consolidate { file: path }, &config).unwrap();

        assert_eq!(rows.as_array().unwrap().len(), 1);
        assert_eq!(rows[0]["accounts"], json!(["bob", "carol"]));
        assert_eq!(rows[0]["statusId"], "s1");
    }
}
