//! Fixed-key local state, mirroring the browser-local storage boundary.
//!
//! Two independent JSON-encoded arrays, one file per key: `studyTodos`
//! (`[{text, completed}]`) and `studyMemos` (`[string]`). No migration or
//! versioning; malformed contents surface as an error instead of being
//! silently replaced.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const TODOS_KEY: &str = "studyTodos";
const MEMOS_KEY: &str = "studyMemos";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoEntry {
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Default)]
struct LocalState {
    todos: Vec<TodoEntry>,
    memos: Vec<String>,
}

pub struct LocalStore {
    dir: PathBuf,
    state: RwLock<LocalState>,
}

impl LocalStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create local store directory {}", dir.display()))?;

        let todos = load_array(&dir, TODOS_KEY)?;
        let memos = load_array(&dir, MEMOS_KEY)?;

        Ok(Self {
            dir,
            state: RwLock::new(LocalState { todos, memos }),
        })
    }

    pub fn todos(&self) -> Vec<TodoEntry> {
        self.state.read().unwrap().todos.clone()
    }

    pub fn memos(&self) -> Vec<String> {
        self.state.read().unwrap().memos.clone()
    }

    pub fn add_todo(&self, text: impl Into<String>) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        guard.todos.push(TodoEntry {
            text: text.into(),
            completed: false,
        });
        persist_array(&self.dir, TODOS_KEY, &guard.todos)
    }

    /// Flips the completed flag of the todo at `index`. Out-of-range indexes
    /// are ignored, matching a stale UI reference.
    pub fn toggle_todo(&self, index: usize) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        if let Some(entry) = guard.todos.get_mut(index) {
            entry.completed = !entry.completed;
            persist_array(&self.dir, TODOS_KEY, &guard.todos)?;
        }
        Ok(())
    }

    pub fn remove_todo(&self, index: usize) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        if index < guard.todos.len() {
            guard.todos.remove(index);
            persist_array(&self.dir, TODOS_KEY, &guard.todos)?;
        }
        Ok(())
    }

    pub fn add_memo(&self, text: impl Into<String>) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        guard.memos.push(text.into());
        persist_array(&self.dir, MEMOS_KEY, &guard.memos)
    }

    pub fn remove_memo(&self, index: usize) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        if index < guard.memos.len() {
            guard.memos.remove(index);
            persist_array(&self.dir, MEMOS_KEY, &guard.memos)?;
        }
        Ok(())
    }
}

fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn load_array<T: for<'de> Deserialize<'de>>(dir: &Path, key: &str) -> Result<Vec<T>> {
    let path = key_path(dir, key);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {key} from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{key} store at {} is malformed", path.display()))
}

fn persist_array<T: Serialize>(dir: &Path, key: &str, values: &[T]) -> Result<()> {
    let path = key_path(dir, key);
    let serialized = serde_json::to_string_pretty(values)?;
    fs::write(&path, serialized)
        .with_context(|| format!("failed to write {key} to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn todos_round_trip_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalStore::new(dir.path().to_path_buf()).unwrap();
            store.add_todo("review notes").unwrap();
            store.add_todo("solve problem set").unwrap();
            store.toggle_todo(0).unwrap();
        }

        let store = LocalStore::new(dir.path().to_path_buf()).unwrap();
        let todos = store.todos();
        assert_eq!(
            todos,
            vec![
                TodoEntry {
                    text: "review notes".into(),
                    completed: true,
                },
                TodoEntry {
                    text: "solve problem set".into(),
                    completed: false,
                },
            ]
        );
    }

    #[test]
    fn memos_are_bare_strings_under_their_own_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf()).unwrap();
        store.add_memo("chapter 4 was hard").unwrap();
        store.add_memo("redo flashcards").unwrap();
        store.remove_memo(0).unwrap();

        let raw = fs::read_to_string(dir.path().join("studyMemos.json")).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["redo flashcards".to_string()]);

        // Todos key is untouched by memo writes.
        assert!(!dir.path().join("studyTodos.json").exists());
    }

    #[test]
    fn malformed_stored_state_surfaces_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("studyTodos.json"), "{not json").unwrap();

        let result = LocalStore::new(dir.path().to_path_buf());
        assert!(result.is_err());
        let message = format!("{:#}", result.err().unwrap());
        assert!(message.contains("studyTodos"));
    }

    #[test]
    fn out_of_range_indexes_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf()).unwrap();
        store.add_todo("only entry").unwrap();
        store.toggle_todo(7).unwrap();
        store.remove_todo(7).unwrap();
        assert_eq!(store.todos().len(), 1);
    }
}
