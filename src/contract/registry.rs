use super::task::TaskContract;
use crate::error::ContractError;
use std::collections::HashMap;
use std::sync::Arc;

/// Task contracts available to one agent, by name.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<TaskContract>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, contract: TaskContract) -> Result<(), ContractError> {
        let name = contract.name().to_string();
        if self.tasks.contains_key(&name) {
            return Err(ContractError::DuplicateTask { name });
        }
        self.tasks.insert(name, Arc::new(contract));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<TaskContract>> {
        self.tasks.get(name).cloned()
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<TaskContract>, ContractError> {
        self.get(name).ok_or_else(|| ContractError::UnknownTask {
            name: name.to_string(),
        })
    }

    /// Registered task names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
