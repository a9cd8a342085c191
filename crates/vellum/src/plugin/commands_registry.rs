// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use crate::commands::CommandFn;
use crate::error::RegistrationError;

struct CommandEntry {
    owner: String,
    func: CommandFn,
}

/// Global command namespace. Duplicate registration fails naming the
/// incumbent owner, so plugin authors can tell whom they collided with.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        owner: impl Into<String>,
        func: CommandFn,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if let Some(existing) = self.commands.get(&name) {
            return Err(RegistrationError::DuplicateCommand {
                name,
                owner: existing.owner.clone(),
            });
        }
        self.commands.insert(
            name,
            CommandEntry {
                owner: owner.into(),
                func,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<CommandFn> {
        self.commands.get(name).map(|entry| entry.func.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.commands.remove(name).is_some()
    }

    pub fn remove_owner(&mut self, owner: &str) {
        self.commands.retain(|_, entry| entry.owner != owner);
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.commands.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn duplicate_commands_name_the_incumbent() {
        let mut registry = CommandRegistry::new();
        registry
            .register("toggleBold", "core", Arc::new(|_| None))
            .unwrap();
        let err = registry
            .register("toggleBold", "boldPlugin", Arc::new(|_| None))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateCommand {
                name: "toggleBold".into(),
                owner: "core".into(),
            }
        );
    }

    #[test]
    fn removing_an_owner_drops_only_its_commands() {
        let mut registry = CommandRegistry::new();
        registry
            .register("toggleBold", "core", Arc::new(|_| None))
            .unwrap();
        registry
            .register("insertBanner", "banner", Arc::new(|_| None))
            .unwrap();
        registry.remove_owner("banner");
        assert!(registry.contains("toggleBold"));
        assert!(!registry.contains("insertBanner"));
    }
}
