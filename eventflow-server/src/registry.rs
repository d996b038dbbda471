//! Module registry - explicit dependency wiring
//!
//! A [`Module`] declares the shared values it provides, which of them it
//! exports, and which other modules it imports. A global module's exports are
//! visible to every module. The [`Registry`] is built once at process entry
//! and handed to whatever needs to resolve dependencies; there is no ambient
//! lookup.
//!
//! Resolution always returns the same `Arc` for a given provider, so every
//! dependent observes the identical instance.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::db::{ConnectionManager, DataStore};

/// Name of the module that provides the connection manager.
pub const DATABASE_MODULE: &str = "database";

/// A provided value whose availability changes over time.
///
/// Resolution fails while `ensure_available` returns an error, so dependents
/// cannot obtain a value that is not (or no longer) usable.
pub trait Managed: Send + Sync + 'static {
    fn ensure_available(&self) -> Result<(), String>;
}

type Gate = Arc<dyn Fn() -> Result<(), String> + Send + Sync>;

struct Provider {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    gate: Option<Gate>,
}

/// Errors from building the registry or resolving a capability
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("module '{0}' is registered more than once")]
    DuplicateModule(String),

    #[error("module '{module}' imports unknown module '{import}'")]
    UnknownImport { module: String, import: String },

    #[error("module '{module}' exports {capability} without providing it")]
    ExportNotProvided { module: String, capability: String },

    #[error("{capability} is exported by global modules '{first}' and '{second}'")]
    ConflictingGlobalExport {
        capability: String,
        first: String,
        second: String,
    },

    #[error("unknown module '{0}'")]
    UnknownModule(String),

    #[error("no module provides {capability}")]
    NotProvided { capability: String },

    #[error("{capability} is provided by '{owner}' but not visible to '{requester}'")]
    NotVisible {
        capability: String,
        owner: String,
        requester: String,
    },

    #[error("{capability} is unavailable: {reason}")]
    Unavailable { capability: String, reason: String },
}

/// A named unit of providers, exports and imports.
pub struct Module {
    name: &'static str,
    global: bool,
    imports: Vec<&'static str>,
    providers: HashMap<TypeId, Provider>,
    exports: HashMap<TypeId, &'static str>,
}

impl Module {
    pub fn builder(name: &'static str) -> ModuleBuilder {
        ModuleBuilder {
            module: Module {
                name,
                global: false,
                imports: Vec::new(),
                providers: HashMap::new(),
                exports: HashMap::new(),
            },
        }
    }

    fn is_exported(&self, id: &TypeId) -> bool {
        self.exports.contains_key(id) && self.providers.contains_key(id)
    }
}

pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    /// Make this module's exports visible to every module.
    pub fn global(mut self) -> Self {
        self.module.global = true;
        self
    }

    /// Allow resolving the exports of another module.
    pub fn import(mut self, module: &'static str) -> Self {
        self.module.imports.push(module);
        self
    }

    /// Provide a shared value, keyed by its type.
    pub fn provide<T: Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.module.providers.insert(
            TypeId::of::<T>(),
            Provider {
                value,
                type_name: type_name::<T>(),
                gate: None,
            },
        );
        self
    }

    /// Provide a value that is only resolvable while it reports available.
    pub fn provide_managed<T: Managed>(mut self, value: Arc<T>) -> Self {
        let gated = value.clone();
        let gate: Gate = Arc::new(move || gated.ensure_available());
        self.module.providers.insert(
            TypeId::of::<T>(),
            Provider {
                value,
                type_name: type_name::<T>(),
                gate: Some(gate),
            },
        );
        self
    }

    /// Expose a provided type outside this module.
    pub fn export<T: 'static>(mut self) -> Self {
        self.module.exports.insert(TypeId::of::<T>(), type_name::<T>());
        self
    }

    pub fn build(self) -> Module {
        self.module
    }
}

/// All registered modules, validated.
pub struct Registry {
    modules: HashMap<&'static str, Module>,
}

#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<Module>,
}

impl RegistryBuilder {
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut modules: HashMap<&'static str, Module> = HashMap::new();
        for module in self.modules {
            if modules.contains_key(module.name) {
                return Err(RegistryError::DuplicateModule(module.name.to_string()));
            }
            for (id, capability) in &module.exports {
                if !module.providers.contains_key(id) {
                    return Err(RegistryError::ExportNotProvided {
                        module: module.name.to_string(),
                        capability: capability.to_string(),
                    });
                }
            }
            modules.insert(module.name, module);
        }

        let mut global_exports: HashMap<TypeId, &'static str> = HashMap::new();
        let mut names: Vec<_> = modules.keys().copied().collect();
        names.sort_unstable();
        for name in names {
            let module = &modules[name];
            for import in &module.imports {
                if !modules.contains_key(import) {
                    return Err(RegistryError::UnknownImport {
                        module: name.to_string(),
                        import: import.to_string(),
                    });
                }
            }
            if module.global {
                for (id, capability) in &module.exports {
                    if let Some(first) = global_exports.insert(*id, name) {
                        return Err(RegistryError::ConflictingGlobalExport {
                            capability: capability.to_string(),
                            first: first.to_string(),
                            second: name.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Registry { modules })
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.keys().copied()
    }

    /// Resolve the shared instance of `T` on behalf of module `requester`.
    ///
    /// Lookup order: the requester's own providers, then modules it imports,
    /// then global modules.
    pub fn resolve<T: Send + Sync + 'static>(
        &self,
        requester: &str,
    ) -> Result<Arc<T>, RegistryError> {
        let id = TypeId::of::<T>();
        let module = self
            .modules
            .get(requester)
            .ok_or_else(|| RegistryError::UnknownModule(requester.to_string()))?;

        let provider = module
            .providers
            .get(&id)
            .or_else(|| {
                module
                    .imports
                    .iter()
                    .filter_map(|name| self.modules.get(name))
                    .find(|m| m.is_exported(&id))
                    .and_then(|m| m.providers.get(&id))
            })
            .or_else(|| {
                self.modules
                    .values()
                    .find(|m| m.global && m.is_exported(&id))
                    .and_then(|m| m.providers.get(&id))
            });

        let Some(provider) = provider else {
            return Err(self.missing::<T>(requester));
        };

        if let Some(gate) = &provider.gate {
            gate().map_err(|reason| RegistryError::Unavailable {
                capability: provider.type_name.to_string(),
                reason,
            })?;
        }

        provider
            .value
            .clone()
            .downcast::<T>()
            .map_err(|_| RegistryError::NotProvided {
                capability: type_name::<T>().to_string(),
            })
    }

    fn missing<T: 'static>(&self, requester: &str) -> RegistryError {
        let id = TypeId::of::<T>();
        let capability = type_name::<T>().to_string();
        let mut owners: Vec<_> = self
            .modules
            .values()
            .filter(|m| m.providers.contains_key(&id))
            .map(|m| m.name)
            .collect();
        owners.sort_unstable();

        match owners.first() {
            Some(owner) => RegistryError::NotVisible {
                capability,
                owner: owner.to_string(),
                requester: requester.to_string(),
            },
            None => RegistryError::NotProvided { capability },
        }
    }
}

impl<S: DataStore> Managed for ConnectionManager<S> {
    fn ensure_available(&self) -> Result<(), String> {
        self.handle().map(|_| ()).map_err(|err| err.to_string())
    }
}

/// Global module that provides and exports the connection manager.
pub fn database_module<S: DataStore>(manager: Arc<ConnectionManager<S>>) -> Module {
    Module::builder(DATABASE_MODULE)
        .global()
        .provide_managed(manager)
        .export::<ConnectionManager<S>>()
        .build()
}
