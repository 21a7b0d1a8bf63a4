use crate::model::{
    generate_id, Case, Collection, CollectionUpdate, Id, Interface, InterfaceBaseInfo, NewCase,
    NewCollection, UserContext,
};
use crate::store::traits::{
    AuthAction, AuthStore, CaseStore, CollectionStore, InterfaceStore, Store,
};
use anyhow::Result;
use chrono::Utc;
use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory store backing the dev server and the test suite. Writes are
/// serialized per table by the RwLock; the core never relies on anything
/// stronger.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Id, Collection>>,
    cases: RwLock<HashMap<Id, Case>>,
    interfaces: RwLock<HashMap<Id, Interface>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CollectionStore for MemoryStore {
    async fn get_collection(&self, id: &Id) -> Result<Option<Collection>> {
        Ok(self.collections.read().get(id).cloned())
    }

    async fn list_collections(&self, project_id: &Id) -> Result<Vec<Collection>> {
        Ok(self
            .collections
            .read()
            .values()
            .filter(|c| &c.project_id == project_id)
            .cloned()
            .sorted_by(|a, b| a.created_at.cmp(&b.created_at))
            .collect())
    }

    async fn save_collection(&self, new: NewCollection, user: &UserContext) -> Result<Collection> {
        let now = Utc::now();
        let collection = Collection {
            id: generate_id(),
            project_id: new.project_id,
            name: new.name,
            desc: new.desc,
            created_by: user.user_id.clone(),
            created_at: now,
            updated_by: user.user_id.clone(),
            updated_at: now,
        };
        self.collections
            .write()
            .insert(collection.id.clone(), collection.clone());
        Ok(collection)
    }

    async fn update_collection(
        &self,
        id: &Id,
        update: CollectionUpdate,
        user: &UserContext,
    ) -> Result<Option<Collection>> {
        let mut collections = self.collections.write();
        let Some(collection) = collections.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            collection.name = name;
        }
        if let Some(desc) = update.desc {
            collection.desc = Some(desc);
        }
        collection.updated_by = user.user_id.clone();
        collection.updated_at = Utc::now();
        Ok(Some(collection.clone()))
    }

    async fn delete_collection(&self, id: &Id) -> Result<bool> {
        Ok(self.collections.write().remove(id).is_some())
    }
}

#[async_trait::async_trait]
impl CaseStore for MemoryStore {
    async fn get_case(&self, id: &Id) -> Result<Option<Case>> {
        Ok(self.cases.read().get(id).cloned())
    }

    async fn list_cases(&self, col_id: &Id) -> Result<Vec<Case>> {
        Ok(self
            .cases
            .read()
            .values()
            .filter(|c| &c.col_id == col_id)
            .cloned()
            .sorted_by(|a, b| {
                a.index
                    .cmp(&b.index)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            })
            .collect())
    }

    async fn save_case(&self, new: NewCase, user: &UserContext) -> Result<Case> {
        let now = Utc::now();
        let case = Case {
            id: generate_id(),
            interface_id: new.interface_id,
            col_id: new.col_id,
            project_id: new.project_id,
            name: new.name,
            case_env: new.case_env,
            index: new.index,
            req_query: new.req_query,
            req_headers: new.req_headers,
            req_params: new.req_params,
            req_body_form: new.req_body_form,
            req_body_type: new.req_body_type,
            req_body_other: new.req_body_other,
            created_by: user.user_id.clone(),
            created_at: now,
            updated_by: user.user_id.clone(),
            updated_at: now,
        };
        self.cases.write().insert(case.id.clone(), case.clone());
        Ok(case)
    }

    async fn update_case(&self, mut case: Case, user: &UserContext) -> Result<Case> {
        case.updated_by = user.user_id.clone();
        case.updated_at = Utc::now();
        self.cases.write().insert(case.id.clone(), case.clone());
        Ok(case)
    }

    async fn set_case_index(&self, id: &Id, index: i64) -> Result<bool> {
        let mut cases = self.cases.write();
        let Some(case) = cases.get_mut(id) else {
            return Ok(false);
        };
        case.index = index;
        case.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_case(&self, id: &Id) -> Result<bool> {
        Ok(self.cases.write().remove(id).is_some())
    }

    async fn delete_cases_in_collection(&self, col_id: &Id) -> Result<usize> {
        let mut cases = self.cases.write();
        let ids: Vec<Id> = cases
            .values()
            .filter(|c| &c.col_id == col_id)
            .map(|c| c.id.clone())
            .collect();
        for id in &ids {
            cases.remove(id);
        }
        Ok(ids.len())
    }

    async fn find_case_by_interface_and_index(
        &self,
        col_id: &Id,
        interface_id: &Id,
        index: i64,
    ) -> Result<Option<Case>> {
        // Deterministic pick when several cases share an index: earliest
        // created wins.
        Ok(self
            .cases
            .read()
            .values()
            .filter(|c| {
                &c.col_id == col_id && &c.interface_id == interface_id && c.index == index
            })
            .cloned()
            .sorted_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .next())
    }
}

#[async_trait::async_trait]
impl InterfaceStore for MemoryStore {
    async fn get_interface(&self, id: &Id) -> Result<Option<Interface>> {
        Ok(self.interfaces.read().get(id).cloned())
    }

    async fn get_interface_base_info(&self, id: &Id) -> Result<Option<InterfaceBaseInfo>> {
        Ok(self.interfaces.read().get(id).map(Interface::base_info))
    }

    async fn upsert_interface(&self, interface: Interface) -> Result<()> {
        self.interfaces
            .write()
            .insert(interface.id.clone(), interface);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthStore for MemoryStore {
    async fn check_auth(
        &self,
        _user: &UserContext,
        _project_id: &Id,
        _action: AuthAction,
    ) -> Result<bool> {
        // The development store grants everything; a real deployment wires a
        // project-membership backed implementation here.
        Ok(true)
    }
}

impl Store for MemoryStore {}
