use crate::model::{
    Case, Collection, CollectionUpdate, Id, Interface, InterfaceBaseInfo, NewCase, NewCollection,
    UserContext,
};
use anyhow::Result;

#[async_trait::async_trait]
pub trait CollectionStore: Send + Sync {
    async fn get_collection(&self, id: &Id) -> Result<Option<Collection>>;
    async fn list_collections(&self, project_id: &Id) -> Result<Vec<Collection>>;
    async fn save_collection(&self, new: NewCollection, user: &UserContext) -> Result<Collection>;
    async fn update_collection(
        &self,
        id: &Id,
        update: CollectionUpdate,
        user: &UserContext,
    ) -> Result<Option<Collection>>;
    async fn delete_collection(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait CaseStore: Send + Sync {
    async fn get_case(&self, id: &Id) -> Result<Option<Case>>;
    /// Cases of one collection in index order.
    async fn list_cases(&self, col_id: &Id) -> Result<Vec<Case>>;
    async fn save_case(&self, new: NewCase, user: &UserContext) -> Result<Case>;
    /// Full-record replace keyed by `case.id`.
    async fn update_case(&self, case: Case, user: &UserContext) -> Result<Case>;
    async fn set_case_index(&self, id: &Id, index: i64) -> Result<bool>;
    async fn delete_case(&self, id: &Id) -> Result<bool>;
    async fn delete_cases_in_collection(&self, col_id: &Id) -> Result<usize>;
    /// Sibling lookup for reference rewriting: the case in `col_id` that
    /// instantiates `interface_id` at `index`.
    async fn find_case_by_interface_and_index(
        &self,
        col_id: &Id,
        interface_id: &Id,
        index: i64,
    ) -> Result<Option<Case>>;
}

#[async_trait::async_trait]
pub trait InterfaceStore: Send + Sync {
    async fn get_interface(&self, id: &Id) -> Result<Option<Interface>>;
    async fn get_interface_base_info(&self, id: &Id) -> Result<Option<InterfaceBaseInfo>>;
    async fn upsert_interface(&self, interface: Interface) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    View,
    Edit,
    Danger,
}

#[async_trait::async_trait]
pub trait AuthStore: Send + Sync {
    /// Consulted by the handlers before any request reaches the core logic.
    async fn check_auth(&self, user: &UserContext, project_id: &Id, action: AuthAction)
        -> Result<bool>;
}

pub trait Store: CollectionStore + CaseStore + InterfaceStore + AuthStore + Send + Sync {}
