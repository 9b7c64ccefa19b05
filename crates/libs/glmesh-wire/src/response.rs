//! Which reply completes which request.
//!
//! The protocol carries no transaction id, so a reply is matched to the
//! outstanding request by message type alone. The association is an explicit
//! table built once at startup and handed to whoever correlates replies.

use std::collections::HashMap;

use crate::config::{ConfigRequest, ConfigStatus};
use crate::message::{MessageKind, VendorStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Vendor(MessageKind),
    CompositionDataGet,
    DefaultTtlGet,
    AppKeyAdd,
    ModelAppBind,
    ModelPublicationSet,
    ModelSubscriptionAdd,
    SceneStore,
    SceneDelete,
    SceneRegisterGet,
}

impl From<&ConfigRequest> for RequestKind {
    fn from(request: &ConfigRequest) -> Self {
        match request {
            ConfigRequest::CompositionDataGet { .. } => Self::CompositionDataGet,
            ConfigRequest::DefaultTtlGet => Self::DefaultTtlGet,
            ConfigRequest::AppKeyAdd { .. } => Self::AppKeyAdd,
            ConfigRequest::ModelAppBind { .. } => Self::ModelAppBind,
            ConfigRequest::ModelPublicationSet { .. } => Self::ModelPublicationSet,
            ConfigRequest::ModelSubscriptionAdd { .. } => Self::ModelSubscriptionAdd,
            ConfigRequest::SceneStore { .. } => Self::SceneStore,
            ConfigRequest::SceneDelete { .. } => Self::SceneDelete,
            ConfigRequest::SceneRegisterGet => Self::SceneRegisterGet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Vendor(MessageKind),
    CompositionData,
    DefaultTtl,
    AppKey,
    ModelAppBind,
    ModelPublication,
    ModelSubscription,
    SceneRegister,
}

impl From<&ConfigStatus> for ResponseKind {
    fn from(status: &ConfigStatus) -> Self {
        match status {
            ConfigStatus::CompositionData { .. } => Self::CompositionData,
            ConfigStatus::DefaultTtl { .. } => Self::DefaultTtl,
            ConfigStatus::AppKey { .. } => Self::AppKey,
            ConfigStatus::ModelAppBind { .. } => Self::ModelAppBind,
            ConfigStatus::ModelPublication { .. } => Self::ModelPublication,
            ConfigStatus::ModelSubscription { .. } => Self::ModelSubscription,
            ConfigStatus::SceneRegister { .. } => Self::SceneRegister,
        }
    }
}

impl From<&VendorStatus> for ResponseKind {
    fn from(status: &VendorStatus) -> Self {
        Self::Vendor(status.kind())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    entries: HashMap<RequestKind, ResponseKind>,
}

impl ResponseTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every vendor kind answers with its own status; configuration and
    /// scene requests answer with their Foundation/Scene status.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for kind in MessageKind::ALL {
            table.insert(RequestKind::Vendor(kind), ResponseKind::Vendor(kind));
        }
        table.insert(RequestKind::CompositionDataGet, ResponseKind::CompositionData);
        table.insert(RequestKind::DefaultTtlGet, ResponseKind::DefaultTtl);
        table.insert(RequestKind::AppKeyAdd, ResponseKind::AppKey);
        table.insert(RequestKind::ModelAppBind, ResponseKind::ModelAppBind);
        table.insert(RequestKind::ModelPublicationSet, ResponseKind::ModelPublication);
        table.insert(RequestKind::ModelSubscriptionAdd, ResponseKind::ModelSubscription);
        table.insert(RequestKind::SceneStore, ResponseKind::SceneRegister);
        table.insert(RequestKind::SceneDelete, ResponseKind::SceneRegister);
        table.insert(RequestKind::SceneRegisterGet, ResponseKind::SceneRegister);
        table
    }

    pub fn insert(&mut self, request: RequestKind, response: ResponseKind) -> Option<ResponseKind> {
        self.entries.insert(request, response)
    }

    /// Make `request` fire-and-forget.
    pub fn remove(&mut self, request: RequestKind) -> Option<ResponseKind> {
        self.entries.remove(&request)
    }

    /// The reply kind that completes `request`; `None` when no reply is
    /// expected.
    pub fn expected(&self, request: RequestKind) -> Option<ResponseKind> {
        self.entries.get(&request).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_requests_share_register_status() {
        let table = ResponseTable::standard();
        for request in
            [RequestKind::SceneStore, RequestKind::SceneDelete, RequestKind::SceneRegisterGet]
        {
            assert_eq!(table.expected(request), Some(ResponseKind::SceneRegister));
        }
    }

    #[test]
    fn vendor_requests_answer_in_kind() {
        let table = ResponseTable::standard();
        assert_eq!(
            table.expected(RequestKind::Vendor(MessageKind::Levels)),
            Some(ResponseKind::Vendor(MessageKind::Levels))
        );
    }

    #[test]
    fn removed_entry_is_fire_and_forget() {
        let mut table = ResponseTable::standard();
        table.remove(RequestKind::DefaultTtlGet);
        assert_eq!(table.expected(RequestKind::DefaultTtlGet), None);
        assert_eq!(ResponseTable::empty().expected(RequestKind::AppKeyAdd), None);
    }
}
