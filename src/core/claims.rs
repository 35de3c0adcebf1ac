//! Claims-encoded group identifier decoding
//!
//! Security-group identifiers read from role assignments come wrapped in
//! SharePoint claims encoding. The directory only accepts bare object ids,
//! so the wrapper is stripped before any lookup. An `_o` marker appended to
//! the object id means the grant targets the group's owners rather than its
//! full membership.

const TENANT_MARKER: &str = "c:0t.c|tenant|";
const FEDERATED_MARKER: &str = "c:0o.c|federateddirectoryclaimprovider|";
const OWNERS_MARKER: &str = "_o";

/// Which slice of a directory group a grant reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipScope {
    /// Owners plus members, the default
    OwnersAndMembers,
    /// Owners only, selected by the `_o` identifier marker
    OwnersOnly,
}

/// A claims identifier reduced to the bare directory object id plus the
/// membership scope it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedGroupId {
    pub id: String,
    pub scope: MembershipScope,
}

/// Strip claims encoding from a raw group identifier.
///
/// Identifiers without any known marker are treated as already bare; a
/// malformed wrapper is not an error.
pub fn decode_group_identifier(raw: &str) -> DecodedGroupId {
    let mut id = raw.to_string();

    if let Some(pos) = id.find(TENANT_MARKER) {
        id = id[pos + TENANT_MARKER.len()..].to_string();
    }
    if let Some(pos) = id.find(FEDERATED_MARKER) {
        id = id[pos + FEDERATED_MARKER.len()..].to_string();
    }

    let mut scope = MembershipScope::OwnersAndMembers;
    if let Some(pos) = id.find(OWNERS_MARKER) {
        id.truncate(pos);
        scope = MembershipScope::OwnersOnly;
    }

    DecodedGroupId { id, scope }
}
