use crate::snapshot::PlacementSnapshot;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct StatusResponse {
    /// RFC 3339 time of the last successful refresh, `null` before the first.
    pub last_refresh: Option<String>,
    pub jobs: PlacementSnapshot,
}
