use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct ClusterEntryView {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct NodeStatusView {
    pub label: String,
    pub ip: String,
    pub image_id: String,
    pub operational: bool,
    pub status: String,
    pub status_class: String,
    pub row_class: String,
}

/// Percentages of the node's total quota, plus the textual summary shown
/// next to the diagram. The four shares sum to 100 for a well-formed node.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryView {
    pub free: f64,
    pub index_system: f64,
    pub arena_free: f64,
    pub tuples: f64,
    #[serde(skip)]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaugeView {
    pub op: String,
    /// CSS hook of the container the chart mounts into, e.g. `rps-select`.
    pub css: String,
    pub rps: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ReplicationView {
    pub status: String,
    pub status_class: String,
    pub row_class: String,
}

/// Backend reachability shown in the page header.
#[derive(Debug, Clone, Default)]
pub struct BackendView {
    pub healthy: bool,
    pub last_checked: String,
}

/// Series description handed to the chart layer as JSON; the page script
/// maps it onto chart calls without recomputing anything.
#[derive(Debug, Serialize)]
pub struct ChartPayload<'a> {
    pub memory: &'a MemoryView,
    pub gauges: &'a [GaugeView],
    pub rps_max: u32,
}
