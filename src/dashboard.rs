//! Dashboard layout
//!
//! Widgets are packed left-to-right, top-to-bottom into a grid of fixed
//! width. Each resource contributes a full-width text header followed by one
//! graph per configured metric:
//!
//! ```text
//! y=0  ┌──────────────────────── header (24x1) ────────────────────────┐
//! y=1  ┌ graph 6x4 ┐┌ graph 6x4 ┐┌ graph 6x4 ┐┌ graph 6x4 ┐
//! y=5  ┌ graph 6x4 ┐
//! y=9  ┌──────────────────────── header (24x1) ────────────────────────┐
//! ```
//!
//! The same resource list always produces the same layout.

use serde::{Deserialize, Serialize};

use crate::{MetricType, ResourceConfig};

/// Total width of the dashboard grid
pub const GRID_WIDTH: u32 = 24;

const HEADER_HEIGHT: u32 = 1;
const GRAPH_WIDTH: u32 = 6;
const GRAPH_HEIGHT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Text,
    MetricGraph,
}

/// Widget content, independent of its position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetPayload {
    Text {
        markdown: String,
    },
    MetricGraph {
        title: String,
        namespace: String,
        metric: String,
        url: String,
        unit: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardWidget {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,

    #[serde(flatten)]
    pub payload: WidgetPayload,
}

impl DashboardWidget {
    pub fn kind(&self) -> WidgetKind {
        match self.payload {
            WidgetPayload::Text { .. } => WidgetKind::Text,
            WidgetPayload::MetricGraph { .. } => WidgetKind::MetricGraph,
        }
    }
}

/// Row-packing cursor over a grid of fixed width
#[derive(Debug, Clone)]
struct GridCursor {
    max_width: u32,
    x: u32,
    y: u32,

    /// Height of the tallest widget in the current row
    row_height: u32,
}

impl GridCursor {
    fn new(max_width: u32) -> Self {
        Self {
            max_width,
            x: 0,
            y: 0,
            row_height: 0,
        }
    }

    /// Reserve a `width` x `height` cell and return its top-left corner
    fn place(&mut self, width: u32, height: u32) -> (u32, u32) {
        if self.x + width > self.max_width {
            self.y += self.row_height;
            self.x = 0;
            self.row_height = 0;
        }

        let position = (self.x, self.y);
        self.x += width;
        self.row_height = self.row_height.max(height);
        position
    }
}

#[derive(Debug, Clone)]
pub struct DashboardPacker {
    /// Namespace the graphed metrics are published under
    namespace: String,
    max_width: u32,
}

impl DashboardPacker {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            max_width: GRID_WIDTH,
        }
    }

    /// Lay out a header and one graph per metric for every resource
    pub fn pack(&self, resources: &[ResourceConfig]) -> Vec<DashboardWidget> {
        let mut cursor = GridCursor::new(self.max_width);
        let mut widgets = vec![];

        for resource in resources {
            let payload = WidgetPayload::Text {
                markdown: format!("# {}", resource.display_name()),
            };
            widgets.push(self.widget(&mut cursor, self.max_width, HEADER_HEIGHT, payload));

            for metric in &resource.metrics {
                let payload = self.graph(resource, metric.metric_type);
                let width = GRAPH_WIDTH.min(self.max_width);
                widgets.push(self.widget(&mut cursor, width, GRAPH_HEIGHT, payload));
            }
        }

        widgets
    }

    fn widget(
        &self,
        cursor: &mut GridCursor,
        width: u32,
        height: u32,
        payload: WidgetPayload,
    ) -> DashboardWidget {
        let (x, y) = cursor.place(width, height);
        DashboardWidget {
            x,
            y,
            width,
            height,
            payload,
        }
    }

    fn graph(&self, resource: &ResourceConfig, metric_type: MetricType) -> WidgetPayload {
        WidgetPayload::MetricGraph {
            title: format!("{} - {}", resource.display_name(), metric_type.label()),
            namespace: self.namespace.clone(),
            metric: metric_type.as_str().to_string(),
            url: resource.url.clone(),
            unit: metric_type.unit().to_string(),
        }
    }
}
