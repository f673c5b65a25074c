//! OpenLine wire documents
//!
//! The frame posted to the collector and the companion receipt written
//! locally. The guard treats both as opaque payloads; the shapes here
//! only mirror what the collector expects.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Default decision threshold carried on receipts
pub const DEFAULT_RECEIPT_THRESHOLD: f64 = 0.03;

/// Default model identifier carried on receipts
pub const DEFAULT_RECEIPT_MODEL: &str = "coherence/reflex-loop";

/// Frame document POSTed to the collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Stream identifier
    pub stream_id: String,

    /// Logical timestamp (unix seconds)
    pub t_logical: i64,

    /// Gauge family
    pub gauge: String,

    /// Unit annotations
    pub units: String,

    /// Labeled claim nodes
    pub nodes: Vec<FrameNode>,

    /// Edges between nodes
    pub edges: Vec<FrameEdge>,

    /// Morphism annotations
    pub morphs: Vec<Value>,

    /// Telemetry block
    pub telem: Telemetry,
}

impl Frame {
    /// Build a single-claim reflex frame with the collector's defaults
    pub fn for_claim(claim: impl Into<String>, delta_scale: f64, attrs: Option<Value>) -> Self {
        let attrs = attrs.unwrap_or_else(|| {
            json!({"asset_class": "equity", "cadence_pair": "min↔hour"})
        });

        Self {
            stream_id: "reflex".to_string(),
            t_logical: chrono::Utc::now().timestamp(),
            gauge: "sym".to_string(),
            units: "confidence:0..1,cost:tokens".to_string(),
            nodes: vec![FrameNode {
                id: "C1".to_string(),
                node_type: "Claim".to_string(),
                label: claim.into(),
                weight: 0.62,
                attrs,
            }],
            edges: Vec::new(),
            morphs: Vec::new(),
            telem: Telemetry { delta_scale },
        }
    }
}

/// Labeled node inside a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameNode {
    /// Node identifier
    pub id: String,

    /// Node kind
    #[serde(rename = "type")]
    pub node_type: String,

    /// Human-readable label
    pub label: String,

    /// Confidence weight
    pub weight: f64,

    /// Free-form attributes
    pub attrs: Value,
}

/// Edge between two frame nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameEdge {
    /// Source node id
    pub from: String,

    /// Target node id
    pub to: String,

    /// Edge label
    pub label: String,
}

/// Drift telemetry shared between frames and receipts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Telemetry {
    /// Observed scale drift
    pub delta_scale: f64,
}

/// Receipt document written alongside a posted frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// The claim being reported on
    pub claim: String,

    /// Supporting evidence lines
    pub because: Vec<String>,

    /// Contradicting evidence lines
    pub but: Vec<String>,

    /// Conclusion
    pub so: String,

    /// Telemetry block
    pub telem: Telemetry,

    /// Decision threshold the conclusion was measured against
    pub threshold: f64,

    /// Model identifier
    pub model: String,

    /// Free-form attributes
    pub attrs: HashMap<String, Value>,
}

impl Receipt {
    /// Build a receipt with the collector's default threshold and model
    pub fn new(
        claim: impl Into<String>,
        because: Vec<String>,
        but: Vec<String>,
        so: impl Into<String>,
        delta_scale: f64,
    ) -> Self {
        let mut attrs = HashMap::new();
        attrs.insert("cadence".to_string(), Value::String("day".to_string()));

        Self {
            claim: claim.into(),
            because,
            but,
            so: so.into(),
            telem: Telemetry { delta_scale },
            threshold: DEFAULT_RECEIPT_THRESHOLD,
            model: DEFAULT_RECEIPT_MODEL.to_string(),
            attrs,
        }
    }

    /// Override the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}
