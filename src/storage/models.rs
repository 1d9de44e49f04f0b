//! Wire models for the data store REST interface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource the datalayer is written to (`/rest/v1/<resource>`).
pub const DATALAYER_RESOURCE: &str = "datalayer";

/// Body posted to the store: the sanitized batch under `datalayer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayPayload {
    pub datalayer: Vec<Map<String, Value>>,
}

impl RelayPayload {
    pub fn new(datalayer: Vec<Map<String, Value>>) -> Self {
        Self { datalayer }
    }

    pub fn record_count(&self) -> usize {
        self.datalayer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let record = json!({"event": "click"}).as_object().cloned().unwrap();
        let payload = RelayPayload::new(vec![record]);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"datalayer": [{"event": "click"}]})
        );
        assert_eq!(payload.record_count(), 1);
    }
}
