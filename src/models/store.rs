use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

// The backend answers with positional tuples, not objects. Arity and field
// order are fixed wire contracts; everything here maps indices onto named
// fields and refuses short or malformed tuples instead of producing
// half-filled records.

/// Cluster tuple schema: `[id, user, name, pair, state]`.
pub const CLUSTER_ARITY: usize = 5;
/// Node tuple schema: `[image_id, ip, server, size, used, arena_size,
/// arena_used, replication, alive, stats]`.
pub const NODE_ARITY: usize = 10;

/// Operation names the backend reports rps figures for, in display order.
pub const OPERATIONS: [&str; 8] = [
    "SELECT", "UPDATE", "INSERT", "CALL", "EVAL", "REPLACE", "DELETE", "ERROR",
];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{kind} tuple has {got} elements, expected {want}")]
    Arity {
        kind: &'static str,
        want: usize,
        got: usize,
    },
    #[error("unexpected type at field {field:?}: {value}")]
    FieldType { field: &'static str, value: Value },
}

#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub id: String,
    pub user: String,
    pub name: String,
    pub pair: Pair,
    /// Opaque status code; carried through untouched.
    pub state: Value,
}

/// A primary/replica pair of storage nodes monitored together.
#[derive(Debug, Clone, Serialize)]
pub struct Pair {
    pub first: NodeRecord,
    pub second: NodeRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeRecord {
    pub image_id: String,
    pub ip: String,
    pub server: String,
    pub size: u64,
    pub used: u64,
    pub arena_size: u64,
    pub arena_used: u64,
    pub replication: String,
    pub alive: i64,
    pub stats: HashMap<String, OpStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpStat {
    #[serde(default)]
    pub rps: f64,
}

pub fn decode_cluster(tuple: &[Value]) -> Result<Cluster, DecodeError> {
    if tuple.len() < CLUSTER_ARITY {
        return Err(DecodeError::Arity {
            kind: "cluster",
            want: CLUSTER_ARITY,
            got: tuple.len(),
        });
    }

    Ok(Cluster {
        id: as_text("id", &tuple[0])?,
        user: as_text("user", &tuple[1])?,
        name: as_text("name", &tuple[2])?,
        pair: decode_pair(as_array("pair", &tuple[3])?)?,
        state: tuple[4].clone(),
    })
}

pub fn decode_pair(tuple: &[Value]) -> Result<Pair, DecodeError> {
    if tuple.len() < 2 {
        return Err(DecodeError::Arity {
            kind: "pair",
            want: 2,
            got: tuple.len(),
        });
    }

    Ok(Pair {
        first: decode_node_record(as_array("first", &tuple[0])?)?,
        second: decode_node_record(as_array("second", &tuple[1])?)?,
    })
}

pub fn decode_node_record(tuple: &[Value]) -> Result<NodeRecord, DecodeError> {
    if tuple.len() < NODE_ARITY {
        return Err(DecodeError::Arity {
            kind: "node",
            want: NODE_ARITY,
            got: tuple.len(),
        });
    }

    Ok(NodeRecord {
        image_id: as_text("image_id", &tuple[0])?,
        ip: as_text("ip", &tuple[1])?,
        server: as_text("server", &tuple[2])?,
        size: as_bytes("size", &tuple[3])?,
        used: as_bytes("used", &tuple[4])?,
        arena_size: as_bytes("arena_size", &tuple[5])?,
        arena_used: as_bytes("arena_used", &tuple[6])?,
        replication: as_text("replication", &tuple[7])?,
        alive: tuple[8].as_i64().ok_or_else(|| DecodeError::FieldType {
            field: "alive",
            value: tuple[8].clone(),
        })?,
        stats: decode_stats(&tuple[9])?,
    })
}

fn decode_stats(v: &Value) -> Result<HashMap<String, OpStat>, DecodeError> {
    serde_json::from_value(v.clone()).map_err(|_| DecodeError::FieldType {
        field: "stats",
        value: v.clone(),
    })
}

// Ids come back as strings or integers depending on how the record was
// written; the console only threads them into URLs and RPC params, so
// normalize to text.
fn as_text(field: &'static str, v: &Value) -> Result<String, DecodeError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(DecodeError::FieldType {
            field,
            value: v.clone(),
        }),
    }
}

fn as_bytes(field: &'static str, v: &Value) -> Result<u64, DecodeError> {
    v.as_u64().ok_or_else(|| DecodeError::FieldType {
        field,
        value: v.clone(),
    })
}

fn as_array<'a>(field: &'static str, v: &'a Value) -> Result<&'a [Value], DecodeError> {
    v.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| DecodeError::FieldType {
            field,
            value: v.clone(),
        })
}

/// JS-style truthiness, used to read the backend's "limit exceeded" flag
/// from `result[0][0]` on create. The shape is an undocumented contract
/// with the backend; keep every interpretation of it here.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub fn node_tuple(ip: &str, alive: i64) -> Value {
        json!([
            "c0ffee",
            ip,
            "srv-1",
            104857600,
            52428800,
            41943040,
            10485760,
            "follow",
            alive,
            { "SELECT": { "rps": 120.0 }, "ERROR": { "rps": 0.5 } }
        ])
    }

    fn cluster_tuple() -> Value {
        json!([
            17,
            "user-1",
            "mycluster",
            [node_tuple("10.0.0.1", 1), node_tuple("10.0.0.2", 0)],
            "active"
        ])
    }

    #[test]
    fn node_fields_map_positionally() {
        let raw = node_tuple("10.0.0.1", 1);
        let tuple = raw.as_array().unwrap();
        let node = decode_node_record(tuple).unwrap();

        assert_eq!(node.image_id, tuple[0].as_str().unwrap());
        assert_eq!(node.ip, tuple[1].as_str().unwrap());
        assert_eq!(node.server, tuple[2].as_str().unwrap());
        assert_eq!(node.size, tuple[3].as_u64().unwrap());
        assert_eq!(node.used, tuple[4].as_u64().unwrap());
        assert_eq!(node.arena_size, tuple[5].as_u64().unwrap());
        assert_eq!(node.arena_used, tuple[6].as_u64().unwrap());
        assert_eq!(node.replication, tuple[7].as_str().unwrap());
        assert_eq!(node.alive, tuple[8].as_i64().unwrap());
        assert_eq!(node.stats["SELECT"].rps, 120.0);
    }

    #[test]
    fn cluster_decodes_pair_at_index_three() {
        let raw = cluster_tuple();
        let cluster = decode_cluster(raw.as_array().unwrap()).unwrap();

        assert_eq!(cluster.id, "17");
        assert_eq!(cluster.user, "user-1");
        assert_eq!(cluster.name, "mycluster");
        assert_eq!(cluster.state, json!("active"));

        let first = decode_node_record(raw[3][0].as_array().unwrap()).unwrap();
        assert_eq!(cluster.pair.first.ip, first.ip);
        assert_eq!(cluster.pair.first.image_id, first.image_id);
        assert_eq!(cluster.pair.second.ip, "10.0.0.2");
        assert_eq!(cluster.pair.second.alive, 0);
    }

    #[test]
    fn short_tuples_fail_loudly() {
        let short = json!(["c0ffee", "10.0.0.1", "srv-1"]);
        let err = decode_node_record(short.as_array().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Arity { kind: "node", want: NODE_ARITY, got: 3 }
        ));

        let err = decode_cluster(&[]).unwrap_err();
        assert!(matches!(err, DecodeError::Arity { kind: "cluster", .. }));

        let one_node = json!([node_tuple("10.0.0.1", 1)]);
        let err = decode_pair(one_node.as_array().unwrap()).unwrap_err();
        assert!(matches!(err, DecodeError::Arity { kind: "pair", got: 1, .. }));
    }

    #[test]
    fn numeric_ids_normalize_to_text() {
        let raw = json!([42, "10.0.0.1", 7, 100, 0, 0, 0, "follow", 1, {}]);
        let node = decode_node_record(raw.as_array().unwrap()).unwrap();
        assert_eq!(node.image_id, "42");
        assert_eq!(node.server, "7");
    }

    #[test]
    fn wrong_field_type_is_a_decode_error() {
        let raw = json!(["c0ffee", "10.0.0.1", "srv-1", "big", 0, 0, 0, "follow", 1, {}]);
        let err = decode_node_record(raw.as_array().unwrap()).unwrap_err();
        assert!(matches!(err, DecodeError::FieldType { field: "size", .. }));
    }

    #[test]
    fn truthiness_matches_the_page_script() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("limit")));
        assert!(is_truthy(&json!([])));
    }
}
