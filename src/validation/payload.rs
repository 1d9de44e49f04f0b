//! Payload shape and size validation.
//!
//! Resolves a request body into either an explicit batch of records or a
//! synthesized fallback record, according to the deployment's policy.
//! Every record of an explicit batch must be a JSON object.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::config::PayloadPolicy;
use crate::error::IngressError;
use crate::extraction::fallback::FallbackRecord;
use crate::logging::structured::LogContext;

/// Maximum number of records accepted in one request.
pub const MAX_BATCH_RECORDS: usize = 1000;

/// One datalayer record: a flat JSON object.
pub type Record = Map<String, Value>;

/// A validated request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DatalayerPayload {
    /// Records submitted by the client in `datalayer`.
    Batch(Vec<Record>),
    /// Single record synthesized from `info`, `url`, `timestamp`.
    Fallback(FallbackRecord),
}

impl DatalayerPayload {
    /// Hand the records over for sanitization and relay.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Self::Batch(records) => records,
            Self::Fallback(record) => vec![record.into_record()],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Batch(records) => records.len(),
            Self::Fallback(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Batch(_) => "batch",
            Self::Fallback(_) => "fallback",
        }
    }
}

/// Parse raw body bytes.
///
/// An empty or unparseable body yields `Value::Null`, which carries no
/// `datalayer` and is handled by the policy like any other such body.
pub fn parse_body(body: &[u8], ctx: &LogContext) -> Value {
    if body.is_empty() {
        return Value::Null;
    }

    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("{} BODY_PARSE_FAILED bytes={} error={}", ctx, body.len(), e);
            Value::Null
        }
    }
}

/// Resolve the body into a payload and apply the record-count limit.
///
/// Takes the body by value so the submitted records move into the payload.
pub fn resolve_payload(
    mut body: Value,
    policy: PayloadPolicy,
    now: DateTime<Utc>,
    ctx: &LogContext,
) -> Result<DatalayerPayload, IngressError> {
    let datalayer = match body.as_object_mut().and_then(|obj| obj.remove("datalayer")) {
        Some(Value::Array(records)) => Some(records),
        _ => None,
    };

    let records = match (policy, datalayer) {
        (PayloadPolicy::Strict, Some(records)) => records,
        (PayloadPolicy::Strict, None) => {
            log::warn!("{} PAYLOAD_REJECTED reason=datalayer_missing policy={}", ctx, policy);
            return Err(IngressError::MissingDatalayer);
        }
        (PayloadPolicy::Lenient, Some(records)) if !records.is_empty() => records,
        (PayloadPolicy::Lenient, _) => {
            let record = FallbackRecord::from_body(&body, now);
            log::info!(
                "{} FALLBACK_SYNTHESIZED info={} url={}",
                ctx,
                record.info,
                record.url
            );
            return Ok(DatalayerPayload::Fallback(record));
        }
    };

    let payload = DatalayerPayload::Batch(into_objects(records, ctx)?);
    check_batch_size(&payload, ctx)?;
    Ok(payload)
}

/// Require every batch entry to be an object.
fn into_objects(records: Vec<Value>, ctx: &LogContext) -> Result<Vec<Record>, IngressError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Object(obj) => Ok(obj),
            other => {
                log::warn!(
                    "{} PAYLOAD_REJECTED reason=non_object_record index={} value_type={}",
                    ctx,
                    index,
                    value_type(&other)
                );
                Err(IngressError::MissingDatalayer)
            }
        })
        .collect()
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reject explicit batches above [`MAX_BATCH_RECORDS`].
fn check_batch_size(payload: &DatalayerPayload, ctx: &LogContext) -> Result<(), IngressError> {
    if let DatalayerPayload::Batch(records) = payload {
        if records.len() > MAX_BATCH_RECORDS {
            log::warn!(
                "{} SIZE_LIMIT_EXCEEDED records={} limit={}",
                ctx,
                records.len(),
                MAX_BATCH_RECORDS
            );
            return Err(IngressError::PayloadTooLarge(format!(
                "{} records exceeds limit of {}",
                records.len(),
                MAX_BATCH_RECORDS
            )));
        }
    }
    Ok(())
}
