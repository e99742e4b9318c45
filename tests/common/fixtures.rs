//! Static message payloads used across harnesses.
//!
//! Each fixture is the raw `message` field as the backend forwards it from
//! the cloud provider.

use serde_json::{json, Value};

/// A complete cloud audit entry.
pub fn audit_payload() -> Value {
    json!({
        "@type": "type.googleapis.com/google.cloud.audit.AuditLog",
        "serviceName": "iam.googleapis.com",
        "methodName": "SetPolicy",
        "resourceName": "projects/x",
        "authenticationInfo": { "principalEmail": "a@b.com" },
        "status": {}
    })
}

/// Audit entry with only the service name.
pub fn sparse_audit_payload() -> Value {
    json!({ "serviceName": "svc" })
}

/// Structured payload carrying its text in `message`.
pub fn wrapped_text_payload() -> Value {
    json!({ "message": "worker 3 restarted\ncause: OOMKilled", "pid": 4411 })
}

/// Structured payload with nothing recognisable.
pub fn opaque_payload() -> Value {
    json!({ "a": 1 })
}

/// Plain-text messages in various shapes.
pub const TEXT_MESSAGES: &[&str] = &[
    "GET /healthz 200 OK (1ms)",
    "Connection refused: db.internal:5432",
    "panic: runtime error: index out of range [3] with length 3\n\ngoroutine 1 [running]:",
    "\n\n   Traceback (most recent call last):\n  File \"app.py\", line 12",
    "",
];
