use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProbeBody {
    pub status: &'static str,
}

pub type ProbeResponse = (StatusCode, Json<ProbeBody>);

/// `GET /healthz`: the process is up.
pub async fn healthz() -> ProbeResponse {
    probe(true)
}

/// Readiness answer for a dependency check; services own the check itself.
pub fn probe(ready: bool) -> ProbeResponse {
    if ready {
        (StatusCode::OK, Json(ProbeBody { status: "ok" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeBody {
                status: "unavailable",
            }),
        )
    }
}
