use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::Deserialize;

// -------------------------
// Query DTOs
// -------------------------

/// Query string of `/api/todo`. Values stay raw strings; each verb decides
/// how to interpret them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TodoQuery {
    pub id: Option<String>,
    pub completed: Option<String>,
}

impl TodoQuery {
    /// Builds the query from decoded pairs. A repeated key keeps its first
    /// value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "id" => &mut query.id,
                "completed" => &mut query.completed,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// `id` if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub text: String,
    pub completed: Option<bool>,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateTodoRequest {
    pub completed: Option<bool>,
}

impl UpdateTodoRequest {
    /// Decodes a PUT body.
    ///
    /// A body that is empty or not sent as JSON carries no fields, so it
    /// updates nothing. A JSON body must still be well formed.
    pub fn from_body(headers: &HeaderMap, body: &Bytes) -> Result<Self, JsonRejection> {
        if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Json::<Self>::from_bytes(body).map(|Json(req)| req)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_counts_as_absent() {
        let q = TodoQuery {
            id: Some(String::new()),
            completed: None,
        };
        assert_eq!(q.id(), None);

        let q = TodoQuery {
            id: Some("4".to_string()),
            completed: None,
        };
        assert_eq!(q.id(), Some("4"));
    }

    #[test]
    fn repeated_query_keys_keep_the_first_value() {
        let pairs = vec![
            ("completed".to_string(), "true".to_string()),
            ("id".to_string(), "1".to_string()),
            ("completed".to_string(), "false".to_string()),
            ("id".to_string(), "2".to_string()),
            ("page".to_string(), "3".to_string()),
        ];
        let q = TodoQuery::from_pairs(pairs);
        assert_eq!(q.completed.as_deref(), Some("true"));
        assert_eq!(q.id(), Some("1"));
    }

    fn json_headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn update_body_without_json_content_type_updates_nothing() {
        let body = Bytes::from_static(br#"{"completed": true}"#);
        let req = UpdateTodoRequest::from_body(&HeaderMap::new(), &body).unwrap();
        assert_eq!(req, UpdateTodoRequest::default());

        let req = UpdateTodoRequest::from_body(&json_headers("text/plain"), &body).unwrap();
        assert_eq!(req.completed, None);
    }

    #[test]
    fn empty_update_body_updates_nothing() {
        let headers = json_headers("application/json");
        let req = UpdateTodoRequest::from_body(&headers, &Bytes::new()).unwrap();
        assert_eq!(req.completed, None);

        let req = UpdateTodoRequest::from_body(&headers, &Bytes::from_static(b"  \n")).unwrap();
        assert_eq!(req.completed, None);
    }

    #[test]
    fn update_body_with_json_content_type_is_decoded() {
        let headers = json_headers("application/json; charset=utf-8");
        let req =
            UpdateTodoRequest::from_body(&headers, &Bytes::from_static(br#"{"completed": false}"#))
                .unwrap();
        assert_eq!(req.completed, Some(false));

        assert!(UpdateTodoRequest::from_body(&headers, &Bytes::from_static(b"{not json")).is_err());
    }

    #[test]
    fn create_request_requires_text() {
        assert!(serde_json::from_str::<CreateTodoRequest>(r#"{"completed": true}"#).is_err());

        let req: CreateTodoRequest = serde_json::from_str(r#"{"text": "buy milk"}"#).unwrap();
        assert_eq!(req.text, "buy milk");
        assert_eq!(req.completed, None);
    }
}
