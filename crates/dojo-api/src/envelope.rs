//! The success envelope shared by every JSON response.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use dojo_core::store::Page;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub page:        u32,
  pub limit:       u32,
  pub total:       u64,
  pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success:    bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:       Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pagination: Option<Pagination>,
}

impl<T: Serialize> Envelope<T> {
  pub fn data(data: T) -> Self {
    Self { success: true, data: Some(data), message: None, pagination: None }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn respond(self, status: StatusCode) -> Response {
    (status, Json(self)).into_response()
  }
}

impl Envelope<()> {
  /// A success response with only a message.
  pub fn message(message: impl Into<String>) -> Self {
    Self {
      success:    true,
      data:       None,
      message:    Some(message.into()),
      pagination: None,
    }
  }
}

pub fn ok<T: Serialize>(data: T) -> Response {
  Envelope::data(data).respond(StatusCode::OK)
}

pub fn created<T: Serialize>(data: T) -> Response {
  Envelope::data(data).respond(StatusCode::CREATED)
}

pub fn paged<T: Serialize>(page: Page<T>) -> Response {
  let pagination = Pagination {
    page:        page.page,
    limit:       page.limit,
    total:       page.total,
    total_pages: page.total_pages(),
  };
  Envelope {
    success:    true,
    data:       Some(page.items),
    message:    None,
    pagination: Some(pagination),
  }
  .respond(StatusCode::OK)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn pagination_uses_camel_case() {
    let env = Envelope {
      success:    true,
      data:       Some(vec![1, 2]),
      message:    None,
      pagination: Some(Pagination { page: 1, limit: 2, total: 5, total_pages: 3 }),
    };
    assert_eq!(
      serde_json::to_value(&env).unwrap(),
      json!({
        "success": true,
        "data": [1, 2],
        "pagination": { "page": 1, "limit": 2, "total": 5, "totalPages": 3 }
      })
    );
  }

  #[test]
  fn message_only_omits_data() {
    let value = serde_json::to_value(Envelope::message("done")).unwrap();
    assert_eq!(value, json!({ "success": true, "message": "done" }));
  }
}
