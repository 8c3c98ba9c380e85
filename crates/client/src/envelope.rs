//! The backend's `{success, data, message}` response envelope.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ApiError;

/// Uniform backend response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Envelope of a mutation whose payload the pages ignore.
pub type Ack = Envelope<Value>;

impl<T> Envelope<T> {
    /// The payload of a successful envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the server message when `success`
    /// is false or the payload is missing.
    pub fn into_data(self) -> Result<T, ApiError> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(ApiError::Rejected(self.message.unwrap_or_default())),
        }
    }

    /// Fail on `success: false`, keeping the envelope otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the server message.
    pub fn ensure_success(self) -> Result<Self, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Rejected(self.message.unwrap_or_default()))
        }
    }

    /// Server message, else `fallback`.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_owned()
    }

    pub(crate) fn map<U>(
        self,
        f: impl FnOnce(T) -> Result<U, serde_json::Error>,
    ) -> Result<Envelope<U>, ApiError> {
        let data = self.data.map(f).transpose()?;
        Ok(Envelope {
            success: self.success,
            data,
            message: self.message,
        })
    }
}

impl Envelope<Value> {
    /// Read a raw response body. Anything but an object (a bare array, say)
    /// counts as a successful envelope carrying that value as data.
    pub(crate) fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Ok(Self {
                success: true,
                data: Some(other),
                message: None,
            }),
        }
    }

    pub(crate) fn decode<T: DeserializeOwned>(self) -> Result<Envelope<T>, ApiError> {
        self.map(serde_json::from_value)
    }
}

/// Server pagination info.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl Pagination {
    /// Page count: `totalPages`, else ceil(total / per page), else 1.
    #[must_use]
    pub fn page_count(&self, per_page: u32) -> u32 {
        luxe_core::catalog::total_pages(self.total_pages, self.total, per_page)
    }
}

/// A list payload plus whatever pagination info the server sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Extract a list from `data`, accepting `data.<key>` (or any of
    /// `aliases`), or `data` itself when it is an array.
    ///
    /// Pagination comes from `data.pagination`, with `data.total` and
    /// `data.totalPages` as fallbacks.
    pub(crate) fn from_data(
        data: Value,
        key: &str,
        aliases: &[&str],
    ) -> Result<Self, serde_json::Error> {
        match data {
            Value::Array(_) => Ok(Self {
                items: serde_json::from_value(data)?,
                pagination: Pagination::default(),
            }),
            Value::Object(mut map) => {
                let list = std::iter::once(key)
                    .chain(aliases.iter().copied())
                    .find_map(|k| map.remove(k).filter(|v| !v.is_null()));
                let items = match list {
                    Some(list) => serde_json::from_value(list)?,
                    None => Vec::new(),
                };

                let mut pagination = match map.remove("pagination") {
                    Some(p) if p.is_object() => serde_json::from_value(p)?,
                    _ => Pagination::default(),
                };
                if pagination.total.is_none() {
                    pagination.total = map.get("total").and_then(Value::as_u64);
                }
                if pagination.total_pages.is_none() {
                    pagination.total_pages = map
                        .get("totalPages")
                        .and_then(Value::as_u64)
                        .and_then(|p| u32::try_from(p).ok());
                }

                Ok(Self { items, pagination })
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: u32,
    }

    #[test]
    fn test_bare_array_is_successful_envelope() {
        let envelope = Envelope::<Value>::from_value(json!([{"id": 1}])).unwrap();
        assert!(envelope.success);
        let page = Page::<Row>::from_data(envelope.data.unwrap(), "rows", &[]).unwrap();
        assert_eq!(page.items, vec![Row { id: 1 }]);
    }

    #[test]
    fn test_page_from_keyed_object_with_pagination() {
        let page = Page::<Row>::from_data(
            json!({"rows": [{"id": 1}, {"id": 2}], "pagination": {"total": 42, "totalPages": 5}}),
            "rows",
            &[],
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, Some(42));
        assert_eq!(page.pagination.page_count(10), 5);
    }

    #[test]
    fn test_page_alias_and_total_fallback() {
        let page = Page::<Row>::from_data(
            json!({"bannedUsers": [{"id": 7}], "total": 21}),
            "bans",
            &["bannedUsers"],
        )
        .unwrap();
        assert_eq!(page.items, vec![Row { id: 7 }]);
        assert_eq!(page.pagination.page_count(10), 3);
    }

    #[test]
    fn test_into_data_rejects_unsuccessful() {
        let envelope: Envelope<Value> =
            serde_json::from_value(json!({"success": false, "message": "نامعتبر"})).unwrap();
        let err = envelope.into_data().unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "نامعتبر"));
    }
}
