use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A validated `(limit, offset)` window over a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Build a window from raw query-string values.
    ///
    /// Unparsable or non-positive limits fall back to the default, limits above
    /// the maximum are clamped, and unparsable or negative offsets become 0.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = match limit.and_then(|s| s.trim().parse::<i64>().ok()) {
            Some(n) if n <= 0 => DEFAULT_PAGE_LIMIT,
            Some(n) if n > MAX_PAGE_LIMIT as i64 => MAX_PAGE_LIMIT,
            Some(n) => n as u32,
            None => DEFAULT_PAGE_LIMIT,
        };
        let offset = match offset.and_then(|s| s.trim().parse::<i64>().ok()) {
            Some(n) if n < 0 => 0,
            Some(n) => n.min(u32::MAX as i64) as u32,
            None => 0,
        };
        Self { limit, offset }
    }
}

/// Raw `?limit=&offset=` query parameters, kept as strings so bad values
/// degrade to defaults instead of rejecting the request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        assert_eq!(Pagination::parse(None, None), Pagination::default());
        assert_eq!(Pagination::default().limit, 20);
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(Pagination::parse(Some("0"), None).limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(Pagination::parse(Some("-5"), None).limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(Pagination::parse(Some("abc"), None).limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(Pagination::parse(Some("101"), None).limit, MAX_PAGE_LIMIT);
        assert_eq!(Pagination::parse(Some("100"), None).limit, 100);
        assert_eq!(Pagination::parse(Some("7"), None).limit, 7);
    }

    #[test]
    fn test_offset_bounds() {
        assert_eq!(Pagination::parse(None, Some("-1")).offset, 0);
        assert_eq!(Pagination::parse(None, Some("x")).offset, 0);
        assert_eq!(Pagination::parse(None, Some("40")).offset, 40);
    }
}
