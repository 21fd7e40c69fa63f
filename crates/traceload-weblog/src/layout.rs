//! Field layouts of the supported W3C log variants

/// `date` and `time` tokens concatenated without a separator
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d%H:%M:%S";

/// Field stored from the leading `date time` tokens
pub const TIMESTAMP_FIELD: &str = "timestamp";

const IIS_FIELDS: &[&str] = &[
    "s-ip",
    "cs-method",
    "cs-uri-stem",
    "cs-uri-query",
    "s-port",
    "cs-username",
    "c-ip",
    "cs(User-Agent)",
    "cs(Referer)",
    "sc-status",
    "sc-substatus",
    "sc-win32-status",
    "time-taken",
];

const HTTPERR_FIELDS: &[&str] = &[
    "c-ip",
    "c-port",
    "s-ip",
    "s-port",
    "cs-version",
    "cs-method",
    "cs-uri",
    "streamid",
    "sc-status",
    "s-siteid",
    "s-reason",
    "s-queuename",
];

/// Ordered names for the tokens after `date time`, plus the timestamp layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub fields: Vec<String>,
    pub timestamp_format: String,
}

impl Layout {
    pub fn new(fields: Vec<String>, timestamp_format: impl Into<String>) -> Self {
        Self {
            fields,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// IIS default W3C logging fields
    pub fn iis() -> Self {
        Self::from_static(IIS_FIELDS)
    }

    /// HTTP.sys error log fields
    pub fn httperr() -> Self {
        Self::from_static(HTTPERR_FIELDS)
    }

    fn from_static(fields: &[&str]) -> Self {
        Self::new(
            fields.iter().map(|s| s.to_string()).collect(),
            DEFAULT_TIMESTAMP_FORMAT,
        )
    }

    /// Name for the token at `position` in the line (0 and 1 are date/time).
    ///
    /// Tokens past the layout are named `field{position}`.
    pub fn field_name(&self, position: usize) -> String {
        position
            .checked_sub(2)
            .and_then(|i| self.fields.get(i))
            .cloned()
            .unwrap_or_else(|| format!("field{position}"))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::iis()
    }
}
