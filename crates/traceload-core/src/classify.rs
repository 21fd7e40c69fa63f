//! Field classification: declared types that override pattern inference
//!
//! Pattern inference misreads domain identifiers that happen to be digit
//! strings (login names, user names) and cannot tell that a field must be
//! numeric. Each source format ships an allow-list of string, integer and
//! timestamp fields; anything not listed falls back to [`Coercer`].

use std::sync::LazyLock;

use rustc_hash::FxHashSet;

use crate::coerce::{CoerceError, Coercer, TimestampFormat};
use crate::value::TypedValue;

/// Source formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceFormat {
    /// SQL Server Profiler XML trace
    Sql,
    /// Process Monitor XML export
    Procmon,
    /// Event Viewer XML export
    EventLog,
    /// W3C space-separated web server logs (IIS, HTTPERR)
    WebLog,
}

impl TraceFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Procmon => "procmon",
            Self::EventLog => "eventlog",
            Self::WebLog => "weblog",
        }
    }

    /// Built-in classification table for this format
    pub fn fields(self) -> &'static FieldTable {
        match self {
            Self::Sql => &SQL_FIELDS,
            Self::Procmon => &PROCMON_FIELDS,
            Self::EventLog => &EVENTLOG_FIELDS,
            Self::WebLog => &WEBLOG_FIELDS,
        }
    }
}

/// Declared type of a known field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    /// Never converted, even when numeric-looking
    String,
    /// Always an integer; anything else is an error
    Integer,
    /// Parsed with the format's timestamp encoding
    Timestamp,
}

/// Fields that trigger timestamp parsing in every format
const TIMESTAMP_FIELDS: &[&str] = &["Time_of_Day", "StartTime", "EndTime"];

static SQL_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::from_lists(
        &[
            "ApplicationName",
            "DatabaseName",
            "HostName",
            "LoginName",
            "LoginSid",
            "NTDomainName",
            "NTUserName",
            "ObjectName",
            "ServerName",
            "SessionLoginName",
            "TextData",
        ],
        &[
            "ClientProcessID",
            "CPU",
            "DatabaseID",
            "Duration",
            "Error",
            "EventClass",
            "EventSequence",
            "EventSubClass",
            "IntegerData",
            "IsSystem",
            "ObjectID",
            "Reads",
            "RequestID",
            "RowCounts",
            "Severity",
            "SPID",
            "State",
            "TransactionID",
            "Writes",
            "XactSequence",
        ],
        TIMESTAMP_FIELDS,
    )
});

static PROCMON_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::from_lists(
        &[
            "AuthenticationId",
            "Category",
            "CommandLine",
            "CompanyName",
            "Description",
            "Detail",
            "ImagePath",
            "Integrity",
            "Operation",
            "Owner",
            "Path",
            "Process_Name",
            "ProcessName",
            "Result",
            "Version",
        ],
        &[
            "ParentProcessId",
            "ParentProcessIndex",
            "PID",
            "ProcessId",
            "ProcessIndex",
            "Session",
            "TID",
        ],
        TIMESTAMP_FIELDS,
    )
});

static EVENTLOG_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::from_lists(
        &["Channel", "Computer", "Guid", "Keywords", "Name", "UserID"],
        &[
            "EventID",
            "EventRecordID",
            "Level",
            "Opcode",
            "ProcessID",
            "Task",
            "ThreadID",
            "Version",
        ],
        TIMESTAMP_FIELDS,
    )
});

static WEBLOG_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::from_lists(
        &[
            "c-ip",
            "cs(Referer)",
            "cs(User-Agent)",
            "cs-method",
            "cs-uri",
            "cs-uri-query",
            "cs-uri-stem",
            "cs-username",
            "cs-version",
            "s-ip",
            "s-queuename",
            "s-reason",
        ],
        &[
            "c-port",
            "cs-bytes",
            "s-port",
            "s-siteid",
            "sc-bytes",
            "sc-status",
            "sc-substatus",
            "sc-win32-status",
            "time-taken",
        ],
        TIMESTAMP_FIELDS,
    )
});

/// Extra field names layered over a built-in table for one run.
#[derive(Debug, Clone, Default)]
pub struct FieldOverrides {
    pub strings: Vec<String>,
    pub integers: Vec<String>,
    pub timestamps: Vec<String>,
}

/// Static field-name → declared-type table.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    strings: FxHashSet<String>,
    integers: FxHashSet<String>,
    timestamps: FxHashSet<String>,
}

impl FieldTable {
    pub fn from_lists(strings: &[&str], integers: &[&str], timestamps: &[&str]) -> Self {
        let set = |names: &[&str]| -> FxHashSet<String> {
            names.iter().map(|s| s.to_string()).collect()
        };
        Self {
            strings: set(strings),
            integers: set(integers),
            timestamps: set(timestamps),
        }
    }

    /// Copy of this table with `overrides` added.
    ///
    /// A name moved into a set is removed from the other two so the
    /// override always wins.
    pub fn extend(&self, overrides: &FieldOverrides) -> Self {
        let mut table = self.clone();
        for name in &overrides.strings {
            table.integers.remove(name);
            table.timestamps.remove(name);
            table.strings.insert(name.clone());
        }
        for name in &overrides.integers {
            table.strings.remove(name);
            table.timestamps.remove(name);
            table.integers.insert(name.clone());
        }
        for name in &overrides.timestamps {
            table.strings.remove(name);
            table.integers.remove(name);
            table.timestamps.insert(name.clone());
        }
        table
    }

    /// Declared type of `name`, or `None` to fall back to inference
    pub fn classify(&self, name: &str) -> Option<DeclaredType> {
        if self.strings.contains(name) {
            Some(DeclaredType::String)
        } else if self.integers.contains(name) {
            Some(DeclaredType::Integer)
        } else if self.timestamps.contains(name) {
            Some(DeclaredType::Timestamp)
        } else {
            None
        }
    }
}

/// Per-field coercion: declared type first, pattern inference otherwise.
#[derive(Debug, Clone)]
pub struct FieldCoercer {
    table: FieldTable,
    values: Coercer,
}

impl FieldCoercer {
    pub fn new(table: FieldTable, timestamps: TimestampFormat) -> Self {
        Self {
            table,
            values: Coercer::new(timestamps),
        }
    }

    /// Built-in table and timestamp encoding for `format`, plus overrides
    pub fn for_format(
        format: TraceFormat,
        timestamps: TimestampFormat,
        overrides: &FieldOverrides,
    ) -> Self {
        Self::new(format.fields().extend(overrides), timestamps)
    }

    pub fn coercer(&self) -> &Coercer {
        &self.values
    }

    pub fn coerce_field(&self, name: &str, raw: Option<&str>) -> Result<TypedValue, CoerceError> {
        let Some(text) = raw else {
            return Ok(TypedValue::Null);
        };
        match self.table.classify(name) {
            Some(DeclaredType::String) => Ok(TypedValue::String(text.to_string())),
            Some(DeclaredType::Integer) => {
                text.trim()
                    .parse::<i64>()
                    .map(TypedValue::Integer)
                    .map_err(|_| CoerceError::InvalidInteger {
                        field: name.to_string(),
                        value: text.to_string(),
                    })
            }
            Some(DeclaredType::Timestamp) => self.values.timestamp(text),
            None => self.values.coerce(Some(text)),
        }
    }
}
