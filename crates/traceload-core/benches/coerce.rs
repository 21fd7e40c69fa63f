use traceload_core::{FieldCoercer, FieldOverrides, TimestampFormat, TraceFormat};

const SQL_VALUES: &[(&str, &str)] = &[
    ("EventClass", "12"),
    ("TextData", "select 1"),
    ("LoginName", "12345"),
    ("StartTime", "2023-08-08T09:09:43.887-04:00"),
    ("Custom", "0.25"),
    ("Other", "plain text"),
];

const PROCMON_VALUES: &[(&str, &str)] = &[
    ("ProcessIndex", "812"),
    ("Time_of_Day", "10:01:00.0554208 AM"),
    ("Duration", "0.0000017"),
    ("Path", "C:\\Windows\\System32\\ntdll.dll"),
];

#[divan::bench]
fn coerce_sql_fields(bencher: divan::Bencher) {
    let coercer = FieldCoercer::for_format(
        TraceFormat::Sql,
        TimestampFormat::Iso8601,
        &FieldOverrides::default(),
    );
    bencher.bench(|| {
        for (name, raw) in SQL_VALUES {
            let _ = coercer.coerce_field(name, Some(*raw)).unwrap();
        }
    });
}

#[divan::bench]
fn coerce_procmon_fields(bencher: divan::Bencher) {
    let coercer = FieldCoercer::for_format(
        TraceFormat::Procmon,
        TimestampFormat::TimeOfDay,
        &FieldOverrides::default(),
    );
    bencher.bench(|| {
        for (name, raw) in PROCMON_VALUES {
            let _ = coercer.coerce_field(name, Some(*raw)).unwrap();
        }
    });
}

fn main() {
    divan::main();
}
