use serde_json::Value;
use std::io;

use super::table::collect_record_lists;

/// Write output as CSV to stdout.
///
/// A result holding a list of records (an amortization schedule, spending
/// categories) is exported as the first such list, one row per record.
/// Otherwise the result is written as field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            let mut lists = Vec::new();
            collect_record_lists("", map, &mut lists);
            if let Some((path, rows)) = lists.first() {
                log::debug!("csv: exporting {path} ({} rows)", rows.len());
                write_records(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    write_field(&mut wtr, key, val);
                }
            }
        }
        Value::Array(arr) => write_records(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(result)]);
        }
    }

    let _ = wtr.flush();
}

fn write_field(wtr: &mut csv::Writer<io::StdoutLock<'_>>, key: &str, val: &Value) {
    if let Value::Object(inner) = val {
        for (k, v) in inner {
            write_field(wtr, &format!("{key}.{k}"), v);
        }
    } else {
        let _ = wtr.write_record([key, &format_csv_value(val)]);
    }
}

fn write_records(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
