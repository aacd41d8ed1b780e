use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go in a Field/Value table; every list of records in
/// the result, at any depth (schedule rows, `spending.categories`), gets a
/// table of its own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_tables(result, map);
            } else {
                print_fields(map);
            }
        }
        Value::Array(arr) => print_records(arr),
        _ => println!("{}", value),
    }
}

fn print_result_tables(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        print_fields(envelope);
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in res_map {
        if !is_record_list(val) {
            push_flattened(&mut builder, key, val);
        }
    }
    println!("{}", Table::from(builder));

    let mut records = Vec::new();
    collect_record_lists("", res_map, &mut records);
    for (path, rows) in records {
        println!("\n{}:", path);
        print_records(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Nested objects (e.g. `net_position`, `utilization.overdraft`) are shown
/// with dotted keys.
fn push_flattened(builder: &mut Builder, key: &str, val: &Value) {
    match val {
        Value::Object(inner) => {
            for (k, v) in inner {
                push_flattened(builder, &format!("{key}.{k}"), v);
            }
        }
        Value::Array(arr) if is_record_list(val) => {
            builder.push_record([key.to_string(), format!("{} rows", arr.len())]);
        }
        _ => builder.push_record([key.to_string(), format_value(val)]),
    }
}

/// Record lists anywhere under `map`, keyed by dotted path.
pub(crate) fn collect_record_lists<'a>(
    prefix: &str,
    map: &'a Map<String, Value>,
    out: &mut Vec<(String, &'a [Value])>,
) {
    for (key, val) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Array(rows) if is_record_list(val) => out.push((path, rows.as_slice())),
            Value::Object(inner) => collect_record_lists(&path, inner, out),
            _ => {}
        }
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        push_flattened(&mut builder, key, val);
    }
    println!("{}", Table::from(builder));
}

fn print_records(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

pub(crate) fn is_record_list(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if arr.first().is_some_and(Value::is_object))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
