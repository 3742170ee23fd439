//! S-expression plist helpers shared by the protocol and config loader.

use lexpr::Value;

pub fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

pub fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a string for s-expression output.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

/// Render a boolean as `t` / `nil`.
pub fn sexp_bool(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}

/// Find the value following `:key` in a plist.
///
/// Accepts both `Value::Keyword("key")` (elisp parser) and
/// `Value::Symbol(":key")` (default parser) forms.
pub fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a plist value rendered as a string.  Keywords lose their colon,
/// booleans become `t` / `nil`.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = get_value(value, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => sexp_bool(*b).to_string(),
        Value::Null | Value::Nil => "nil".to_string(),
        _ => val.to_string(),
    })
}

pub fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Treats "nil" as false, anything else as true.
pub fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).map(|s| s != "nil")
}

pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_value(value, key).and_then(as_number)
}

/// Numeric value of an integer or float atom.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Elements of a proper list.  `()` / `nil` is the empty list; anything
/// that is not a list yields `None`.
pub fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null | Value::Nil => return Some(items),
            Value::Symbol(s) if s.as_ref() == "nil" => return Some(items),
            _ => return None,
        }
    }
}

/// Format an event s-expression.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Value {
        lexpr::from_str(s).unwrap()
    }

    #[test]
    fn test_ok_response_format() {
        let r = ok_response(42);
        assert!(r.contains(":type :response"));
        assert!(r.contains(":id 42"));
        assert!(r.contains(":status :ok"));
    }

    #[test]
    fn test_error_response_escapes() {
        let r = error_response(7, "bad \"mode\"");
        assert!(r.contains(":status :error"));
        assert!(r.contains("\\\"mode\\\""));
    }

    #[test]
    fn test_get_keyword_forms() {
        let v = parse("(:type :frame :mode :mouse :name \"x\" :n 3)");
        assert_eq!(get_keyword(&v, "type").as_deref(), Some("frame"));
        assert_eq!(get_keyword(&v, "mode").as_deref(), Some("mouse"));
        assert_eq!(get_keyword(&v, "name").as_deref(), Some("x"));
        assert_eq!(get_int(&v, "n"), Some(3));
        assert_eq!(get_keyword(&v, "missing"), None);
    }

    #[test]
    fn test_get_float_accepts_integers() {
        let v = parse("(:a 1.5 :b 2 :c -0.25)");
        assert_eq!(get_float(&v, "a"), Some(1.5));
        assert_eq!(get_float(&v, "b"), Some(2.0));
        assert_eq!(get_float(&v, "c"), Some(-0.25));
    }

    #[test]
    fn test_get_bool() {
        let v = parse("(:on t :off nil)");
        assert_eq!(get_bool(&v, "on"), Some(true));
        assert_eq!(get_bool(&v, "off"), Some(false));
    }

    #[test]
    fn test_list_items() {
        let v = parse("(:palm (320 240 -0.05) :empty ())");
        let palm = get_value(&v, "palm").unwrap();
        let items = list_items(palm).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(as_number(items[2]), Some(-0.05));
        assert_eq!(list_items(get_value(&v, "empty").unwrap()).map(|l| l.len()), Some(0));
        assert!(list_items(&parse("42")).is_none());
    }

    #[test]
    fn test_format_event() {
        let e = format_event("key-press", &[("key", "\"space\"")]);
        assert_eq!(e, "(:type :event :event :key-press :key \"space\")");
    }
}
