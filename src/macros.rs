//! The [`ini!`](crate::ini) macro for building [`Value`](crate::Value) literals.

/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Objects keep the order their keys are written in. Any other expression is
/// converted with [`to_value`](crate::to_value), falling back to null.
///
/// ```rust
/// use serde_omsi::{ini, Value};
///
/// let link = ini!({ "a": 0, "b": 1, "comments": null });
/// let keys: Vec<_> = link.as_object().unwrap().keys().cloned().collect();
/// assert_eq!(keys, ["a", "b", "comments"]);
/// ```
#[macro_export]
macro_rules! ini {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::ini!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::IniMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::IniMap::new();
        $(
            object.insert($key.to_string(), $crate::ini!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($s:expr) => {
        $crate::to_value(&$s).unwrap_or($crate::Value::Null)
    };
}

#[cfg(test)]
mod tests {
    use crate::{IniMap, Number, Value};

    #[test]
    fn test_ini_macro_scalars() {
        assert_eq!(ini!(null), Value::Null);
        assert_eq!(ini!(true), Value::Bool(true));
        assert_eq!(ini!(-7), Value::Number(Number::Integer(-7)));
        assert_eq!(ini!("texture.bmp"), Value::String("texture.bmp".to_string()));
    }

    #[test]
    fn test_ini_macro_nested() {
        let mesh = ini!({
            "path": "body.o3d",
            "matls": [{ "path": "body.bmp", "index": 0 }, { "path": "glass.bmp", "index": null }]
        });

        let matls = mesh.get("matls").and_then(Value::as_array).unwrap();
        assert_eq!(matls.len(), 2);
        assert_eq!(matls[1].get("index"), Some(&Value::Null));
        assert_eq!(ini!({}), Value::Object(IniMap::new()));
    }
}
