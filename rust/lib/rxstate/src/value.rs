use std::any;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::path::Path;

/// Notification emitted once per write to the state store.
///
/// `value` is the value written at `path`, not the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: Path,
    pub value: Value,
}

/// Unique handle for a bus subscription.
///
/// Ids are handed out in increasing order, which is also the order in which
/// subscribers are called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// Serialize a typed value into the store representation.
pub(crate) fn encode<T: Serialize>(path: &Path, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|source| StoreError::Encode {
        path: path.clone(),
        source,
    })
}

/// Deserialize a stored value into `T`.
pub(crate) fn decode<T: DeserializeOwned>(path: &Path, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Decode {
        path: path.clone(),
        source,
    })
}

/// Short type name used in error messages.
pub(crate) fn type_name<T: ?Sized>() -> &'static str {
    any::type_name::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Rect {
        width: u32,
        height: u32,
    }

    #[test]
    fn encode_struct_to_object() {
        let v = encode(&Path::parse("r"), &Rect { width: 2, height: 3 }).unwrap();
        assert_eq!(v, json!({"width": 2, "height": 3}));
    }

    #[test]
    fn decode_wrong_shape_reports_path() {
        let err = decode::<Rect>(&Path::parse("selection.rect"), json!("nope")).unwrap_err();
        match err {
            StoreError::Decode { path, .. } => assert_eq!(path.to_string(), "selection.rect"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_null_into_option() {
        let v: Option<String> = decode(&Path::parse("x"), Value::Null).unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn subscription_ids_order() {
        assert!(SubscriptionId(1) < SubscriptionId(2));
    }
}
