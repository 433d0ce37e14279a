use crate::value::Value;

/// A named sequence of machine words; the deployable granularity of a
/// module. Functions and raw data blobs share this shape: for functions the
/// words begin with executable code, for globals they are opaque payload.
#[derive(Clone, Debug, PartialEq)]
pub struct DataUnit {
    pub name: String,
    pub data: Vec<Value>,
}

impl DataUnit {
    pub fn new<S: Into<String>>(name: S, data: Vec<Value>) -> DataUnit {
        DataUnit {
            name: name.into(),
            data,
        }
    }
}
