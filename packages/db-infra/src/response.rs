use serde::{Deserialize, Serialize};

/// JSON envelope for list-returning endpoints: `{"success": bool, "data": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn ok(data: Vec<T>) -> Self {
        Self {
            success: true,
            data,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            data: Vec::new(),
        }
    }
}
