use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
}

impl User {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}
