//! Mesa Model (tables)

use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: i32 = 4;

/// Mesa occupancy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "mesa_status", rename_all = "snake_case"))]
pub enum MesaStatus {
    #[default]
    Livre,
    Ocupada,
    Reservada,
}

/// Mesa entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Mesa {
    pub id: i64,
    pub area_id: Option<i64>,
    pub number: i32,
    pub name: Option<String>,
    pub capacity: i32,
    pub status: MesaStatus,
    pub is_active: bool,
}

/// Create mesa payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MesaCreate {
    pub area_id: Option<i64>,
    pub number: i32,
    pub name: Option<String>,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
}

fn default_capacity() -> i32 {
    DEFAULT_CAPACITY
}

/// Update mesa payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MesaUpdate {
    pub area_id: Option<i64>,
    pub number: Option<i32>,
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

/// Set mesa status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MesaStatusUpdate {
    pub status: MesaStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_defaults_to_four() {
        let m: MesaCreate = serde_json::from_str(r#"{"area_id":null,"number":3,"name":null}"#).unwrap();
        assert_eq!(m.capacity, 4);
        assert_eq!(MesaStatus::default(), MesaStatus::Livre);
    }
}
