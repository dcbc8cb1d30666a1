pub mod campaign;
pub mod health;
pub mod status_map;
pub mod tasks;
