// Types layer - persisted records, wire models and internal structures.
pub mod db;
pub mod dto;
pub mod internal;
