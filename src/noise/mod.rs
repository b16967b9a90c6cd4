//! Seeded coherent noise fields.

pub(crate) mod field;
