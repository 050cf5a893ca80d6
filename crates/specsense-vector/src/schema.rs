use arrow_schema::{Schema, Field, DataType};
use std::sync::Arc;

/// One row per product: its handle and its normalized embedding.
pub fn build_vector_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("handle", DataType::Int32, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}
