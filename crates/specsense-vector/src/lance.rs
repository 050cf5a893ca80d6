//! LanceDB-backed vector store.
//!
//! Each index generation writes its own table so a rebuild never touches the
//! table a live snapshot is searching. The store owns a small tokio runtime
//! and exposes the synchronous `VectorSearch` contract on top of it.
use anyhow::{anyhow, Result};
use arrow_array::{FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, DistanceType};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use specsense_core::traits::{VectorBackend, VectorSearch};
use specsense_core::types::Handle;

use crate::schema::build_vector_schema;

pub struct LanceVectorStore {
	runtime: tokio::runtime::Runtime,
	db: Connection,
	table_name: String,
	dim: usize,
	len: usize,
}

impl LanceVectorStore {
	/// Connect to `uri`; the table is created on the first `add`.
	pub fn open(uri: &str, table_name: &str, dim: usize) -> Result<Self> {
		let runtime = tokio::runtime::Runtime::new()?;
		let db = runtime.block_on(async { connect(uri).execute().await })?;
		Ok(Self { runtime, db, table_name: table_name.to_string(), dim, len: 0 })
	}

	pub fn table_name(&self) -> &str { &self.table_name }

	fn to_record_batch(&self, vectors: &[Vec<f32>]) -> Result<RecordBatch> {
		let dim = i32::try_from(self.dim)?;
		let mut handles = Vec::with_capacity(vectors.len());
		for i in 0..vectors.len() { handles.push(i32::try_from(self.len + i)?); }
		let rows: Vec<Option<Vec<Option<f32>>>> = vectors.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect())).collect();
		let record_batch = RecordBatch::try_new(build_vector_schema(dim), vec![
			Arc::new(Int32Array::from(handles)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(rows.into_iter(), dim)),
		])?;
		Ok(record_batch)
	}
}

impl VectorSearch for LanceVectorStore {
	fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
		if vectors.is_empty() { return Ok(()); }
		if let Some(v) = vectors.iter().find(|v| v.len() != self.dim) {
			return Err(anyhow!("vector has dimension {} (table dimension is {})", v.len(), self.dim));
		}
		let record_batch = self.to_record_batch(vectors)?;
		let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		let (db, table_name, fresh) = (&self.db, &self.table_name, self.len == 0);
		self.runtime.block_on(async {
			if fresh {
				db.create_table(table_name, reader).execute().await?;
			} else {
				db.open_table(table_name).execute().await?.add(reader).execute().await?;
			}
			Ok::<_, anyhow::Error>(())
		})?;
		self.len += vectors.len();
		tracing::debug!(table = %self.table_name, rows = self.len, "appended vectors to lance table");
		Ok(())
	}

	fn search(&self, query: &[f32], k: usize) -> Result<Vec<(Handle, f32)>> {
		if self.len == 0 || k == 0 { return Ok(Vec::new()); }
		self.runtime.block_on(async {
			let table = self.db.open_table(&self.table_name).execute().await?;
			let mut stream = table
				.vector_search(query.to_vec())?
				.distance_type(DistanceType::Cosine)
				.limit(k)
				.execute()
				.await?;
			let mut hits = Vec::new();
			while let Some(batch) = stream.try_next().await? {
				let handles = batch
					.column_by_name("handle")
					.and_then(|c| c.as_any().downcast_ref::<Int32Array>())
					.ok_or_else(|| anyhow!("handle column missing from lance results"))?;
				let distances = batch
					.column_by_name("_distance")
					.and_then(|c| c.as_any().downcast_ref::<Float32Array>())
					.ok_or_else(|| anyhow!("_distance column missing from lance results"))?;
				for i in 0..batch.num_rows() {
					let handle = usize::try_from(handles.value(i))?;
					// cosine distance is 1 - similarity
					hits.push((handle, 1.0 - distances.value(i)));
				}
			}
			Ok::<_, anyhow::Error>(hits)
		})
	}

	fn len(&self) -> usize { self.len }
}

/// Opens one table per generation under `uri`, named
/// `<prefix>_g<generation>_<millis>` so restarts never reuse a table.
#[derive(Debug, Clone)]
pub struct LanceBackend { uri: String, table_prefix: String }

impl LanceBackend {
	pub fn new(uri: &str, table_prefix: &str) -> Self {
		Self { uri: uri.to_string(), table_prefix: table_prefix.to_string() }
	}
}

impl VectorBackend for LanceBackend {
	fn create(&self, generation: u64, dim: usize) -> Result<Box<dyn VectorSearch>> {
		let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
		let table = format!("{}_g{}_{}", self.table_prefix, generation, millis);
		// TODO: drop tables of retired generations once no snapshot references them
		tracing::info!(uri = %self.uri, %table, "opening lance vector table");
		Ok(Box::new(LanceVectorStore::open(&self.uri, &table, dim)?))
	}
}
